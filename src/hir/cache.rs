//! Per-file build cache.
//!
//! Each slot holds an `Arc<FileRecord>`. Records are immutable once built;
//! a rebuild produces a new record and swaps the pointer, so a reader that
//! cloned the old `Arc` keeps a consistent snapshot. The map lock is only
//! held for the swap, never during lexing or parsing.

use std::borrow::Cow;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use tokio_util::sync::CancellationToken;

use super::codec::{self, FORMAT_VERSION};
use super::extract::{ExtractError, extract};
use super::stubs::StubTree;
use crate::base::{ContentHash, FileId};
use crate::parser::relex::relex;
use crate::parser::{self, LexedText, Parse, SyntaxError, SyntaxNode, TextEdit};

/// Everything derived from one version of one file.
#[derive(Debug, Clone)]
pub struct FileRecord {
    file: FileId,
    content_hash: ContentHash,
    format_version: u32,
    /// Tokens and lexer checkpoints, the starting point for relexing an edit
    lexed: LexedText,
    parse: Parse,
    stubs: Result<StubTree, ExtractError>,
    blob: Option<Arc<[u8]>>,
}

impl FileRecord {
    /// Lex, parse, extract and (optionally) encode `text`.
    ///
    /// Returns `None` if `cancel` fires while parsing; nothing is kept.
    pub fn build(
        file: FileId,
        text: &str,
        keep_blob: bool,
        cancel: Option<&CancellationToken>,
    ) -> Option<Self> {
        Self::build_lexed(file, text, LexedText::new(text), keep_blob, cancel)
    }

    /// Like [`Self::build`], for a text that is already lexed.
    ///
    /// `lexed` must be the tokenization of `text`.
    pub fn build_lexed(
        file: FileId,
        text: &str,
        lexed: LexedText,
        keep_blob: bool,
        cancel: Option<&CancellationToken>,
    ) -> Option<Self> {
        let parse = match cancel {
            Some(cancel) => parser::parse_cancellable(text, lexed.tokens(), cancel)?,
            None => parser::parse_tokens(text, lexed.tokens()),
        };
        Some(Self::from_parse(file, ContentHash::of(text.as_bytes()), lexed, parse, keep_blob))
    }

    fn from_parse(file: FileId, content_hash: ContentHash, lexed: LexedText, parse: Parse, keep_blob: bool) -> Self {
        let stubs = extract(&parse.syntax());
        let blob = match &stubs {
            Ok(tree) if keep_blob => Some(Arc::from(codec::encode(tree))),
            Ok(_) => None,
            Err(err) => {
                tracing::warn!(%file, %err, "stub extraction failed, file is degraded");
                None
            }
        };
        tracing::debug!(
            %file,
            hash = %content_hash,
            syntax_errors = parse.errors.len(),
            "built file record"
        );

        Self {
            file,
            content_hash,
            format_version: FORMAT_VERSION,
            lexed,
            parse,
            stubs,
            blob,
        }
    }

    pub fn file(&self) -> FileId {
        self.file
    }

    pub fn content_hash(&self) -> ContentHash {
        self.content_hash
    }

    pub fn format_version(&self) -> u32 {
        self.format_version
    }

    /// Fresh for `hash` under the running format version.
    pub fn is_fresh(&self, hash: ContentHash) -> bool {
        self.content_hash == hash && self.format_version == FORMAT_VERSION
    }

    pub fn lexed(&self) -> &LexedText {
        &self.lexed
    }

    pub fn parse(&self) -> &Parse {
        &self.parse
    }

    pub fn syntax(&self) -> SyntaxNode {
        self.parse.syntax()
    }

    pub fn syntax_errors(&self) -> &[SyntaxError] {
        &self.parse.errors
    }

    /// The stub tree, or `None` if extraction failed.
    pub fn stubs(&self) -> Option<&StubTree> {
        self.stubs.as_ref().ok()
    }

    pub fn extract_error(&self) -> Option<&ExtractError> {
        self.stubs.as_ref().err()
    }

    pub fn is_degraded(&self) -> bool {
        self.stubs.is_err()
    }

    /// The encoded stubs kept in memory, if any.
    pub fn blob(&self) -> Option<&[u8]> {
        self.blob.as_deref()
    }

    /// The encoded stubs, encoding on demand when no blob was kept.
    pub fn encoded(&self) -> Option<Cow<'_, [u8]>> {
        match (&self.blob, &self.stubs) {
            (Some(blob), _) => Some(Cow::Borrowed(blob)),
            (None, Ok(tree)) => Some(Cow::Owned(codec::encode(tree))),
            (None, Err(_)) => None,
        }
    }
}

/// Map from file to its most recently committed [`FileRecord`].
#[derive(Debug)]
pub struct FileCache {
    records: RwLock<FxHashMap<FileId, Arc<FileRecord>>>,
    builds: AtomicUsize,
    keep_blobs: bool,
}

impl FileCache {
    pub fn new() -> Self {
        Self::with_blobs(true)
    }

    /// A cache whose records keep (or drop) their encoded stub blobs.
    pub fn with_blobs(keep_blobs: bool) -> Self {
        Self {
            records: RwLock::new(FxHashMap::default()),
            builds: AtomicUsize::new(0),
            keep_blobs,
        }
    }

    pub fn get(&self, file: FileId) -> Option<Arc<FileRecord>> {
        self.records.read().get(&file).cloned()
    }

    /// The committed record for `file` if it was built from `hash`.
    pub fn get_fresh(&self, file: FileId, hash: ContentHash) -> Option<Arc<FileRecord>> {
        self.get(file).filter(|record| record.is_fresh(hash))
    }

    /// Build a record without committing it. Counts towards [`Self::build_count`].
    pub fn build(&self, file: FileId, text: &str, cancel: Option<&CancellationToken>) -> Option<FileRecord> {
        self.builds.fetch_add(1, Ordering::Relaxed);
        FileRecord::build(file, text, self.keep_blobs, cancel)
    }

    /// Build a record for `new_text`, which is `edit` applied to the text
    /// `previous` was built from. Only the edited region is relexed.
    pub fn build_edited(
        &self,
        previous: &FileRecord,
        edit: &TextEdit,
        new_text: &str,
        cancel: Option<&CancellationToken>,
    ) -> Option<FileRecord> {
        self.builds.fetch_add(1, Ordering::Relaxed);
        let lexed = relex(previous.lexed(), edit, new_text);
        FileRecord::build_lexed(previous.file(), new_text, lexed, self.keep_blobs, cancel)
    }

    /// Return the cached record if its hash matches `text`, else build and
    /// commit a new one.
    pub fn get_or_build(&self, file: FileId, text: &str) -> Arc<FileRecord> {
        let hash = ContentHash::of(text.as_bytes());
        if let Some(record) = self.get_fresh(file, hash) {
            tracing::trace!(%file, "file cache hit");
            return record;
        }
        let record = Arc::new(self.build_now(file, text));
        self.insert(record.clone());
        record
    }

    /// Build a record without committing it, ignoring cancellation.
    pub fn build_now(&self, file: FileId, text: &str) -> FileRecord {
        self.builds.fetch_add(1, Ordering::Relaxed);
        let lexed = LexedText::new(text);
        let parse = parser::parse_tokens(text, lexed.tokens());
        FileRecord::from_parse(file, ContentHash::of(text.as_bytes()), lexed, parse, self.keep_blobs)
    }

    /// Swap in a new record, returning the one it replaced.
    pub fn insert(&self, record: Arc<FileRecord>) -> Option<Arc<FileRecord>> {
        self.records.write().insert(record.file(), record)
    }

    pub fn remove(&self, file: FileId) -> Option<Arc<FileRecord>> {
        self.records.write().remove(&file)
    }

    pub fn contains(&self, file: FileId) -> bool {
        self.records.read().contains_key(&file)
    }

    /// Snapshot of every committed record, ordered by file.
    pub fn records(&self) -> Vec<Arc<FileRecord>> {
        let mut records: Vec<_> = self.records.read().values().cloned().collect();
        records.sort_by_key(|record| record.file());
        records
    }

    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }

    pub fn clear(&self) {
        self.records.write().clear();
    }

    /// How many lex/parse builds have run, hits excluded.
    pub fn build_count(&self) -> usize {
        self.builds.load(Ordering::Relaxed)
    }
}

impl Default for FileCache {
    fn default() -> Self {
        Self::new()
    }
}
