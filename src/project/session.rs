//! The project session: owns the file cache and the index.
//!
//! Builds run without holding any lock. A finished build commits only if the
//! file's latest submitted content still has the hash the build started
//! from; otherwise it is dropped. Submitting newer content for a file also
//! cancels that file's in-flight build.

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::{Mutex, RwLock};
use rayon::prelude::*;
use rustc_hash::{FxHashMap, FxHashSet};
use tokio_util::sync::CancellationToken;

use super::config::ProjectConfig;
use super::error::ProjectError;
use super::persist::{self, PersistError};
use crate::base::{ContentHash, FileId, TextSize};
use crate::hir::{
    ExtractError, FileCache, FileRecord, IndexEntry, IndexStore, ResolveResult, Resolver, Scope,
    StubTree, encode, navigate,
};
use crate::parser::{SyntaxError, SyntaxNode, TextEdit};

/// What a submit did.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SubmitOutcome {
    /// Same content as the committed (or warm-loaded) state; no work done
    Unchanged,
    /// Rebuilt and committed, index entries swapped
    Rebuilt,
    /// Rebuilt, but stub extraction failed; prior index entries were kept
    Degraded,
    /// Superseded by newer content before it could commit
    Discarded,
}

/// Problems found in one file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileDiagnostics {
    pub syntax_errors: Vec<SyntaxError>,
    /// Set when the file's stubs could not be built
    pub stub_error: Option<ExtractError>,
}

impl FileDiagnostics {
    pub fn is_empty(&self) -> bool {
        self.syntax_errors.is_empty() && self.stub_error.is_none()
    }
}

/// Latest submitted content of a file.
#[derive(Debug, Clone)]
struct Revision {
    hash: ContentHash,
    text: Arc<str>,
}

/// Stubs the index holds for a file whose current record has none: loaded
/// from a persisted cache and not yet rebuilt, or the last good stubs of a
/// file whose latest build degraded.
#[derive(Debug, Clone)]
struct WarmStubs {
    hash: ContentHash,
    stubs: Arc<StubTree>,
}

/// A set of files, their build cache and their symbol index.
pub struct Project {
    config: ProjectConfig,
    cache: FileCache,
    index: IndexStore,
    revisions: RwLock<FxHashMap<FileId, Revision>>,
    in_flight: Mutex<FxHashMap<FileId, (u64, CancellationToken)>>,
    generation: AtomicU64,
    warm: RwLock<FxHashMap<FileId, WarmStubs>>,
    pool: Option<rayon::ThreadPool>,
}

impl Project {
    pub fn new() -> Self {
        Self::build(ProjectConfig::default(), None)
    }

    pub fn with_config(config: ProjectConfig) -> Result<Self, ProjectError> {
        let pool = match config.worker_threads {
            Some(threads) => Some(
                rayon::ThreadPoolBuilder::new()
                    .num_threads(threads)
                    .thread_name(|i| format!("weft-build-{i}"))
                    .build()
                    .map_err(|e| ProjectError::thread_pool(e.to_string()))?,
            ),
            None => None,
        };
        Ok(Self::build(config, pool))
    }

    fn build(config: ProjectConfig, pool: Option<rayon::ThreadPool>) -> Self {
        Self {
            cache: FileCache::with_blobs(config.keep_blobs),
            index: IndexStore::new(),
            revisions: RwLock::new(FxHashMap::default()),
            in_flight: Mutex::new(FxHashMap::default()),
            generation: AtomicU64::new(0),
            warm: RwLock::new(FxHashMap::default()),
            pool,
            config,
        }
    }

    pub fn config(&self) -> &ProjectConfig {
        &self.config
    }

    pub fn cache(&self) -> &FileCache {
        &self.cache
    }

    pub fn index(&self) -> &IndexStore {
        &self.index
    }

    /// Files that have been submitted and not removed, sorted.
    pub fn files(&self) -> Vec<FileId> {
        let mut files: Vec<FileId> = self.revisions.read().keys().copied().collect();
        files.sort();
        files
    }

    // ========================================================================
    // SUBMIT
    // ========================================================================

    /// Set a file's content and rebuild it if the content hash changed.
    pub fn submit_file(&self, file: FileId, content: &[u8]) -> Result<SubmitOutcome, ProjectError> {
        let text = std::str::from_utf8(content).map_err(|e| ProjectError::InvalidUtf8 {
            file,
            valid_up_to: e.valid_up_to(),
        })?;
        let hash = ContentHash::of(content);

        let Some((generation, cancel)) = self.begin(file, hash, text) else {
            tracing::trace!(%file, "content unchanged");
            return Ok(SubmitOutcome::Unchanged);
        };

        let outcome = match self.cache.build(file, text, Some(&cancel)) {
            Some(record) => self.commit(Arc::new(record)),
            None => {
                tracing::debug!(%file, "build cancelled by a newer submit");
                SubmitOutcome::Discarded
            }
        };
        self.finish(file, generation);
        Ok(outcome)
    }

    /// Apply `edit` to the file's latest content and rebuild it, relexing
    /// only around the edit when the previous build is still cached.
    pub fn edit_file(&self, file: FileId, edit: &TextEdit) -> Result<SubmitOutcome, ProjectError> {
        let revision = self
            .revisions
            .read()
            .get(&file)
            .cloned()
            .ok_or(ProjectError::UnknownFile(file))?;
        let text = edit.apply(&revision.text).ok_or(ProjectError::InvalidEdit {
            file,
            range: edit.delete,
        })?;
        let hash = ContentHash::of(text.as_bytes());

        let Some((generation, cancel)) = self.begin(file, hash, &text) else {
            tracing::trace!(%file, "edit left content unchanged");
            return Ok(SubmitOutcome::Unchanged);
        };

        let built = match self.cache.get_fresh(file, revision.hash) {
            Some(previous) => {
                tracing::trace!(%file, "relexing edited region");
                self.cache.build_edited(&previous, edit, &text, Some(&cancel))
            }
            None => self.cache.build(file, &text, Some(&cancel)),
        };
        let outcome = match built {
            Some(record) => self.commit(Arc::new(record)),
            None => {
                tracing::debug!(%file, "build cancelled by a newer submit");
                SubmitOutcome::Discarded
            }
        };
        self.finish(file, generation);
        Ok(outcome)
    }

    /// Submit many files, building them in parallel.
    pub fn submit_files(
        &self,
        batch: &[(FileId, Vec<u8>)],
    ) -> Vec<(FileId, Result<SubmitOutcome, ProjectError>)> {
        let run = || {
            batch
                .par_iter()
                .map(|(file, content)| (*file, self.submit_file(*file, content)))
                .collect::<Vec<_>>()
        };
        match &self.pool {
            Some(pool) => pool.install(run),
            None => run(),
        }
    }

    /// Record the new revision and hand out a fresh cancellation token, or
    /// `None` if nothing needs building.
    fn begin(&self, file: FileId, hash: ContentHash, text: &str) -> Option<(u64, CancellationToken)> {
        let mut revisions = self.revisions.write();
        let current = revisions.get(&file).map(|rev| rev.hash);
        if current == Some(hash) && self.cache.get_fresh(file, hash).is_some() {
            return None;
        }
        let revision = Revision {
            hash,
            text: Arc::from(text),
        };
        if self.warm.read().get(&file).is_some_and(|warm| warm.hash == hash) {
            // Index already holds these stubs; the tree is built on demand
            revisions.insert(file, revision);
            return None;
        }
        revisions.insert(file, revision);

        let generation = self.generation.fetch_add(1, Ordering::Relaxed);
        let cancel = CancellationToken::new();
        if let Some((_, previous)) = self.in_flight.lock().insert(file, (generation, cancel.clone())) {
            previous.cancel();
        }
        Some((generation, cancel))
    }

    fn finish(&self, file: FileId, generation: u64) {
        let mut in_flight = self.in_flight.lock();
        if in_flight.get(&file).is_some_and(|(current, _)| *current == generation) {
            in_flight.remove(&file);
        }
    }

    /// Swap a finished build in, unless newer content arrived meanwhile.
    fn commit(&self, record: Arc<FileRecord>) -> SubmitOutcome {
        let file = record.file();
        let revisions = self.revisions.read();
        if revisions.get(&file).map(|rev| rev.hash) != Some(record.content_hash()) {
            tracing::debug!(%file, hash = %record.content_hash(), "discarding stale build");
            return SubmitOutcome::Discarded;
        }

        let previous = self.cache.insert(record.clone());
        let mut warm = self.warm.write();
        let outcome = match record.stubs() {
            Some(stubs) => {
                self.index.update(file, stubs);
                warm.remove(&file);
                SubmitOutcome::Rebuilt
            }
            None => {
                if !warm.contains_key(&file) {
                    let kept = previous.as_deref().and_then(|prev| {
                        Some(WarmStubs {
                            hash: prev.content_hash(),
                            stubs: Arc::new(prev.stubs()?.clone()),
                        })
                    });
                    if let Some(kept) = kept {
                        warm.insert(file, kept);
                    }
                }
                tracing::warn!(%file, "stubs degraded, keeping previous index entries");
                SubmitOutcome::Degraded
            }
        };
        drop(warm);
        drop(revisions);
        tracing::debug!(%file, ?outcome, "committed");
        outcome
    }

    /// Forget a file: cancel its build, drop its record and index entries.
    pub fn remove_file(&self, file: FileId) -> bool {
        let mut revisions = self.revisions.write();
        let known = revisions.remove(&file).is_some();
        if let Some((_, cancel)) = self.in_flight.lock().remove(&file) {
            cancel.cancel();
        }
        let had_record = self.cache.remove(file).is_some();
        let removed = self.index.remove_file(file);
        let was_warm = self.warm.write().remove(&file).is_some();
        drop(revisions);
        tracing::debug!(%file, removed, "file removed");
        known || had_record || was_warm
    }

    // ========================================================================
    // QUERIES
    // ========================================================================

    pub fn query_symbol(&self, name: &str, scope: Scope) -> Vec<IndexEntry> {
        self.index.lookup(name, scope)
    }

    /// The committed record for the file's latest content, building it if
    /// it is missing or stale.
    pub fn record(&self, file: FileId) -> Result<Arc<FileRecord>, ProjectError> {
        let revision = self
            .revisions
            .read()
            .get(&file)
            .cloned()
            .ok_or(ProjectError::UnknownFile(file))?;
        if let Some(record) = self.cache.get_fresh(file, revision.hash) {
            return Ok(record);
        }

        tracing::debug!(%file, "building tree on demand");
        let record = Arc::new(self.cache.build_now(file, &revision.text));
        // A newer submit may have landed meanwhile; the tree still matches `revision`
        self.commit(record.clone());
        Ok(record)
    }

    pub fn get_syntax_tree(&self, file: FileId) -> Result<SyntaxNode, ProjectError> {
        Ok(self.record(file)?.syntax())
    }

    /// The syntax node an index entry points at.
    pub fn navigate(&self, entry: &IndexEntry) -> Option<SyntaxNode> {
        let root = self.get_syntax_tree(entry.file).ok()?;
        navigate(&root, &entry.path)
    }

    pub fn diagnostics(&self, file: FileId) -> Result<FileDiagnostics, ProjectError> {
        let record = self.record(file)?;
        Ok(FileDiagnostics {
            syntax_errors: record.syntax_errors().to_vec(),
            stub_error: record.extract_error().cloned(),
        })
    }

    pub fn resolve(&self, name: &str, from_file: FileId, offset: TextSize) -> ResolveResult {
        Resolver::new(&self.index, &self.cache).resolve(name, from_file, offset)
    }

    /// Re-derive the whole index from committed and warm stubs. Warm stubs
    /// win over a file's record, so a degraded file keeps its entries.
    pub fn rebuild_index(&self) {
        let _revisions = self.revisions.read();
        let records = self.cache.records();
        let warm = self.warm.read();
        let committed = records
            .iter()
            .filter(|record| !warm.contains_key(&record.file()))
            .filter_map(|record| Some((record.file(), record.stubs()?)));
        let loaded = warm.iter().map(|(file, w)| (*file, w.stubs.as_ref()));
        self.index.rebuild_from(committed.chain(loaded));
    }

    pub fn build_count(&self) -> usize {
        self.cache.build_count()
    }

    // ========================================================================
    // PERSISTED CACHE
    // ========================================================================

    /// Write the indexed stubs of every file to `path`. A degraded file
    /// contributes the last good stubs it indexed, under their own hash.
    /// Returns how many entries were written.
    pub fn save_cache(&self, path: &Path) -> Result<usize, ProjectError> {
        let revisions = self.revisions.read();
        let mut blobs: Vec<(FileId, ContentHash, Vec<u8>)> = Vec::new();
        let mut written: FxHashSet<FileId> = FxHashSet::default();
        for record in self.cache.records() {
            let current = revisions.get(&record.file()).map(|rev| rev.hash);
            if current != Some(record.content_hash()) {
                continue;
            }
            if let Some(blob) = record.encoded() {
                written.insert(record.file());
                blobs.push((record.file(), record.content_hash(), blob.into_owned()));
            }
        }
        for (file, warm) in self.warm.read().iter() {
            if written.insert(*file) {
                blobs.push((*file, warm.hash, encode(&warm.stubs)));
            }
        }
        drop(revisions);
        blobs.sort_by_key(|(file, _, _)| *file);

        persist::save_cache(path, blobs.iter().map(|(f, h, b)| (*f, *h, b.as_slice())))?;
        Ok(blobs.len())
    }

    /// Warm the index from a persisted cache without parsing anything.
    ///
    /// Files that were already submitted keep their own state. A cache from
    /// another format version is discarded whole and reported as an error.
    pub fn load_cache(&self, path: &Path) -> Result<usize, ProjectError> {
        let entries = match persist::load_cache(path) {
            Ok(entries) => entries,
            Err(err @ PersistError::VersionMismatch { .. }) => {
                tracing::warn!(path = %path.display(), %err, "discarding persisted cache");
                return Err(err.into());
            }
            Err(err) => return Err(err.into()),
        };

        let revisions = self.revisions.read();
        let mut warm = self.warm.write();
        let mut loaded = 0;
        for entry in entries {
            if revisions.contains_key(&entry.file) {
                continue;
            }
            self.index.update(entry.file, &entry.stubs);
            warm.insert(
                entry.file,
                WarmStubs {
                    hash: entry.content_hash,
                    stubs: Arc::new(entry.stubs),
                },
            );
            loaded += 1;
        }
        tracing::debug!(loaded, "warmed index from persisted cache");
        Ok(loaded)
    }

    /// [`Self::save_cache`] to the configured path, if any.
    pub fn save(&self) -> Result<Option<usize>, ProjectError> {
        match &self.config.cache_path {
            Some(path) => self.save_cache(path).map(Some),
            None => Ok(None),
        }
    }

    /// [`Self::load_cache`] from the configured path, if it exists.
    pub fn restore(&self) -> Result<Option<usize>, ProjectError> {
        match &self.config.cache_path {
            Some(path) if path.exists() => self.load_cache(path).map(Some),
            _ => Ok(None),
        }
    }
}

impl Default for Project {
    fn default() -> Self {
        Self::new()
    }
}
