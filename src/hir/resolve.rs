//! Name resolution on top of the index.
//!
//! Resolution order for a name used at `offset` in `from_file`:
//!
//! 1. a single index hit wins outright;
//! 2. otherwise the innermost same-file candidate whose enclosing stubs all
//!    contain `offset`;
//! 3. otherwise the exported candidates from other files.
//!
//! Scope checks use the stub anchors stored in the index. When an anchor is
//! missing the cached syntax tree is loaded and the stub path navigated.

use rustc_hash::FxHashMap;

use super::cache::FileCache;
use super::extract::navigate;
use super::index::{IndexEntry, IndexStore, Scope};
use super::stubs::StubPath;
use crate::base::{FileId, TextRange, TextSize};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolveResult {
    Found(IndexEntry),
    /// More than one candidate and nothing to choose between them
    Ambiguous(Vec<IndexEntry>),
    NotFound,
}

impl ResolveResult {
    pub fn found(&self) -> Option<&IndexEntry> {
        match self {
            ResolveResult::Found(entry) => Some(entry),
            _ => None,
        }
    }
}

/// Resolves names against an index, consulting the file cache for tree
/// context.
pub struct Resolver<'a> {
    index: &'a IndexStore,
    cache: &'a FileCache,
}

impl<'a> Resolver<'a> {
    pub fn new(index: &'a IndexStore, cache: &'a FileCache) -> Self {
        Self { index, cache }
    }

    pub fn resolve(&self, name: &str, from_file: FileId, offset: TextSize) -> ResolveResult {
        let mut candidates = self.index.lookup(name, Scope::Project);
        match candidates.len() {
            0 => return ResolveResult::NotFound,
            1 => return candidates.pop().map_or(ResolveResult::NotFound, ResolveResult::Found),
            _ => {}
        }

        if let Some(local) = self.innermost_local(&candidates, from_file, offset) {
            return ResolveResult::Found(local);
        }

        let mut exported: Vec<IndexEntry> = candidates
            .iter()
            .filter(|entry| entry.file != from_file && entry.is_exported())
            .cloned()
            .collect();
        match exported.len() {
            0 => ResolveResult::Ambiguous(candidates),
            1 => exported.pop().map_or(ResolveResult::NotFound, ResolveResult::Found),
            _ => ResolveResult::Ambiguous(exported),
        }
    }

    fn innermost_local(&self, candidates: &[IndexEntry], file: FileId, offset: TextSize) -> Option<IndexEntry> {
        let local: Vec<&IndexEntry> = candidates.iter().filter(|e| e.file == file).collect();
        if local.is_empty() {
            return None;
        }
        let anchors = self.anchors(file);

        let visible: Vec<&IndexEntry> = local
            .into_iter()
            .filter(|entry| encloses(&anchors, &entry.path, offset))
            .collect();
        let deepest = visible.iter().map(|e| e.path.len()).max()?;
        let innermost: Vec<&IndexEntry> = visible.into_iter().filter(|e| e.path.len() == deepest).collect();

        // Among siblings, the last one declared before the use
        let before = innermost
            .iter()
            .filter(|e| anchors.get(&e.path).is_some_and(|r| r.start() <= offset))
            .max_by_key(|e| anchors.get(&e.path).map(|r| r.start()));
        before.or(innermost.first()).map(|e| (*e).clone())
    }

    /// Anchor range of every stub in `file`, by path.
    fn anchors(&self, file: FileId) -> FxHashMap<StubPath, TextRange> {
        let entries = self.index.entries_for_file(file);
        let mut anchors = FxHashMap::default();
        let mut missing = Vec::new();
        for entry in entries {
            match entry.range {
                Some(range) => {
                    anchors.insert(entry.path, range);
                }
                None => missing.push(entry.path),
            }
        }
        if !missing.is_empty() {
            if let Some(record) = self.cache.get(file) {
                tracing::trace!(%file, missing = missing.len(), "loading tree for stub anchors");
                let root = record.syntax();
                for path in missing {
                    if let Some(node) = navigate(&root, &path) {
                        anchors.insert(path, node.text_range());
                    }
                }
            }
        }
        anchors
    }
}

/// Every enclosing stub of `path` has an anchor that contains `offset`.
fn encloses(anchors: &FxHashMap<StubPath, TextRange>, path: &StubPath, offset: TextSize) -> bool {
    let mut current = path.parent();
    while let Some(ancestor) = current {
        if ancestor.is_root() {
            return true;
        }
        match anchors.get(&ancestor) {
            Some(range) if range.contains_inclusive(offset) => {}
            _ => return false,
        }
        current = ancestor.parent();
    }
    true
}
