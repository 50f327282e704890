//! Project-wide symbol index.
//!
//! Maps a name to the stubs that declare it. The store is a pure
//! denormalization of the committed stub trees: [`IndexStore::rebuild_from`]
//! reproduces it from scratch at any time.
//!
//! A file's entries are replaced under a single write lock, so readers see
//! either all of the old entries for that file or all of the new ones.

use parking_lot::RwLock;
use rustc_hash::{FxHashMap, FxHashSet};

use super::stubs::{StubFlags, StubPath, StubTree};
use crate::base::{FileId, Name, TextRange};
use crate::parser::SyntaxKind;

/// One named stub, addressed by file and stub path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct IndexEntry {
    pub key: Name,
    pub file: FileId,
    pub path: StubPath,
    pub kind: SyntaxKind,
    pub flags: StubFlags,
    /// Navigation anchor copied from the stub
    pub range: Option<TextRange>,
}

impl IndexEntry {
    pub fn is_exported(&self) -> bool {
        self.flags.contains(StubFlags::EXPORTED)
    }
}

/// Where a lookup searches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scope {
    Project,
    File(FileId),
}

impl Scope {
    fn admits(self, file: FileId) -> bool {
        match self {
            Scope::Project => true,
            Scope::File(only) => only == file,
        }
    }
}

/// Entries derived from one stub tree, in pre-order.
pub fn entries_from_stubs(file: FileId, tree: &StubTree) -> Vec<IndexEntry> {
    tree.iter()
        .filter_map(|(path, stub)| {
            Some(IndexEntry {
                key: stub.name.clone()?,
                file,
                path,
                kind: stub.kind,
                flags: stub.flags,
                range: stub.range,
            })
        })
        .collect()
}

#[derive(Debug, Default)]
struct IndexState {
    by_key: FxHashMap<Name, Vec<IndexEntry>>,
    /// Keys each file contributed, for removal
    by_file: FxHashMap<FileId, Vec<Name>>,
    len: usize,
}

impl IndexState {
    fn remove_file(&mut self, file: FileId) -> usize {
        let Some(keys) = self.by_file.remove(&file) else {
            return 0;
        };
        let mut removed = 0;
        for key in keys {
            if let Some(entries) = self.by_key.get_mut(&key) {
                let before = entries.len();
                entries.retain(|entry| entry.file != file);
                removed += before - entries.len();
                if entries.is_empty() {
                    self.by_key.remove(&key);
                }
            }
        }
        self.len -= removed;
        removed
    }

    fn insert_file(&mut self, file: FileId, entries: Vec<IndexEntry>) {
        if entries.is_empty() {
            return;
        }
        let mut seen: FxHashSet<Name> = FxHashSet::default();
        let mut keys: Vec<Name> = Vec::new();
        self.len += entries.len();
        for entry in entries {
            if seen.insert(entry.key.clone()) {
                keys.push(entry.key.clone());
            }
            let slot = self.by_key.entry(entry.key.clone()).or_default();
            // Keep each key's entries ordered by (file, path)
            let at = slot.partition_point(|e| (e.file, &e.path) < (entry.file, &entry.path));
            slot.insert(at, entry);
        }
        self.by_file.insert(file, keys);
    }
}

/// Name → entries map owned by a project session.
#[derive(Debug, Default)]
pub struct IndexStore {
    state: RwLock<IndexState>,
}

impl IndexStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace every entry of `file` with those derived from `stubs`.
    pub fn update(&self, file: FileId, stubs: &StubTree) {
        let entries = entries_from_stubs(file, stubs);
        let added = entries.len();
        let mut state = self.state.write();
        let removed = state.remove_file(file);
        state.insert_file(file, entries);
        drop(state);
        tracing::trace!(%file, removed, added, "index updated");
    }

    /// Drop every entry of `file`. Returns how many were removed.
    pub fn remove_file(&self, file: FileId) -> usize {
        self.state.write().remove_file(file)
    }

    /// Entries named `key` within `scope`, ordered by file then path.
    pub fn lookup(&self, key: &str, scope: Scope) -> Vec<IndexEntry> {
        let state = self.state.read();
        state
            .by_key
            .get(key)
            .map(|entries| {
                entries
                    .iter()
                    .filter(|entry| scope.admits(entry.file))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    /// All entries of `file`, in stub pre-order.
    pub fn entries_for_file(&self, file: FileId) -> Vec<IndexEntry> {
        let state = self.state.read();
        let Some(keys) = state.by_file.get(&file) else {
            return Vec::new();
        };
        let mut entries: Vec<IndexEntry> = keys
            .iter()
            .filter_map(|key| state.by_key.get(key))
            .flatten()
            .filter(|entry| entry.file == file)
            .cloned()
            .collect();
        entries.sort_by(|a, b| a.path.cmp(&b.path));
        entries
    }

    pub fn contains_file(&self, file: FileId) -> bool {
        self.state.read().by_file.contains_key(&file)
    }

    /// Files with at least one entry, sorted.
    pub fn files(&self) -> Vec<FileId> {
        let mut files: Vec<FileId> = self.state.read().by_file.keys().copied().collect();
        files.sort();
        files
    }

    pub fn len(&self) -> usize {
        self.state.read().len
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        *self.state.write() = IndexState::default();
    }

    /// Discard everything and re-derive the index from `stubs`.
    ///
    /// The new state is built off to the side and swapped in at once.
    pub fn rebuild_from<'a>(&self, stubs: impl IntoIterator<Item = (FileId, &'a StubTree)>) {
        let mut fresh = IndexState::default();
        for (file, tree) in stubs {
            fresh.remove_file(file);
            fresh.insert_file(file, entries_from_stubs(file, tree));
        }
        *self.state.write() = fresh;
    }
}
