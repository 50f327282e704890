//! File identifiers.

use std::fmt;

/// Identity of a source file within a project.
///
/// The id is opaque to the core: the owner of the project decides how paths
/// map to ids. Persisted stub caches store the raw `u32`, so ids must be
/// stable across sessions for a warm start to be useful.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FileId(u32);

impl FileId {
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl From<u32> for FileId {
    fn from(raw: u32) -> Self {
        Self(raw)
    }
}

impl fmt::Display for FileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "file#{}", self.0)
    }
}
