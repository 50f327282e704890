//! Content hashing for staleness detection.

use std::fmt;

use xxhash_rust::xxh3::xxh3_64;

/// Digest of a file's raw bytes.
///
/// Two builds with equal hashes (and equal format versions) are
/// interchangeable; any difference means the cached record is stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ContentHash(u64);

impl ContentHash {
    /// Hash raw file bytes.
    pub fn of(bytes: &[u8]) -> Self {
        Self(xxh3_64(bytes))
    }

    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}
