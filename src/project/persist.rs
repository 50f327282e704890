//! Persisted stub cache.
//!
//! One file, all integers little-endian:
//!
//! ```text
//! u32 format_version | u32 entry_count
//! entry_count × (u32 file_id | u64 content_hash | u32 blob_len | blob)
//! ```
//!
//! `blob` is exactly the stub codec output. A cache written by a different
//! format version is discarded as a whole.

use std::fs;
use std::io;
use std::path::Path;

use rustc_hash::FxHashSet;
use thiserror::Error;

use crate::base::{ContentHash, FileId};
use crate::hir::{CodecError, FORMAT_VERSION, StubTree, decode};

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Written by another grammar or layout version; rebuild from source.
    #[error("persisted cache has format version {found}, expected {expected}")]
    VersionMismatch { found: u32, expected: u32 },

    #[error("persisted cache is truncated at byte {offset}")]
    Truncated { offset: usize },

    #[error("stub blob for {file} is invalid: {source}")]
    BadBlob {
        file: FileId,
        #[source]
        source: CodecError,
    },

    #[error("{file} appears more than once")]
    DuplicateFile { file: FileId },

    #[error("{count} trailing bytes after the last entry")]
    TrailingBytes { count: usize },
}

impl PersistError {
    pub fn is_version_mismatch(&self) -> bool {
        matches!(self, PersistError::VersionMismatch { .. })
    }
}

/// One file's stubs as read back from disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedEntry {
    pub file: FileId,
    pub content_hash: ContentHash,
    pub stubs: StubTree,
}

/// Serialize `(file, hash, blob)` triples. Entries are written in the given order.
pub fn write_cache<'a>(entries: impl IntoIterator<Item = (FileId, ContentHash, &'a [u8])>) -> Vec<u8> {
    let entries: Vec<_> = entries.into_iter().collect();
    let mut out = Vec::new();
    out.extend_from_slice(&FORMAT_VERSION.to_le_bytes());
    out.extend_from_slice(&(entries.len() as u32).to_le_bytes());
    for (file, hash, blob) in entries {
        out.extend_from_slice(&file.raw().to_le_bytes());
        out.extend_from_slice(&hash.raw().to_le_bytes());
        out.extend_from_slice(&(blob.len() as u32).to_le_bytes());
        out.extend_from_slice(blob);
    }
    out
}

fn take<'a>(bytes: &'a [u8], pos: &mut usize, n: usize) -> Result<&'a [u8], PersistError> {
    let end = pos
        .checked_add(n)
        .filter(|&end| end <= bytes.len())
        .ok_or(PersistError::Truncated { offset: *pos })?;
    let slice = &bytes[*pos..end];
    *pos = end;
    Ok(slice)
}

fn take_u32(bytes: &[u8], pos: &mut usize) -> Result<u32, PersistError> {
    let b = take(bytes, pos, 4)?;
    Ok(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
}

fn take_u64(bytes: &[u8], pos: &mut usize) -> Result<u64, PersistError> {
    let b = take(bytes, pos, 8)?;
    let mut raw = [0u8; 8];
    raw.copy_from_slice(b);
    Ok(u64::from_le_bytes(raw))
}

/// Parse a persisted cache. Any failure rejects the whole cache.
pub fn read_cache(bytes: &[u8]) -> Result<Vec<PersistedEntry>, PersistError> {
    let mut pos = 0;
    let version = take_u32(bytes, &mut pos)?;
    if version != FORMAT_VERSION {
        return Err(PersistError::VersionMismatch {
            found: version,
            expected: FORMAT_VERSION,
        });
    }
    let count = take_u32(bytes, &mut pos)? as usize;

    // An entry header alone is 16 bytes
    let mut entries: Vec<PersistedEntry> = Vec::with_capacity(count.min(bytes.len() / 16));
    let mut files: FxHashSet<FileId> = FxHashSet::default();
    for _ in 0..count {
        let file = FileId::new(take_u32(bytes, &mut pos)?);
        let content_hash = ContentHash::from_raw(take_u64(bytes, &mut pos)?);
        let len = take_u32(bytes, &mut pos)? as usize;
        let blob = take(bytes, &mut pos, len)?;
        if !files.insert(file) {
            return Err(PersistError::DuplicateFile { file });
        }
        let stubs = decode(blob).map_err(|source| PersistError::BadBlob { file, source })?;
        entries.push(PersistedEntry {
            file,
            content_hash,
            stubs,
        });
    }

    if pos != bytes.len() {
        return Err(PersistError::TrailingBytes {
            count: bytes.len() - pos,
        });
    }
    Ok(entries)
}

/// Write the cache to `path`, replacing any previous file in one rename.
pub fn save_cache<'a>(
    path: &Path,
    entries: impl IntoIterator<Item = (FileId, ContentHash, &'a [u8])>,
) -> Result<(), PersistError> {
    let bytes = write_cache(entries);
    let tmp = path.with_extension("tmp");
    fs::write(&tmp, &bytes)?;
    fs::rename(&tmp, path)?;
    tracing::debug!(path = %path.display(), bytes = bytes.len(), "saved stub cache");
    Ok(())
}

pub fn load_cache(path: &Path) -> Result<Vec<PersistedEntry>, PersistError> {
    let bytes = fs::read(path)?;
    let entries = read_cache(&bytes)?;
    tracing::debug!(path = %path.display(), entries = entries.len(), "loaded stub cache");
    Ok(entries)
}
