//! Error types for project operations.

use thiserror::Error;

use super::persist::PersistError;
use crate::base::{FileId, TextRange};

/// Errors surfaced by [`Project`](super::Project).
///
/// Malformed source is never an error: it is represented in the syntax tree
/// and reported through diagnostics.
#[derive(Debug, Error)]
pub enum ProjectError {
    /// Content is not UTF-8, so no lossless tree can be built from it.
    #[error("{file} is not valid UTF-8 (valid up to byte {valid_up_to})")]
    InvalidUtf8 { file: FileId, valid_up_to: usize },

    /// An edit's range lies outside the file or splits a character.
    #[error("edit {range:?} does not fit the current content of {file}")]
    InvalidEdit { file: FileId, range: TextRange },

    /// The file was never submitted, or has been removed.
    #[error("unknown file {0}")]
    UnknownFile(FileId),

    /// The batch worker pool could not be started.
    #[error("worker pool error: {0}")]
    ThreadPool(String),

    /// Reading or writing the persisted stub cache failed.
    #[error("persisted cache error: {0}")]
    Persist(#[from] PersistError),
}

impl ProjectError {
    /// Create a worker pool error.
    pub fn thread_pool(message: impl Into<String>) -> Self {
        Self::ThreadPool(message.into())
    }
}
