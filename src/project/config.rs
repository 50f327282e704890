//! Project configuration.

use std::path::PathBuf;

/// Options for a [`Project`](super::Project) session.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ProjectConfig {
    /// Threads for batch builds (`None` uses rayon's global pool)
    pub worker_threads: Option<usize>,
    /// Where [`Project::save`](super::Project::save) and
    /// [`Project::restore`](super::Project::restore) keep the stub cache
    pub cache_path: Option<PathBuf>,
    /// Keep each record's encoded stub blob in memory
    pub keep_blobs: bool,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            worker_threads: None,
            cache_path: None,
            keep_blobs: true,
        }
    }
}

impl ProjectConfig {
    pub fn with_worker_threads(mut self, threads: usize) -> Self {
        self.worker_threads = Some(threads);
        self
    }

    pub fn with_cache_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.cache_path = Some(path.into());
        self
    }

    pub fn with_keep_blobs(mut self, keep: bool) -> Self {
        self.keep_blobs = keep;
        self
    }
}
