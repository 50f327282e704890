//! Project session tests
//!
//! - Submit, query and navigate through the public session API
//! - Content-hash short circuits and stale build handling
//! - Persisted stub cache: save, warm start, version mismatch

pub mod tests_persisted_cache;
pub mod tests_session;
