//! HIR layer tests
//!
//! - Stub extraction over realistic documents
//! - Stub codec: round trip on generated trees, stale and corrupt blobs
//! - Index store consistency under concurrent readers

pub mod tests_index_atomicity;
pub mod tests_stub_codec;
pub mod tests_stub_extraction;
