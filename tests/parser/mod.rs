//! Parser layer tests
//!
//! - End-to-end lexing and parsing of small documents
//! - Error recovery stays local to the broken statement
//! - Properties: lossless trees, restartable lexing, incremental relexing

pub mod tests_parse_scenarios;
pub mod tests_properties;
pub mod tests_recovery;
