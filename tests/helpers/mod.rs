//! Test helpers
//!
//! - Source fixtures shared across test modules
//! - Proptest strategies for weft-shaped text

pub mod source_fixtures;
pub mod strategies;
