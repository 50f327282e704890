//! Project sessions: the boundary the rest of a toolchain talks to.
//!
//! A [`Project`] owns one [`FileCache`](crate::hir::FileCache) and one
//! [`IndexStore`](crate::hir::IndexStore). Callers submit file contents,
//! query symbols and ask for syntax trees; the session decides what to
//! rebuild.

mod config;
mod error;
pub mod persist;
mod session;

pub use config::ProjectConfig;
pub use error::ProjectError;
pub use persist::{PersistError, PersistedEntry};
pub use session::{FileDiagnostics, Project, SubmitOutcome};
