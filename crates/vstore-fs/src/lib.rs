//! Working-copy staging for vstore
//!
//! Provides validated repository-relative paths, the scoped working-copy
//! guard used by the local clients, and format-agnostic config loading.

pub mod config;
pub mod error;
pub mod path;
pub mod working_copy;

pub use config::ConfigStore;
pub use error::{Error, Result};
pub use path::RepoPath;
pub use working_copy::WorkingCopy;
