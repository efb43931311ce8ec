//! Backend command execution
//!
//! Spawns `svn` / `git` style binaries with an argument vector, never through
//! a shell, and reports failures with their exit status and stderr.

pub mod error;
pub mod executor;

pub use error::{Error, Result};
pub use executor::{CliExecutor, CommandExecutor};
