//! Shared test utilities for the vstore workspace.
//!
//! Dev-dependency only, never published.
//!
//! # Modules
//!
//! - [`scripted`]: an executor that replays canned backend replies and
//!   records every invocation
//! - [`repos`]: real Subversion and Git repositories on disk

pub mod repos;
pub mod scripted;

pub use repos::{bare_git_repo_with_commit, binary_available, file_url, git_available, svn_available, svn_repo_with_layout};
pub use scripted::{Call, Reply, ScriptedExecutor};
