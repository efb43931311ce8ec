//! Uniform version-control client contract
//!
//! One [`VcsClient`] contract with three implementations:
//!
//! - [`GitClient`]: local clone plus branch pointers
//! - [`SvnClient`]: persistent Subversion working copy, commits on `push`
//! - [`RemoteSvnClient`]: no working copy, every mutation commits directly
//!
//! [`Client`] selects one of them at construction time from a
//! [`ClientConfig`].

pub mod client;
pub mod config;
pub mod contract;
pub mod error;
pub mod git;
pub mod layout;
pub mod parse;
pub mod remote_svn;
pub mod svn;
pub mod svn_codes;
pub mod types;

pub use client::{BackendKind, Client};
pub use config::{ClientConfig, GitSettings, SvnSettings};
pub use contract::{DEFAULT_LOG_LIMIT, VcsClient, validate_ref_name};
pub use error::{Error, Result};
pub use git::GitClient;
pub use layout::{PseudoRoot, Segment};
pub use remote_svn::RemoteSvnClient;
pub use svn::SvnClient;
pub use types::{DirectoryEntry, Listing, LogEntry, Lookup, NodeKind, PendingMessages, RepositoryRef};
