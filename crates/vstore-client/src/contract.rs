//! The operation set every client exposes

use crate::types::{Listing, LogEntry, NodeKind, RepositoryRef};
use crate::{Error, Result};

/// Default number of entries returned by `log`.
pub const DEFAULT_LOG_LIMIT: usize = 10;

/// Content-management operations over a version-controlled repository.
///
/// Paths are repository-relative and validated before use; an unsafe path
/// fails with an `UnsafePath` error. Reads treat a missing path as a normal
/// outcome (`false`, `None`, empty). Every other backend failure propagates.
pub trait VcsClient {
    /// Bind to `remote_url`. Local strategies also perform the first sync.
    ///
    /// Calling again with the same URL only re-synchronizes.
    fn init(&mut self, remote_url: &str) -> Result<()>;

    /// Create a branch from the current ref, optionally switching to it.
    fn branch(&mut self, name: &str, switch: bool) -> Result<()>;

    /// Select a branch or tag by name, or trunk / the default branch for `None`.
    ///
    /// The reference is updated even if the target holds no files yet.
    fn checkout(&mut self, reference: Option<&str>) -> Result<()>;

    /// Snapshot the current ref under `name`. The current ref is unchanged.
    fn tag(&mut self, name: &str) -> Result<()>;

    fn has(&self, path: &str, kind: NodeKind) -> Result<bool>;

    /// File content, or `None` if absent.
    fn get(&self, path: &str) -> Result<Option<String>>;

    /// Entries of a directory in backend listing order. `""` is the root.
    fn ls(&self, path: &str) -> Result<Listing>;

    /// Remove `path`. The message is queued or committed immediately
    /// depending on the strategy.
    fn rm(&mut self, path: &str, message: &str) -> Result<()>;

    /// Create or overwrite `path`, creating parent directories as needed.
    fn put(&mut self, path: &str, content: &str, message: &str) -> Result<()>;

    /// Flush local changes to the remote.
    fn push(&mut self) -> Result<()>;

    /// Bring local state up to date with the remote.
    fn pull(&mut self) -> Result<()>;

    /// History of `path`, newest first, at most `limit` entries (0 = all).
    fn log(&self, path: &str, limit: usize) -> Result<Vec<LogEntry>>;

    /// The entry for exactly `revision`, scoped to `path` when given.
    fn get_commit(&self, revision: &str, path: Option<&str>) -> Result<Option<LogEntry>>;

    /// Current binding, `None` before `init`.
    fn reference(&self) -> Option<&RepositoryRef>;
}

/// Check that `name` can be used as a branch or tag name.
///
/// Names are a single path segment so they map onto exactly one
/// `branches/<name>` or `tags/<name>` directory.
pub fn validate_ref_name(name: &str) -> Result<()> {
    let reject = |reason: &str| {
        Err(Error::InvalidRefName {
            name: name.to_string(),
            reason: reason.to_string(),
        })
    };

    if name.is_empty() {
        return reject("name is empty");
    }
    if name.contains('/') || name.contains('\\') {
        return reject("name must be a single path segment");
    }
    if name.starts_with('-') {
        return reject("name may not start with '-'");
    }
    if name.contains('@') {
        return reject("name may not contain '@'");
    }
    if name == "." || name.contains("..") {
        return reject("name may not contain '..'");
    }
    if name.chars().any(|c| c.is_whitespace() || c.is_control()) {
        return reject("name may not contain whitespace or control characters");
    }
    Ok(())
}
