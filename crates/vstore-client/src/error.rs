//! Error types for vstore-client

/// Result type for client operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by client operations.
///
/// A backend "not found" never appears here for reads; those are absorbed
/// into `false`, `None` or an empty result.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Backend command failure
    #[error(transparent)]
    Command(#[from] vstore_exec::Error),

    /// Path validation or working-copy I/O failure
    #[error(transparent)]
    Fs(#[from] vstore_fs::Error),

    #[error("URL has no trailing trunk, branches/<name> or tags/<name> segment: {url}")]
    Layout { url: String },

    #[error("Invalid ref name '{name}': {reason}")]
    InvalidRefName { name: String, reason: String },

    #[error("Ref '{name}' is read-only")]
    ReadOnlyRef { name: String },

    #[error("Failed to parse {format} output: {message}")]
    Parse { format: String, message: String },

    #[error("Client is not bound to a repository; call init first")]
    NotBound,
}

impl Error {
    pub fn parse(format: &str, message: impl Into<String>) -> Self {
        Self::Parse {
            format: format.into(),
            message: message.into(),
        }
    }

    /// True when a path was rejected before reaching the filesystem or backend.
    pub fn is_unsafe_path(&self) -> bool {
        matches!(
            self,
            Self::Fs(vstore_fs::Error::UnsafePath { .. } | vstore_fs::Error::SymlinkInPath { .. })
        )
    }
}
