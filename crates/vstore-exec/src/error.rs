//! Error types for vstore-exec

use std::path::PathBuf;

/// Result type for command execution
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while running a backend binary
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The process ran and exited unsuccessfully.
    #[error("`{command}` exited with status {exit_status}: {stderr}")]
    CommandFailed {
        command: String,
        exit_status: i32,
        stderr: String,
    },

    #[error("Binary not found: {binary}")]
    BinaryNotFound { binary: PathBuf },

    #[error("Working directory does not exist: {path}")]
    MissingWorkingDirectory { path: PathBuf },

    #[error("Failed to spawn {binary}: {source}")]
    Spawn {
        binary: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    /// Exit status of a failed command, `-1` if it was killed by a signal.
    pub fn exit_status(&self) -> Option<i32> {
        match self {
            Self::CommandFailed { exit_status, .. } => Some(*exit_status),
            _ => None,
        }
    }

    /// Captured stderr of a failed command.
    pub fn stderr(&self) -> Option<&str> {
        match self {
            Self::CommandFailed { stderr, .. } => Some(stderr),
            _ => None,
        }
    }
}
