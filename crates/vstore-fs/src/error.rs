//! Error types for vstore-fs

use std::path::PathBuf;

/// Result type for vstore-fs operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in vstore-fs operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Unsafe path '{path}': {reason}")]
    UnsafePath { path: String, reason: String },

    #[error("Refusing to follow symlink inside working copy: {path}")]
    SymlinkInPath { path: PathBuf },

    #[error("Failed to parse {format} config at {path}: {message}")]
    ConfigParse {
        path: PathBuf,
        format: String,
        message: String,
    },

    #[error("Unsupported config format: {extension}")]
    UnsupportedFormat { extension: String },
}

impl Error {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub fn unsafe_path(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::UnsafePath {
            path: path.into(),
            reason: reason.into(),
        }
    }
}
