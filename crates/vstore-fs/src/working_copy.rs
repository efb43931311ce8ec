//! Scoped working-copy directories

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

use crate::{Error, RepoPath, Result};

/// A working-copy directory exclusively owned by one client.
///
/// The directory is uniquely named at creation and removed when the guard is
/// dropped. Call [`WorkingCopy::cleanup`] to observe removal errors instead
/// of having them logged.
#[derive(Debug)]
pub struct WorkingCopy {
    dir: Option<TempDir>,
    root: PathBuf,
}

impl WorkingCopy {
    /// Create a fresh, empty working-copy directory.
    ///
    /// The directory is created under `parent` when given, otherwise under
    /// the system temp directory.
    pub fn temporary(prefix: &str, parent: Option<&Path>) -> Result<Self> {
        let mut builder = tempfile::Builder::new();
        builder.prefix(prefix);

        let dir = match parent {
            Some(parent) => {
                fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
                builder.tempdir_in(parent).map_err(|e| Error::io(parent, e))?
            }
            None => builder
                .tempdir()
                .map_err(|e| Error::io(std::env::temp_dir(), e))?,
        };

        let root = dunce::canonicalize(dir.path()).map_err(|e| Error::io(dir.path(), e))?;
        tracing::debug!(root = %root.display(), "Created working copy");

        Ok(Self {
            dir: Some(dir),
            root,
        })
    }

    /// Absolute path of the working-copy directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Absolute filesystem path of a repository path inside this working copy.
    pub fn local(&self, path: &RepoPath) -> PathBuf {
        path.to_native(&self.root)
    }

    /// Write `content` to `path`, creating parent directories as needed.
    pub fn create(&self, path: &RepoPath, content: &[u8]) -> Result<PathBuf> {
        if path.is_root() {
            return Err(Error::unsafe_path(path.as_str(), "cannot write to the working copy root"));
        }
        self.reject_symlinks(path)?;

        let target = self.local(path);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
        }
        fs::write(&target, content).map_err(|e| Error::io(&target, e))?;
        Ok(target)
    }

    /// Remove a file or directory tree. Returns `false` if nothing was there.
    pub fn remove(&self, path: &RepoPath) -> Result<bool> {
        if path.is_root() {
            return Err(Error::unsafe_path(path.as_str(), "cannot remove the working copy root"));
        }
        self.reject_symlinks(&path.parent())?;

        let target = self.local(path);
        let meta = match fs::symlink_metadata(&target) {
            Ok(meta) => meta,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(false),
            Err(e) => return Err(Error::io(&target, e)),
        };

        let removed = if meta.is_dir() {
            fs::remove_dir_all(&target)
        } else {
            fs::remove_file(&target)
        };
        removed.map_err(|e| Error::io(&target, e))?;
        Ok(true)
    }

    pub fn is_file(&self, path: &RepoPath) -> Result<bool> {
        Ok(self.metadata(path)?.is_some_and(|m| m.is_file()))
    }

    pub fn is_dir(&self, path: &RepoPath) -> Result<bool> {
        Ok(self.metadata(path)?.is_some_and(|m| m.is_dir()))
    }

    /// Read a file as text, or `None` when it does not exist.
    pub fn read(&self, path: &RepoPath) -> Result<Option<String>> {
        if !self.is_file(path)? {
            return Ok(None);
        }
        let target = self.local(path);
        let bytes = fs::read(&target).map_err(|e| Error::io(&target, e))?;
        Ok(Some(String::from_utf8_lossy(&bytes).into_owned()))
    }

    /// Remove the working copy, reporting any failure.
    pub fn cleanup(mut self) -> Result<()> {
        match self.dir.take() {
            Some(dir) => dir.close().map_err(|e| Error::io(&self.root, e)),
            None => Ok(()),
        }
    }

    fn metadata(&self, path: &RepoPath) -> Result<Option<fs::Metadata>> {
        self.reject_symlinks(path)?;
        let target = self.local(path);
        match fs::metadata(&target) {
            Ok(meta) => Ok(Some(meta)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(Error::io(&target, e)),
        }
    }

    /// Fail if any existing component of `path` below the root is a symlink.
    fn reject_symlinks(&self, path: &RepoPath) -> Result<()> {
        let mut current = self.root.clone();
        for segment in path.segments() {
            current.push(segment);
            match fs::symlink_metadata(&current) {
                Ok(meta) if meta.file_type().is_symlink() => {
                    return Err(Error::SymlinkInPath { path: current });
                }
                Ok(_) => {}
                Err(e) if e.kind() == ErrorKind::NotFound => return Ok(()),
                Err(e) => return Err(Error::io(&current, e)),
            }
        }
        Ok(())
    }
}

impl Drop for WorkingCopy {
    fn drop(&mut self) {
        if let Some(dir) = self.dir.take() {
            if let Err(e) = dir.close() {
                tracing::warn!(root = %self.root.display(), error = %e, "Failed to remove working copy");
            }
        }
    }
}
