//! Repository-relative path handling

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::{Error, Result};

/// Administrative directories owned by the backends themselves.
const ADMIN_SEGMENTS: &[&str] = &[".git", ".svn"];

/// A validated path relative to the repository root.
///
/// Stored with forward slashes and no leading or trailing separator. The empty
/// path is the repository root. Construction rejects anything that could
/// escape a working copy or be read as a command-line option by a backend.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct RepoPath {
    inner: String,
}

impl RepoPath {
    /// The repository root.
    pub fn root() -> Self {
        Self::default()
    }

    /// Parse and validate a repository-relative path.
    ///
    /// Backslashes are treated as separators; `.` and empty segments are
    /// dropped.
    pub fn parse(raw: &str) -> Result<Self> {
        if raw.chars().any(|c| c.is_control()) {
            return Err(Error::unsafe_path(raw, "contains control characters"));
        }

        let normalized = raw.replace('\\', "/");
        if normalized.starts_with('/') {
            return Err(Error::unsafe_path(raw, "absolute paths are not allowed"));
        }
        if normalized.starts_with('~') {
            return Err(Error::unsafe_path(raw, "home-relative paths are not allowed"));
        }

        let mut segments = Vec::new();
        for segment in normalized.split('/') {
            match segment {
                "" | "." => continue,
                ".." => {
                    return Err(Error::unsafe_path(raw, "parent directory segments are not allowed"));
                }
                s if s.starts_with('-') => {
                    return Err(Error::unsafe_path(raw, "segments may not start with '-'"));
                }
                s if ADMIN_SEGMENTS.contains(&s) => {
                    return Err(Error::unsafe_path(raw, format!("'{s}' is reserved")));
                }
                s => segments.push(s),
            }
        }

        if let Some(first) = segments.first() {
            if is_drive_prefix(first) {
                return Err(Error::unsafe_path(raw, "absolute paths are not allowed"));
            }
        }

        Ok(Self {
            inner: segments.join("/"),
        })
    }

    /// Get the normalized string representation.
    pub fn as_str(&self) -> &str {
        &self.inner
    }

    pub fn is_root(&self) -> bool {
        self.inner.is_empty()
    }

    /// The containing directory. The parent of a top-level entry (and of the
    /// root itself) is the root.
    pub fn parent(&self) -> Self {
        match self.inner.rfind('/') {
            Some(idx) => Self {
                inner: self.inner[..idx].to_string(),
            },
            None => Self::root(),
        }
    }

    /// The last segment, or `None` for the root.
    pub fn file_name(&self) -> Option<&str> {
        if self.is_root() {
            None
        } else {
            self.inner.rsplit('/').next()
        }
    }

    /// Join a relative path onto this one, validating the result.
    pub fn join(&self, relative: &str) -> Result<Self> {
        if self.is_root() {
            Self::parse(relative)
        } else {
            Self::parse(&format!("{}/{}", self.inner, relative))
        }
    }

    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.inner.split('/').filter(|s| !s.is_empty())
    }

    /// Resolve against a base directory using native separators.
    pub fn to_native(&self, base: &Path) -> PathBuf {
        let mut out = base.to_path_buf();
        out.extend(self.segments());
        out
    }
}

fn is_drive_prefix(segment: &str) -> bool {
    let bytes = segment.as_bytes();
    bytes.len() == 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':'
}

impl fmt::Display for RepoPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.inner)
    }
}

impl AsRef<str> for RepoPath {
    fn as_ref(&self) -> &str {
        &self.inner
    }
}

impl FromStr for RepoPath {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("foo/bar.txt", "foo/bar.txt")]
    #[case("", "")]
    #[case("foo//bar/", "foo/bar")]
    #[case("./foo/./bar", "foo/bar")]
    #[case("foo\\bar", "foo/bar")]
    fn test_parse_normalizes(#[case] raw: &str, #[case] expected: &str) {
        assert_eq!(RepoPath::parse(raw).unwrap().as_str(), expected);
    }

    #[rstest]
    #[case("../etc/passwd")]
    #[case("foo/../../bar")]
    #[case("/etc/passwd")]
    #[case("~/secret")]
    #[case("-rf")]
    #[case("foo/--force")]
    #[case("foo\0bar")]
    #[case("foo\nbar")]
    #[case(".svn/entries")]
    #[case("sub/.git/config")]
    #[case("C:/Windows")]
    fn test_parse_rejects_unsafe(#[case] raw: &str) {
        let err = RepoPath::parse(raw).unwrap_err();
        assert!(matches!(err, Error::UnsafePath { .. }), "got {err:?}");
    }

    #[test]
    fn test_parent_and_file_name() {
        let path = RepoPath::parse("foo/bar/baz.txt").unwrap();
        assert_eq!(path.parent().as_str(), "foo/bar");
        assert_eq!(path.file_name(), Some("baz.txt"));

        let top = RepoPath::parse("index.html").unwrap();
        assert!(top.parent().is_root());
        assert_eq!(RepoPath::root().file_name(), None);
        assert!(RepoPath::root().parent().is_root());
    }

    #[test]
    fn test_join_validates() {
        let base = RepoPath::parse("foo").unwrap();
        assert_eq!(base.join("bar.txt").unwrap().as_str(), "foo/bar.txt");
        assert!(base.join("../../x").is_err());
        assert_eq!(RepoPath::root().join("a").unwrap().as_str(), "a");
    }

    #[test]
    fn test_to_native_stays_under_base() {
        let base = Path::new("/tmp/wc");
        let path = RepoPath::parse("a/b.txt").unwrap();
        assert_eq!(path.to_native(base), base.join("a").join("b.txt"));
        assert_eq!(RepoPath::root().to_native(base), base.to_path_buf());
    }
}
