//! Real repositories for end-to-end tests.
//!
//! Tests using these should first check [`svn_available`] or
//! [`git_available`] and return early when the binaries are missing.

use std::path::Path;
use std::process::Command;

/// True if `binary --version` runs successfully.
pub fn binary_available(binary: &str) -> bool {
    Command::new(binary)
        .arg("--version")
        .output()
        .is_ok_and(|output| output.status.success())
}

/// Both `svn` and `svnadmin` are installed.
pub fn svn_available() -> bool {
    binary_available("svn") && binary_available("svnadmin")
}

pub fn git_available() -> bool {
    binary_available("git")
}

/// `file://` URL for a local path.
pub fn file_url(path: &Path) -> String {
    let path = path.to_string_lossy().replace('\\', "/");
    if path.starts_with('/') {
        format!("file://{path}")
    } else {
        format!("file:///{path}")
    }
}

/// Creates a Subversion repository at `path` with the standard
/// `trunk`, `branches` and `tags` directories and returns the trunk URL.
///
/// # Panics
/// Panics if `svnadmin` or `svn` fail.
pub fn svn_repo_with_layout(path: &Path) -> String {
    let output = Command::new("svnadmin")
        .arg("create")
        .arg(path)
        .output()
        .unwrap_or_else(|e| panic!("svn_repo_with_layout: failed to run svnadmin: {e}"));
    if !output.status.success() {
        panic!(
            "svn_repo_with_layout: svnadmin create failed:\n{}",
            String::from_utf8_lossy(&output.stderr)
        );
    }

    let root = file_url(path);
    let output = Command::new("svn")
        .args(["mkdir", "--parents", "--non-interactive", "--message", "Create layout"])
        .arg(format!("{root}/trunk"))
        .arg(format!("{root}/branches"))
        .arg(format!("{root}/tags"))
        .output()
        .unwrap_or_else(|e| panic!("svn_repo_with_layout: failed to run svn: {e}"));
    if !output.status.success() {
        panic!(
            "svn_repo_with_layout: svn mkdir failed:\n{}",
            String::from_utf8_lossy(&output.stderr)
        );
    }

    format!("{root}/trunk")
}

/// Creates a bare Git repository at `path` whose `master` branch holds one
/// commit with a `README.md`, and returns its clone URL.
///
/// # Panics
/// Panics if any `git2` operation fails.
pub fn bare_git_repo_with_commit(path: &Path) -> String {
    let mut opts = git2::RepositoryInitOptions::new();
    opts.bare(true).initial_head("master");
    let repo = git2::Repository::init_opts(path, &opts).unwrap_or_else(|e| {
        panic!(
            "bare_git_repo_with_commit: failed to init at {}: {e}",
            path.display()
        )
    });

    let blob = repo
        .blob(b"# vstore fixture\n")
        .unwrap_or_else(|e| fail("blob", e));
    let mut builder = repo.treebuilder(None).unwrap_or_else(|e| fail("treebuilder", e));
    builder
        .insert("README.md", blob, 0o100644)
        .unwrap_or_else(|e| fail("tree insert", e));
    let tree_id = builder.write().unwrap_or_else(|e| fail("tree write", e));
    let tree = repo.find_tree(tree_id).unwrap_or_else(|e| fail("find tree", e));
    let signature =
        git2::Signature::now("Fixture", "fixture@example.com").unwrap_or_else(|e| fail("signature", e));

    repo.commit(Some("HEAD"), &signature, &signature, "Initial commit", &tree, &[])
        .unwrap_or_else(|e| fail("commit", e));

    path.to_string_lossy().into_owned()
}

fn fail<T>(step: &str, e: git2::Error) -> T {
    panic!("bare_git_repo_with_commit: {step} failed: {e}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_file_url() {
        assert_eq!(file_url(Path::new("/srv/repo")), "file:///srv/repo");
    }

    #[test]
    fn test_bare_git_repo_has_master_commit() {
        let dir = TempDir::new().unwrap();
        bare_git_repo_with_commit(dir.path());

        let repo = git2::Repository::open_bare(dir.path()).unwrap();
        let head = repo.head().unwrap();
        assert_eq!(head.shorthand(), Some("master"));
        let commit = head.peel_to_commit().unwrap();
        assert!(commit.tree().unwrap().get_name("README.md").is_some());
    }

    #[test]
    fn test_missing_binary_is_unavailable() {
        assert!(!binary_available("vstore-no-such-binary"));
    }
}
