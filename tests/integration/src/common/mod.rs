use tempfile::TempDir;
use vstore_client::{BackendKind, Client, GitSettings, SvnSettings};
use vstore_test_utils::{bare_git_repo_with_commit, git_available, svn_available, svn_repo_with_layout};

/// A throwaway remote repository for one backend family.
pub struct Remote {
    _dir: TempDir,
    pub url: String,
}

impl Remote {
    /// Creates a remote suitable for `kind`, or `None` if its binaries are
    /// not installed.
    pub fn for_kind(kind: BackendKind) -> Option<Self> {
        let dir = TempDir::new().unwrap();
        let url = match kind {
            BackendKind::Git => {
                if !git_available() {
                    eprintln!("git not installed, skipping");
                    return None;
                }
                bare_git_repo_with_commit(&dir.path().join("origin.git"))
            }
            BackendKind::Svn | BackendKind::RemoteSvn => {
                if !svn_available() {
                    eprintln!("svn not installed, skipping");
                    return None;
                }
                svn_repo_with_layout(&dir.path().join("repo"))
            }
        };
        Some(Self { _dir: dir, url })
    }
}

/// A command-line client for `kind` with a fixed commit identity.
pub fn client(kind: BackendKind) -> Client {
    let exec = match kind {
        BackendKind::Git => GitSettings {
            user_name: Some("Test".into()),
            user_email: Some("test@example.com".into()),
            ..GitSettings::default()
        }
        .executor(),
        BackendKind::Svn | BackendKind::RemoteSvn => SvnSettings::default().executor(),
    };
    Client::with_executor(kind, exec)
}
