//! Client configuration
//!
//! Loaded from TOML/JSON/YAML through [`vstore_fs::ConfigStore`]:
//!
//! ```toml
//! backend = "svn"
//! url = "https://svn.example.org/project/trunk"
//!
//! [svn]
//! username = "deploy"
//! password = "secret"
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use vstore_exec::CliExecutor;

use crate::client::BackendKind;
use crate::Result;

/// Top-level client configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ClientConfig {
    pub backend: BackendKind,
    /// Remote to bind to. May also be supplied at `init` time.
    pub url: Option<String>,
    /// Parent directory for working copies. Defaults to the system temp dir.
    pub checkout_root: Option<PathBuf>,
    pub svn: SvnSettings,
    pub git: GitSettings,
}

impl ClientConfig {
    pub fn load(path: &Path) -> Result<Self> {
        Ok(vstore_fs::ConfigStore::new().load(path)?)
    }
}

/// Subversion binary and credentials.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SvnSettings {
    pub binary: PathBuf,
    pub username: Option<String>,
    pub password: Option<String>,
    pub non_interactive: bool,
}

impl Default for SvnSettings {
    fn default() -> Self {
        Self {
            binary: PathBuf::from("svn"),
            username: None,
            password: None,
            non_interactive: true,
        }
    }
}

impl SvnSettings {
    /// Executor passing the global options after every subcommand.
    pub fn executor(&self) -> CliExecutor {
        let mut exec = CliExecutor::new(&self.binary);
        if self.non_interactive {
            exec = exec.trailing_arg("--non-interactive");
        }
        if let Some(username) = &self.username {
            exec = exec.trailing_arg("--username").trailing_arg(username);
        }
        if let Some(password) = &self.password {
            exec = exec
                .trailing_arg("--password")
                .trailing_arg(password)
                .trailing_arg("--no-auth-cache");
        }
        exec
    }
}

/// Git binary, remote and identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GitSettings {
    pub binary: PathBuf,
    pub remote: String,
    pub default_branch: String,
    pub user_name: Option<String>,
    pub user_email: Option<String>,
}

impl Default for GitSettings {
    fn default() -> Self {
        Self {
            binary: PathBuf::from("git"),
            remote: "origin".to_string(),
            default_branch: "master".to_string(),
            user_name: None,
            user_email: None,
        }
    }
}

impl GitSettings {
    /// Executor with merge-based pulls, no terminal prompts and the
    /// configured commit identity.
    pub fn executor(&self) -> CliExecutor {
        let mut exec = CliExecutor::new(&self.binary)
            .leading_arg("-c")
            .leading_arg("pull.rebase=false")
            .env("GIT_TERMINAL_PROMPT", "0");
        if let Some(name) = &self.user_name {
            exec = exec.leading_arg("-c").leading_arg(format!("user.name={name}"));
        }
        if let Some(email) = &self.user_email {
            exec = exec.leading_arg("-c").leading_arg(format!("user.email={email}"));
        }
        exec
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.backend, BackendKind::Svn);
        assert_eq!(config.svn.binary, PathBuf::from("svn"));
        assert!(config.svn.non_interactive);
        assert_eq!(config.git.remote, "origin");
        assert_eq!(config.git.default_branch, "master");
    }

    #[test]
    fn test_svn_executor_keeps_credentials_out_of_rendered_command() {
        let settings = SvnSettings {
            username: Some("deploy".into()),
            password: Some("hunter2".into()),
            ..SvnSettings::default()
        };
        let rendered = settings.executor().render("ls", &["https://h/repo/trunk"]);
        assert_eq!(rendered, "svn ls https://h/repo/trunk");
    }

    #[test]
    fn test_git_executor_sets_identity() {
        let settings = GitSettings {
            user_name: Some("Deploy Bot".into()),
            ..GitSettings::default()
        };
        let rendered = settings.executor().render("commit", &[]);
        assert_eq!(rendered, "git -c pull.rebase=false -c user.name=Deploy Bot commit");
    }

    #[test]
    fn test_parse_partial_toml() {
        let config: ClientConfig = toml::from_str(
            r#"
            backend = "svn-remote"
            url = "file:///srv/repo/trunk"

            [svn]
            username = "deploy"
            "#,
        )
        .unwrap();

        assert_eq!(config.backend, BackendKind::RemoteSvn);
        assert_eq!(config.url.as_deref(), Some("file:///srv/repo/trunk"));
        assert_eq!(config.svn.username.as_deref(), Some("deploy"));
        assert_eq!(config.svn.binary, PathBuf::from("svn"));
    }
}
