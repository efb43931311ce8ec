//! Backend selection

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use vstore_exec::{CliExecutor, CommandExecutor};

use crate::config::ClientConfig;
use crate::contract::VcsClient;
use crate::git::GitClient;
use crate::remote_svn::RemoteSvnClient;
use crate::svn::SvnClient;
use crate::types::{Listing, LogEntry, NodeKind, RepositoryRef};
use crate::{Error, Result};

/// The supported client strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BackendKind {
    Git,
    #[default]
    Svn,
    #[serde(rename = "svn-remote")]
    RemoteSvn,
}

impl BackendKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Git => "git",
            Self::Svn => "svn",
            Self::RemoteSvn => "svn-remote",
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BackendKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "git" => Ok(Self::Git),
            "svn" => Ok(Self::Svn),
            "svn-remote" | "remote-svn" => Ok(Self::RemoteSvn),
            other => Err(Error::parse("backend", format!("unknown backend '{other}'"))),
        }
    }
}

/// One of the three clients, chosen at construction time.
#[derive(Debug)]
pub enum Client<E: CommandExecutor = CliExecutor> {
    Git(GitClient<E>),
    Svn(SvnClient<E>),
    RemoteSvn(RemoteSvnClient<E>),
}

impl Client<CliExecutor> {
    /// Build the configured client with a command-line executor.
    pub fn from_config(config: &ClientConfig) -> Self {
        let client = match config.backend {
            BackendKind::Git => {
                let mut git = GitClient::new(config.git.executor())
                    .with_remote(&config.git.remote)
                    .with_default_branch(&config.git.default_branch);
                if let Some(root) = &config.checkout_root {
                    git = git.with_checkout_root(root);
                }
                Self::Git(git)
            }
            BackendKind::Svn => {
                let mut svn = SvnClient::new(config.svn.executor());
                if let Some(root) = &config.checkout_root {
                    svn = svn.with_checkout_root(root);
                }
                Self::Svn(svn)
            }
            BackendKind::RemoteSvn => {
                let mut svn = RemoteSvnClient::new(config.svn.executor());
                if let Some(root) = &config.checkout_root {
                    svn = svn.with_checkout_root(root);
                }
                Self::RemoteSvn(svn)
            }
        };
        tracing::debug!(backend = %config.backend, "Constructed client");
        client
    }
}

impl<E: CommandExecutor> Client<E> {
    /// Wrap an executor in the client for `kind`.
    pub fn with_executor(kind: BackendKind, exec: E) -> Self {
        match kind {
            BackendKind::Git => Self::Git(GitClient::new(exec)),
            BackendKind::Svn => Self::Svn(SvnClient::new(exec)),
            BackendKind::RemoteSvn => Self::RemoteSvn(RemoteSvnClient::new(exec)),
        }
    }

    pub fn kind(&self) -> BackendKind {
        match self {
            Self::Git(_) => BackendKind::Git,
            Self::Svn(_) => BackendKind::Svn,
            Self::RemoteSvn(_) => BackendKind::RemoteSvn,
        }
    }

    fn inner(&self) -> &dyn VcsClient {
        match self {
            Self::Git(c) => c,
            Self::Svn(c) => c,
            Self::RemoteSvn(c) => c,
        }
    }

    fn inner_mut(&mut self) -> &mut dyn VcsClient {
        match self {
            Self::Git(c) => c,
            Self::Svn(c) => c,
            Self::RemoteSvn(c) => c,
        }
    }
}

impl<E: CommandExecutor> VcsClient for Client<E> {
    fn init(&mut self, remote_url: &str) -> Result<()> {
        self.inner_mut().init(remote_url)
    }

    fn branch(&mut self, name: &str, switch: bool) -> Result<()> {
        self.inner_mut().branch(name, switch)
    }

    fn checkout(&mut self, reference: Option<&str>) -> Result<()> {
        self.inner_mut().checkout(reference)
    }

    fn tag(&mut self, name: &str) -> Result<()> {
        self.inner_mut().tag(name)
    }

    fn has(&self, path: &str, kind: NodeKind) -> Result<bool> {
        self.inner().has(path, kind)
    }

    fn get(&self, path: &str) -> Result<Option<String>> {
        self.inner().get(path)
    }

    fn ls(&self, path: &str) -> Result<Listing> {
        self.inner().ls(path)
    }

    fn rm(&mut self, path: &str, message: &str) -> Result<()> {
        self.inner_mut().rm(path, message)
    }

    fn put(&mut self, path: &str, content: &str, message: &str) -> Result<()> {
        self.inner_mut().put(path, content, message)
    }

    fn push(&mut self) -> Result<()> {
        self.inner_mut().push()
    }

    fn pull(&mut self) -> Result<()> {
        self.inner_mut().pull()
    }

    fn log(&self, path: &str, limit: usize) -> Result<Vec<LogEntry>> {
        self.inner().log(path, limit)
    }

    fn get_commit(&self, revision: &str, path: Option<&str>) -> Result<Option<LogEntry>> {
        self.inner().get_commit(revision, path)
    }

    fn reference(&self) -> Option<&RepositoryRef> {
        self.inner().reference()
    }
}
