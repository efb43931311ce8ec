//! Subversion client without a persistent working copy
//!
//! Every mutation is a direct server-side commit, so `push` and `pull` do
//! nothing. Writes go through a short-lived [`SvnClient`] checked out at the
//! file's parent directory.

use std::path::PathBuf;

use vstore_exec::CommandExecutor;
use vstore_fs::RepoPath;

use crate::contract::{VcsClient, validate_ref_name};
use crate::layout::PseudoRoot;
use crate::parse::svn_xml;
use crate::svn::{
    SvnClient, branch_message, commit_at, ensure_writable, join_url, limited_log, peg_safe, ref_of,
    tag_message,
};
use crate::svn_codes::lookup;
use crate::types::{Listing, LogEntry, NodeKind, RepositoryRef};
use crate::{Error, Result};

/// Subversion client working directly against repository URLs.
#[derive(Debug)]
pub struct RemoteSvnClient<E: CommandExecutor> {
    exec: E,
    checkout_root: Option<PathBuf>,
    reference: Option<RepositoryRef>,
}

impl<E: CommandExecutor> RemoteSvnClient<E> {
    pub fn new(exec: E) -> Self {
        Self {
            exec,
            checkout_root: None,
            reference: None,
        }
    }

    /// Parent directory for the ephemeral working copies used by `put`.
    pub fn with_checkout_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.checkout_root = Some(root.into());
        self
    }

    pub fn pseudo_root(&self) -> Result<PseudoRoot> {
        PseudoRoot::resolve(self.url()?)
    }

    fn url(&self) -> Result<&str> {
        self.reference
            .as_ref()
            .map(|r| r.remote_url.as_str())
            .ok_or(Error::NotBound)
    }

    /// Absolute URL of a repository path under the bound URL.
    fn abs_url(&self, path: &RepoPath) -> Result<String> {
        Ok(peg_safe(&join_url(self.url()?, path)))
    }

    fn bind(&mut self, url: &str) {
        self.reference = Some(RepositoryRef {
            remote_url: url.to_string(),
            current_ref: ref_of(url),
        });
    }

    fn svn_lookup(&self, command: &str, args: &[&str]) -> Result<Option<String>> {
        Ok(lookup(self.exec.exec(None, command, args))?.into_option())
    }

    fn has_path(&self, path: &RepoPath, kind: NodeKind) -> Result<bool> {
        let url = self.abs_url(path)?;
        match self.svn_lookup("info", &["--xml", url.as_str()])? {
            Some(xml) => Ok(svn_xml::parse_info(&xml)?.kind == kind),
            None => Ok(false),
        }
    }

    /// Check out `parent_url`, write `file_name` and commit it.
    fn commit_through_working_copy(
        &self,
        parent_url: &str,
        file_name: &str,
        content: &str,
        message: &str,
    ) -> Result<()> {
        let mut inner = SvnClient::new(self.exec.clone());
        if let Some(root) = &self.checkout_root {
            inner = inner.with_checkout_root(root);
        }

        // `inner` drops its working copy on every early return.
        inner.init(parent_url)?;
        inner.put(file_name, content, message)?;
        inner.push()?;
        inner.cleanup()
    }
}

impl<E: CommandExecutor> VcsClient for RemoteSvnClient<E> {
    fn init(&mut self, remote_url: &str) -> Result<()> {
        self.bind(remote_url);
        tracing::info!(url = remote_url, "Bound remote svn client");
        Ok(())
    }

    fn branch(&mut self, name: &str, switch: bool) -> Result<()> {
        validate_ref_name(name)?;
        let from = self.url()?.to_string();
        let to = self.pseudo_root()?.branch_url(name);
        let message = branch_message(&from, &to);

        self.exec
            .exec(None, "cp", &[from.as_str(), to.as_str(), "--message", message.as_str()])?;
        tracing::info!(%from, %to, "Created branch");

        if switch {
            self.bind(&to);
        }
        Ok(())
    }

    fn checkout(&mut self, reference: Option<&str>) -> Result<()> {
        let target = self.pseudo_root()?.ref_url(reference)?;
        self.bind(&target);
        Ok(())
    }

    fn tag(&mut self, name: &str) -> Result<()> {
        validate_ref_name(name)?;
        let from = self.url()?.to_string();
        let to = self.pseudo_root()?.tag_url(name);
        let message = tag_message(&from, &to);

        self.exec
            .exec(None, "cp", &[from.as_str(), to.as_str(), "--message", message.as_str()])?;
        tracing::info!(%from, %to, "Created tag");
        Ok(())
    }

    fn has(&self, path: &str, kind: NodeKind) -> Result<bool> {
        self.has_path(&RepoPath::parse(path)?, kind)
    }

    fn get(&self, path: &str) -> Result<Option<String>> {
        let url = self.abs_url(&RepoPath::parse(path)?)?;
        self.svn_lookup("cat", &[url.as_str()])
    }

    fn ls(&self, path: &str) -> Result<Listing> {
        let url = self.abs_url(&RepoPath::parse(path)?)?;
        match self.svn_lookup("ls", &["--xml", url.as_str()])? {
            Some(xml) => svn_xml::parse_ls(&xml),
            None => Ok(Listing::new()),
        }
    }

    fn rm(&mut self, path: &str, message: &str) -> Result<()> {
        let path = RepoPath::parse(path)?;
        if path.is_root() {
            return Err(vstore_fs::Error::unsafe_path("", "cannot remove the repository root").into());
        }
        ensure_writable(self.reference.as_ref())?;
        let url = self.abs_url(&path)?;
        self.exec
            .exec(None, "rm", &[url.as_str(), "--message", message])?;
        Ok(())
    }

    fn put(&mut self, path: &str, content: &str, message: &str) -> Result<()> {
        let path = RepoPath::parse(path)?;
        let Some(file_name) = path.file_name() else {
            return Err(vstore_fs::Error::unsafe_path("", "cannot write to the repository root").into());
        };
        ensure_writable(self.reference.as_ref())?;
        let parent = path.parent();

        if !parent.is_root() && !self.has_path(&parent, NodeKind::Dir)? {
            let parent_url = self.abs_url(&parent)?;
            self.exec
                .exec(None, "mkdir", &[parent_url.as_str(), "--parents", "--message", message])?;
        }

        let parent_url = join_url(self.url()?, &parent);
        self.commit_through_working_copy(&parent_url, file_name, content, message)
    }

    fn push(&mut self) -> Result<()> {
        Ok(())
    }

    fn pull(&mut self) -> Result<()> {
        Ok(())
    }

    fn log(&self, path: &str, limit: usize) -> Result<Vec<LogEntry>> {
        let url = self.abs_url(&RepoPath::parse(path)?)?;
        let limit_arg = limit.to_string();
        let mut args = vec!["--xml", url.as_str()];
        if limit > 0 {
            args.extend(["--limit", limit_arg.as_str()]);
        }

        match self.svn_lookup("log", &args)? {
            Some(xml) => limited_log(&xml, limit),
            None => Ok(Vec::new()),
        }
    }

    fn get_commit(&self, revision: &str, path: Option<&str>) -> Result<Option<LogEntry>> {
        let path = RepoPath::parse(path.unwrap_or_default())?;
        let url = join_url(self.url()?, &path);
        commit_at(&self.exec, None, revision, &url)
    }

    fn reference(&self) -> Option<&RepositoryRef> {
        self.reference.as_ref()
    }
}
