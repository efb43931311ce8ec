//! Subversion client backed by a local working copy
//!
//! Mutations are staged in the working copy and their messages queued;
//! `push` commits everything at once. Branches and tags are server-side
//! copies.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use vstore_exec::CommandExecutor;
use vstore_fs::{RepoPath, WorkingCopy};

use crate::contract::{VcsClient, validate_ref_name};
use crate::layout::PseudoRoot;
use crate::parse::svn_xml;
use crate::svn_codes::{lookup, lookup_revision};
use crate::types::{Listing, LogEntry, NodeKind, PendingMessages, RepositoryRef};
use crate::{Error, Result};

const WORKING_COPY_PREFIX: &str = "vstore_svn_";

static COMMITTED_REVISION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Committed revision (\d+)\.").unwrap());

/// Default message for server-side branch copies.
pub fn branch_message(from: &str, to: &str) -> String {
    format!("Branched {from} to {to}")
}

/// Default message for server-side tag copies.
pub fn tag_message(from: &str, to: &str) -> String {
    format!("Tagged {from} as {to}")
}

/// Escape a target containing `@` so svn does not read a peg revision.
pub(crate) fn peg_safe(target: &str) -> String {
    if target.contains('@') {
        format!("{target}@")
    } else {
        target.to_string()
    }
}

/// Revision number accepted by `svn log -c`, with an optional `r` prefix.
pub(crate) fn revision_number(revision: &str) -> Option<&str> {
    let digits = revision.strip_prefix('r').unwrap_or(revision);
    (!digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit())).then_some(digits)
}

/// The ref a URL points at, `None` for trunk or an unrecognized layout.
pub(crate) fn ref_of(url: &str) -> Option<String> {
    PseudoRoot::resolve(url)
        .ok()
        .and_then(|root| root.segment().ref_name())
}

/// Fail when the bound ref is a tag; tags never receive commits.
pub(crate) fn ensure_writable(reference: Option<&RepositoryRef>) -> Result<()> {
    match reference.and_then(|r| r.current_ref.as_deref()) {
        Some(current) if current.starts_with("tags/") => Err(Error::ReadOnlyRef {
            name: current.to_string(),
        }),
        _ => Ok(()),
    }
}

/// Join a repository path onto a URL.
pub(crate) fn join_url(base: &str, path: &RepoPath) -> String {
    let base = base.trim_end_matches('/');
    if path.is_root() {
        base.to_string()
    } else {
        format!("{base}/{path}")
    }
}

/// Look up the single revision `revision` in `svn log -c` output for `url`.
pub(crate) fn commit_at<E: CommandExecutor>(
    exec: &E,
    cwd: Option<&Path>,
    revision: &str,
    url: &str,
) -> Result<Option<LogEntry>> {
    let Some(number) = revision_number(revision) else {
        return Ok(None);
    };

    let change = format!("-c{number}");
    let url = peg_safe(url);
    let output = lookup_revision(exec.exec(cwd, "log", &[change.as_str(), "--xml", url.as_str()]))?;

    match output.into_option() {
        Some(xml) => Ok(svn_xml::parse_log(&xml)?
            .into_iter()
            .find(|entry| entry.id == number)),
        None => Ok(None),
    }
}

/// Parse `svn log` output, truncated to `limit` entries (0 = all).
pub(crate) fn limited_log(xml: &str, limit: usize) -> Result<Vec<LogEntry>> {
    let mut entries = svn_xml::parse_log(xml)?;
    if limit > 0 {
        entries.truncate(limit);
    }
    Ok(entries)
}

/// Subversion client with a persistent local working copy.
#[derive(Debug)]
pub struct SvnClient<E: CommandExecutor> {
    exec: E,
    checkout_root: Option<PathBuf>,
    working_copy: Option<WorkingCopy>,
    reference: Option<RepositoryRef>,
    messages: PendingMessages,
}

impl<E: CommandExecutor> SvnClient<E> {
    pub fn new(exec: E) -> Self {
        Self {
            exec,
            checkout_root: None,
            working_copy: None,
            reference: None,
            messages: PendingMessages::default(),
        }
    }

    /// Create working copies under `root` instead of the system temp dir.
    pub fn with_checkout_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.checkout_root = Some(root.into());
        self
    }

    /// Messages queued since the last successful `push`.
    pub fn pending_messages(&self) -> &PendingMessages {
        &self.messages
    }

    pub fn working_copy_path(&self) -> Option<&Path> {
        self.working_copy.as_ref().map(|wc| wc.root())
    }

    /// Pseudo-root of the currently bound URL.
    pub fn pseudo_root(&self) -> Result<PseudoRoot> {
        PseudoRoot::resolve(self.url()?)
    }

    /// Create `path` and any missing parents in the working copy.
    pub fn mkdir(&self, path: &str) -> Result<()> {
        let path = RepoPath::parse(path)?;
        self.mkdir_path(&path)
    }

    /// Remove the working copy, reporting failures instead of logging them.
    pub fn cleanup(mut self) -> Result<()> {
        match self.working_copy.take() {
            Some(wc) => Ok(wc.cleanup()?),
            None => Ok(()),
        }
    }

    fn url(&self) -> Result<&str> {
        self.reference
            .as_ref()
            .map(|r| r.remote_url.as_str())
            .ok_or(Error::NotBound)
    }

    fn working_copy(&self) -> Result<&WorkingCopy> {
        self.working_copy.as_ref().ok_or(Error::NotBound)
    }

    /// Run a subcommand inside the working copy.
    fn svn(&self, command: &str, args: &[&str]) -> Result<String> {
        let wc = self.working_copy()?;
        Ok(self.exec.exec(Some(wc.root()), command, args)?)
    }

    /// Run a subcommand inside the working copy, absorbing "not found".
    fn svn_lookup(&self, command: &str, args: &[&str]) -> Result<Option<String>> {
        let wc = self.working_copy()?;
        Ok(lookup(self.exec.exec(Some(wc.root()), command, args))?.into_option())
    }

    fn target(path: &RepoPath) -> String {
        if path.is_root() {
            ".".to_string()
        } else {
            peg_safe(path.as_str())
        }
    }

    fn has_path(&self, path: &RepoPath, kind: NodeKind) -> Result<bool> {
        let target = Self::target(path);
        let Some(xml) = self.svn_lookup("info", &["--xml", target.as_str()])? else {
            return Ok(false);
        };
        let info = svn_xml::parse_info(&xml)?;
        Ok(info.kind == kind && !info.scheduled_for_deletion())
    }

    fn mkdir_path(&self, path: &RepoPath) -> Result<()> {
        let target = Self::target(path);
        self.svn("mkdir", &["--parents", target.as_str()])?;
        Ok(())
    }

    fn bind(&mut self, url: &str) {
        self.reference = Some(RepositoryRef {
            remote_url: url.to_string(),
            current_ref: ref_of(url),
        });
    }

    fn switch_to(&mut self, url: &str) -> Result<()> {
        let target = peg_safe(url);
        self.svn("switch", &[target.as_str()])?;
        self.bind(url);
        Ok(())
    }
}

impl<E: CommandExecutor> VcsClient for SvnClient<E> {
    fn init(&mut self, remote_url: &str) -> Result<()> {
        let already_bound = self.url().is_ok_and(|url| url == remote_url);

        if self.working_copy.is_none() {
            let wc = WorkingCopy::temporary(WORKING_COPY_PREFIX, self.checkout_root.as_deref())?;
            let url = peg_safe(remote_url);
            let root = wc.root().to_string_lossy().into_owned();
            self.exec.exec(None, "checkout", &[url.as_str(), root.as_str()])?;
            self.working_copy = Some(wc);
            self.bind(remote_url);
        } else if !already_bound {
            self.switch_to(remote_url)?;
        }

        tracing::info!(url = remote_url, "Bound svn working copy");
        self.pull()
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
            self.switch_to(&to)?;
        }
        Ok(())
    }

    fn checkout(&mut self, reference: Option<&str>) -> Result<()> {
        let target = self.pseudo_root()?.ref_url(reference)?;
        self.switch_to(&target)
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
        let path = RepoPath::parse(path)?;
        let target = Self::target(&path);
        self.svn_lookup("cat", &[target.as_str()])
    }

    fn ls(&self, path: &str) -> Result<Listing> {
        let path = RepoPath::parse(path)?;
        let target = Self::target(&path);
        let mut args = vec!["--xml"];
        if !path.is_root() {
            args.push(target.as_str());
        }

        match self.svn_lookup("ls", &args)? {
            Some(xml) => svn_xml::parse_ls(&xml),
            None => Ok(Listing::new()),
        }
    }

    fn rm(&mut self, path: &str, message: &str) -> Result<()> {
        let path = RepoPath::parse(path)?;
        if path.is_root() {
            return Err(vstore_fs::Error::unsafe_path("", "cannot remove the repository root").into());
        }
        let target = Self::target(&path);
        self.svn("rm", &[target.as_str()])?;
        self.messages.push(message);
        Ok(())
    }

    fn put(&mut self, path: &str, content: &str, message: &str) -> Result<()> {
        let path = RepoPath::parse(path)?;
        let dir = path.parent();
        if !dir.is_root() && !self.has_path(&dir, NodeKind::Dir)? {
            self.mkdir_path(&dir)?;
        }

        let versioned = self.has_path(&path, NodeKind::File)?;
        self.working_copy()?.create(&path, content.as_bytes())?;
        if !versioned {
            let target = Self::target(&path);
            self.svn("add", &[target.as_str()])?;
        }

        self.messages.push(message);
        Ok(())
    }

    fn push(&mut self) -> Result<()> {
        ensure_writable(self.reference.as_ref())?;
        let message = self.messages.joined();
        let output = self.svn("commit", &["--message", message.as_str()])?;

        self.messages.clear();

        match COMMITTED_REVISION.captures(&output) {
            Some(caps) => {
                tracing::info!(revision = &caps[1], "Committed");
                // Bring the whole working copy to the committed revision.
                self.pull()
            }
            None => {
                tracing::debug!("Nothing to commit");
                Ok(())
            }
        }
    }

    fn pull(&mut self) -> Result<()> {
        self.svn("update", &["--set-depth", "infinity"])?;
        Ok(())
    }

    fn log(&self, path: &str, limit: usize) -> Result<Vec<LogEntry>> {
        let path = RepoPath::parse(path)?;
        let target = Self::target(&path);
        let limit_arg = limit.to_string();
        let mut args = vec!["--xml", target.as_str()];
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
        commit_at(&self.exec, self.working_copy_path(), revision, &url)
    }

    fn reference(&self) -> Option<&RepositoryRef> {
        self.reference.as_ref()
    }
}
