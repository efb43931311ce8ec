//! Git client backed by a local clone
//!
//! `put` and `rm` commit immediately; `push` and `pull` exchange the
//! current branch with the remote. Reads go straight to the clone's
//! working tree.

use std::path::{Path, PathBuf};

use vstore_exec::CommandExecutor;
use vstore_fs::{RepoPath, WorkingCopy};

use crate::contract::{VcsClient, validate_ref_name};
use crate::parse::git_log::{self, LOG_FORMAT, STAMP_FORMAT};
use crate::parse::porcelain;
use crate::types::{DirectoryEntry, Listing, LogEntry, NodeKind, RepositoryRef};
use crate::{Error, Result};

const WORKING_COPY_PREFIX: &str = "vstore_git_";

/// What a checkout reference selects.
#[derive(Debug, Clone, PartialEq, Eq)]
enum GitRef {
    Branch(String),
    Tag(String),
}

impl GitRef {
    fn parse(reference: &str) -> Result<Self> {
        match reference.strip_prefix("tags/") {
            Some(name) => {
                validate_ref_name(name)?;
                Ok(Self::Tag(name.to_string()))
            }
            None => {
                let name = reference.strip_prefix("branches/").unwrap_or(reference);
                validate_ref_name(name)?;
                Ok(Self::Branch(name.to_string()))
            }
        }
    }

    /// Form recorded as the current ref.
    fn recorded(&self) -> String {
        match self {
            Self::Branch(name) => name.clone(),
            Self::Tag(name) => format!("tags/{name}"),
        }
    }
}

/// Git client with a private clone.
#[derive(Debug)]
pub struct GitClient<E: CommandExecutor> {
    exec: E,
    remote: String,
    default_branch: String,
    checkout_root: Option<PathBuf>,
    working_copy: Option<WorkingCopy>,
    reference: Option<RepositoryRef>,
}

impl<E: CommandExecutor> GitClient<E> {
    pub fn new(exec: E) -> Self {
        Self {
            exec,
            remote: "origin".to_string(),
            default_branch: "master".to_string(),
            checkout_root: None,
            working_copy: None,
            reference: None,
        }
    }

    pub fn with_remote(mut self, remote: impl Into<String>) -> Self {
        self.remote = remote.into();
        self
    }

    /// Branch selected by `checkout(None)`.
    pub fn with_default_branch(mut self, branch: impl Into<String>) -> Self {
        self.default_branch = branch.into();
        self
    }

    pub fn with_checkout_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.checkout_root = Some(root.into());
        self
    }

    pub fn working_copy_path(&self) -> Option<&Path> {
        self.working_copy.as_ref().map(|wc| wc.root())
    }

    /// Remove the clone, reporting failures instead of logging them.
    pub fn cleanup(mut self) -> Result<()> {
        match self.working_copy.take() {
            Some(wc) => Ok(wc.cleanup()?),
            None => Ok(()),
        }
    }

    fn working_copy(&self) -> Result<&WorkingCopy> {
        self.working_copy.as_ref().ok_or(Error::NotBound)
    }

    fn git(&self, command: &str, args: &[&str]) -> Result<String> {
        let wc = self.working_copy()?;
        Ok(self.exec.exec(Some(wc.root()), command, args)?)
    }

    fn current_ref(&self) -> Option<&str> {
        self.reference.as_ref().and_then(|r| r.current_ref.as_deref())
    }

    fn set_current_ref(&mut self, current: Option<String>) {
        if let Some(reference) = self.reference.as_mut() {
            reference.current_ref = current;
        }
    }

    fn local_arg(&self, path: &RepoPath) -> Result<String> {
        Ok(self.working_copy()?.local(path).to_string_lossy().into_owned())
    }

    /// Entries committed at HEAD directly under `dir`.
    fn tracked_entries(&self, dir: &RepoPath) -> Result<Vec<DirectoryEntry>> {
        let pathspec = format!("{dir}/");
        let mut args = vec!["-z", "HEAD"];
        if !dir.is_root() {
            args.extend(["--", pathspec.as_str()]);
        }
        let output = self.git("ls-tree", &args)?;

        let mut entries = Vec::new();
        for record in output.split('\0').filter(|r| !r.is_empty()) {
            let Some((meta, full_path)) = record.split_once('\t') else {
                continue;
            };
            let kind = match meta.split(' ').nth(1) {
                Some("blob") => NodeKind::File,
                Some("tree") | Some("commit") => NodeKind::Dir,
                _ => continue,
            };
            let name = full_path.rsplit('/').next().unwrap_or(full_path);
            let stamp = self.last_commit(full_path)?;

            entries.push(DirectoryEntry {
                name: name.to_string(),
                kind,
                last_commit: stamp.as_ref().map(|s| s.id.clone()),
                author: stamp.as_ref().and_then(|s| s.author.clone()),
                date: stamp.and_then(|s| s.date),
            });
        }
        Ok(entries)
    }

    /// Uncommitted entries directly under `dir`.
    fn pending_entries(&self, dir: &RepoPath) -> Result<Vec<DirectoryEntry>> {
        let target = if dir.is_root() { "." } else { dir.as_str() };
        let output = self.git("status", &["-uall", target, "--porcelain"])?;
        let prefix = if dir.is_root() {
            String::new()
        } else {
            format!("{dir}/")
        };

        Ok(porcelain::parse_status(&output)
            .into_iter()
            .filter(|entry| !entry.is_deleted())
            .filter_map(|entry| {
                let relative = entry.path.strip_prefix(prefix.as_str())?;
                let (name, kind) = match relative.split_once('/') {
                    Some((dir_name, _)) => (dir_name, NodeKind::Dir),
                    None => (relative.trim_end_matches('/'), NodeKind::File),
                };
                (!name.is_empty()).then(|| DirectoryEntry::uncommitted(name, kind))
            })
            .collect())
    }

    fn has_local_branch(&self, name: &str) -> Result<bool> {
        let head = format!("refs/heads/{name}");
        match self.git("rev-parse", &["--verify", "--quiet", head.as_str()]) {
            Ok(_) => Ok(true),
            Err(Error::Command(err)) if err.exit_status() == Some(1) => Ok(false),
            Err(err) => Err(err),
        }
    }

    fn last_commit(&self, full_path: &str) -> Result<Option<LogEntry>> {
        let output = self.git("log", &["-1", STAMP_FORMAT, "--", full_path])?;
        Ok(git_log::parse_log(&output).into_iter().next())
    }

    fn clone_into_new_working_copy(&mut self, remote_url: &str) -> Result<()> {
        let wc = WorkingCopy::temporary(WORKING_COPY_PREFIX, self.checkout_root.as_deref())?;
        let root = wc.root().to_string_lossy().into_owned();
        self.exec.exec(None, "clone", &[remote_url, root.as_str()])?;

        // Replacing drops any previous clone.
        self.working_copy = Some(wc);
        self.reference = Some(RepositoryRef::new(remote_url));
        Ok(())
    }
}

impl<E: CommandExecutor> VcsClient for GitClient<E> {
    fn init(&mut self, remote_url: &str) -> Result<()> {
        let bound = self
            .reference
            .as_ref()
            .is_some_and(|r| r.remote_url == remote_url);

        if bound && self.working_copy.is_some() {
            return self.pull();
        }

        self.clone_into_new_working_copy(remote_url)?;
        tracing::info!(url = remote_url, "Cloned git repository");
        Ok(())
    }

    fn branch(&mut self, name: &str, switch: bool) -> Result<()> {
        validate_ref_name(name)?;
        self.git("branch", &[name])?;
        tracing::info!(branch = name, "Created branch");

        if switch {
            self.git("checkout", &[name])?;
            self.set_current_ref(Some(name.to_string()));
        }
        Ok(())
    }

    fn checkout(&mut self, reference: Option<&str>) -> Result<()> {
        let target = match reference {
            Some(reference) => GitRef::parse(reference)?,
            None => GitRef::Branch(self.default_branch.clone()),
        };
        let remote = self.remote.clone();

        match &target {
            GitRef::Branch(branch) => match self.git("fetch", &[remote.as_str(), branch.as_str()]) {
                Ok(_) => {
                    // Switch before merging so the previous branch is left untouched.
                    self.git("checkout", &[branch.as_str()])?;
                    self.git("pull", &[remote.as_str(), branch.as_str()])?;
                }
                Err(err) => {
                    if !self.has_local_branch(branch)? {
                        return Err(err);
                    }
                    tracing::debug!(branch = %branch, "Branch not on remote, using local branch");
                    self.git("checkout", &[branch.as_str()])?;
                }
            },
            GitRef::Tag(tag) => {
                let tag_ref = format!("refs/tags/{tag}");
                self.git("fetch", &[remote.as_str(), "tag", tag.as_str()])?;
                self.git("checkout", &["--detach", tag_ref.as_str()])?;
            }
        }

        let recorded = reference.map(|_| target.recorded());
        tracing::debug!(reference = ?recorded, "Checked out");
        self.set_current_ref(recorded);
        Ok(())
    }

    fn tag(&mut self, name: &str) -> Result<()> {
        validate_ref_name(name)?;
        let tag_ref = format!("refs/tags/{name}");
        self.git("tag", &[name])?;
        self.git("push", &[self.remote.as_str(), tag_ref.as_str()])?;
        tracing::info!(tag = name, "Created tag");
        Ok(())
    }

    fn has(&self, path: &str, kind: NodeKind) -> Result<bool> {
        let path = RepoPath::parse(path)?;
        let wc = self.working_copy()?;
        Ok(match kind {
            NodeKind::File => wc.is_file(&path)?,
            NodeKind::Dir => wc.is_dir(&path)?,
        })
    }

    fn get(&self, path: &str) -> Result<Option<String>> {
        let path = RepoPath::parse(path)?;
        Ok(self.working_copy()?.read(&path)?)
    }

    fn ls(&self, path: &str) -> Result<Listing> {
        let dir = RepoPath::parse(path)?;
        let wc = self.working_copy()?;
        if !wc.is_dir(&dir)? {
            return Ok(Listing::new());
        }

        let mut listing = Listing::new();
        for entry in self.tracked_entries(&dir)? {
            listing.insert(entry);
        }
        for entry in self.pending_entries(&dir)? {
            if !listing.contains(&entry.name) {
                listing.insert(entry);
            }
        }

        // Drop entries removed from the working tree but not yet committed.
        let mut present = Listing::new();
        for entry in listing {
            let Ok(child) = dir.join(&entry.name) else {
                continue;
            };
            let exists = match entry.kind {
                NodeKind::File => wc.is_file(&child)?,
                NodeKind::Dir => wc.is_dir(&child)?,
            };
            if exists {
                present.insert(entry);
            }
        }
        Ok(present)
    }

    fn rm(&mut self, path: &str, message: &str) -> Result<()> {
        let path = RepoPath::parse(path)?;
        let removed = self.working_copy()?.remove(&path)?;
        if !removed {
            tracing::debug!(path = %path, "Nothing to remove in working tree");
        }
        self.git("commit", &[path.as_str(), "--message", message])?;
        Ok(())
    }

    fn put(&mut self, path: &str, content: &str, message: &str) -> Result<()> {
        let path = RepoPath::parse(path)?;
        self.working_copy()?.create(&path, content.as_bytes())?;

        let local = self.local_arg(&path)?;
        self.git("add", &[local.as_str()])?;

        let staged = self.git("status", &["--porcelain", "--", local.as_str()])?;
        if staged.trim().is_empty() {
            tracing::debug!(path = %path, "Content unchanged, nothing to commit");
            return Ok(());
        }
        self.git("commit", &["--message", message, local.as_str()])?;
        Ok(())
    }

    fn push(&mut self) -> Result<()> {
        let remote = self.remote.clone();
        match self.current_ref().map(str::to_string) {
            Some(current) if current.starts_with("tags/") => Err(Error::ReadOnlyRef { name: current }),
            Some(branch) => {
                self.git("push", &[remote.as_str(), branch.as_str()])?;
                Ok(())
            }
            None => {
                self.git("push", &[])?;
                Ok(())
            }
        }
    }

    fn pull(&mut self) -> Result<()> {
        let remote = self.remote.clone();
        match self.current_ref().map(str::to_string) {
            Some(current) => match current.strip_prefix("tags/") {
                Some(tag) => self.git("fetch", &[remote.as_str(), "tag", tag])?,
                None => self.git("pull", &[remote.as_str(), current.as_str()])?,
            },
            None => self.git("pull", &[])?,
        };
        Ok(())
    }

    fn log(&self, path: &str, limit: usize) -> Result<Vec<LogEntry>> {
        let path = RepoPath::parse(path)?;
        let limit_arg = limit.to_string();
        let mut args = vec![LOG_FORMAT];
        if limit > 0 {
            args.extend(["-n", limit_arg.as_str()]);
        }
        if !path.is_root() {
            args.extend(["--", path.as_str()]);
        }

        let mut entries = git_log::parse_log(&self.git("log", &args)?);
        if limit > 0 {
            entries.truncate(limit);
        }
        Ok(entries)
    }

    fn get_commit(&self, revision: &str, path: Option<&str>) -> Result<Option<LogEntry>> {
        if revision.is_empty() || revision.starts_with('-') {
            return Ok(None);
        }
        let path = RepoPath::parse(path.unwrap_or_default())?;

        let spec = format!("{revision}^{{commit}}");
        let id = match self.git("rev-parse", &["--verify", "--quiet", spec.as_str()]) {
            Ok(id) => id.trim().to_string(),
            Err(Error::Command(err)) if err.exit_status() == Some(1) => return Ok(None),
            Err(err) => return Err(err),
        };

        let mut args = vec!["-1", LOG_FORMAT, id.as_str()];
        if !path.is_root() {
            args.extend(["--", path.as_str()]);
        }
        let entry = git_log::parse_log(&self.git("log", &args)?).into_iter().next();
        Ok(entry.filter(|e| e.id == id))
    }

    fn reference(&self) -> Option<&RepositoryRef> {
        self.reference.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("qux", GitRef::Branch("qux".into()), "qux")]
    #[case("branches/qux", GitRef::Branch("qux".into()), "qux")]
    #[case("tags/v1", GitRef::Tag("v1".into()), "tags/v1")]
    fn test_git_ref_parse(#[case] raw: &str, #[case] expected: GitRef, #[case] recorded: &str) {
        let parsed = GitRef::parse(raw).unwrap();
        assert_eq!(parsed, expected);
        assert_eq!(parsed.recorded(), recorded);
    }

    #[test]
    fn test_git_ref_rejects_nested() {
        assert!(GitRef::parse("feature/x").is_err());
        assert!(GitRef::parse("tags/").is_err());
    }
}
