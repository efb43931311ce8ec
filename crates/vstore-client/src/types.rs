//! Canonical records shared by all clients

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};

use crate::{Error, Result};

/// Kind of a repository node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    File,
    Dir,
}

impl NodeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::File => "file",
            Self::Dir => "dir",
        }
    }
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NodeKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "file" => Ok(Self::File),
            "dir" | "directory" => Ok(Self::Dir),
            other => Err(Error::parse("node kind", format!("unknown kind '{other}'"))),
        }
    }
}

/// The remote a client is bound to and the ref it currently points at.
///
/// `current_ref` is `None` for trunk / the default branch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RepositoryRef {
    pub remote_url: String,
    pub current_ref: Option<String>,
}

impl RepositoryRef {
    pub fn new(remote_url: impl Into<String>) -> Self {
        Self {
            remote_url: remote_url.into(),
            current_ref: None,
        }
    }
}

/// One entry of a directory listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DirectoryEntry {
    pub name: String,
    pub kind: NodeKind,
    pub last_commit: Option<String>,
    pub author: Option<String>,
    pub date: Option<DateTime<Utc>>,
}

impl DirectoryEntry {
    /// An entry with no commit information, e.g. an uncommitted file.
    pub fn uncommitted(name: impl Into<String>, kind: NodeKind) -> Self {
        Self {
            name: name.into(),
            kind,
            last_commit: None,
            author: None,
            date: None,
        }
    }
}

/// Directory listing keyed by entry name, in backend listing order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Listing {
    entries: Vec<DirectoryEntry>,
}

impl Listing {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an entry. An entry with the same name is replaced in place.
    pub fn insert(&mut self, entry: DirectoryEntry) {
        match self.entries.iter_mut().find(|e| e.name == entry.name) {
            Some(existing) => *existing = entry,
            None => self.entries.push(entry),
        }
    }

    pub fn get(&self, name: &str) -> Option<&DirectoryEntry> {
        self.entries.iter().find(|e| e.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.name.as_str())
    }

    pub fn iter(&self) -> std::slice::Iter<'_, DirectoryEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<DirectoryEntry> for Listing {
    fn from_iter<I: IntoIterator<Item = DirectoryEntry>>(iter: I) -> Self {
        let mut listing = Self::new();
        for entry in iter {
            listing.insert(entry);
        }
        listing
    }
}

impl IntoIterator for Listing {
    type Item = DirectoryEntry;
    type IntoIter = std::vec::IntoIter<DirectoryEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<'a> IntoIterator for &'a Listing {
    type Item = &'a DirectoryEntry;
    type IntoIter = std::slice::Iter<'a, DirectoryEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

// Serialized as a name -> entry object, keeping listing order.
impl Serialize for Listing {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for entry in &self.entries {
            map.serialize_entry(&entry.name, entry)?;
        }
        map.end()
    }
}

/// One revision (SVN) or commit (Git).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogEntry {
    pub id: String,
    pub author: Option<String>,
    pub date: Option<DateTime<Utc>>,
    pub message: String,
}

/// Commit messages waiting for the next `push`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PendingMessages {
    messages: Vec<String>,
}

impl PendingMessages {
    pub fn push(&mut self, message: impl Into<String>) {
        self.messages.push(message.into());
    }

    /// All queued messages joined by newline, in queue order.
    pub fn joined(&self) -> String {
        self.messages.join("\n")
    }

    pub fn clear(&mut self) {
        self.messages.clear();
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

/// Outcome of a read whose target may legitimately be absent.
///
/// Backend failures other than "not found" travel as `Err` alongside this.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup<T> {
    Found(T),
    NotFound,
}

impl<T> Lookup<T> {
    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found(_))
    }

    pub fn into_option(self) -> Option<T> {
        match self {
            Self::Found(value) => Some(value),
            Self::NotFound => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Lookup<U> {
        match self {
            Self::Found(value) => Lookup::Found(f(value)),
            Self::NotFound => Lookup::NotFound,
        }
    }
}

impl<T> From<Option<T>> for Lookup<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(value) => Self::Found(value),
            None => Self::NotFound,
        }
    }
}
