//! Commands that change the repository
//!
//! Each command returns a [`Change`] that is reported only after the change
//! has been published.

use std::io::Write;

use colored::Colorize;
use serde::Serialize;
use vstore_client::VcsClient;

use super::read::print_json;
use crate::error::Result;

/// A completed change, as reported to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Change {
    pub action: &'static str,
    pub target: String,
}

impl Change {
    fn new(action: &'static str, target: &str) -> Self {
        Self {
            action,
            target: target.to_string(),
        }
    }
}

pub fn run_put<C: VcsClient>(client: &mut C, path: &str, content: &str, message: &str) -> Result<Change> {
    client.put(path, content, message)?;
    Ok(Change::new("wrote", path))
}

pub fn run_rm<C: VcsClient>(client: &mut C, path: &str, message: &str) -> Result<Change> {
    client.rm(path, message)?;
    Ok(Change::new("removed", path))
}

pub fn run_branch<C: VcsClient>(client: &mut C, name: &str, switch: bool) -> Result<Change> {
    client.branch(name, switch)?;
    let action = if switch { "branched and switched" } else { "branched" };
    Ok(Change::new(action, name))
}

pub fn run_tag<C: VcsClient>(client: &mut C, name: &str) -> Result<Change> {
    client.tag(name)?;
    Ok(Change::new("tagged", name))
}

pub fn report(change: &Change, json: bool, out: &mut impl Write) -> Result<()> {
    if json {
        return print_json(out, change);
    }

    let mut action = change.action.to_string();
    if let Some(first) = action.get_mut(..1) {
        first.make_ascii_uppercase();
    }
    writeln!(out, "{} {}", action.green(), change.target.cyan())?;
    Ok(())
}
