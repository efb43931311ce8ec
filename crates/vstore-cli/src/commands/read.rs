//! Read-only commands

use std::io::Write;

use colored::Colorize;
use vstore_client::{LogEntry, NodeKind, VcsClient};

use crate::error::{CliError, Result};

pub(super) fn print_json<T: serde::Serialize + ?Sized>(out: &mut impl Write, value: &T) -> Result<()> {
    serde_json::to_writer_pretty(&mut *out, value)?;
    writeln!(out)?;
    Ok(())
}

fn print_entry(out: &mut impl Write, entry: &LogEntry) -> Result<()> {
    let date = entry
        .date
        .map(|d| d.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_default();
    writeln!(
        out,
        "{} {} {}",
        entry.id.yellow(),
        entry.author.as_deref().unwrap_or("(no author)").cyan(),
        date.dimmed()
    )?;
    for line in entry.message.lines() {
        writeln!(out, "    {line}")?;
    }
    Ok(())
}

pub fn run_info<C: VcsClient>(client: &C, json: bool, out: &mut impl Write) -> Result<()> {
    let reference = client
        .reference()
        .ok_or_else(|| CliError::user("client is not bound"))?;
    if json {
        return print_json(out, reference);
    }

    writeln!(out, "{}: {}", "URL".dimmed(), reference.remote_url)?;
    let current = reference.current_ref.as_deref().unwrap_or("(default)");
    writeln!(out, "{}: {}", "Ref".dimmed(), current.cyan())?;
    Ok(())
}

/// Print the raw file content, unchanged.
pub fn run_get<C: VcsClient>(client: &C, path: &str, out: &mut impl Write) -> Result<()> {
    match client.get(path)? {
        Some(content) => {
            out.write_all(content.as_bytes())?;
            Ok(())
        }
        None => Err(CliError::user(format!("{path}: not found"))),
    }
}

pub fn run_has<C: VcsClient>(
    client: &C,
    path: &str,
    dir: bool,
    json: bool,
    out: &mut impl Write,
) -> Result<()> {
    let kind = if dir { NodeKind::Dir } else { NodeKind::File };
    let exists = client.has(path, kind)?;
    if json {
        print_json(out, &exists)
    } else {
        writeln!(out, "{exists}")?;
        Ok(())
    }
}

pub fn run_ls<C: VcsClient>(client: &C, path: &str, json: bool, out: &mut impl Write) -> Result<()> {
    let listing = client.ls(path)?;
    if json {
        return print_json(out, &listing);
    }

    for entry in &listing {
        let name = match entry.kind {
            NodeKind::Dir => format!("{}/", entry.name).blue().bold(),
            NodeKind::File => entry.name.normal(),
        };
        let commit = entry.last_commit.as_deref().unwrap_or("-");
        let author = entry.author.as_deref().unwrap_or("-");
        writeln!(out, "{:<10} {:<16} {}", commit.yellow(), author.cyan(), name)?;
    }
    Ok(())
}

pub fn run_log<C: VcsClient>(
    client: &C,
    path: &str,
    limit: usize,
    json: bool,
    out: &mut impl Write,
) -> Result<()> {
    let entries = client.log(path, limit)?;
    if json {
        return print_json(out, &entries);
    }

    if entries.is_empty() {
        writeln!(out, "{}", "No history".dimmed())?;
    }
    for entry in &entries {
        print_entry(out, entry)?;
    }
    Ok(())
}

pub fn run_show<C: VcsClient>(
    client: &C,
    revision: &str,
    path: Option<&str>,
    json: bool,
    out: &mut impl Write,
) -> Result<()> {
    let entry = client
        .get_commit(revision, path)?
        .ok_or_else(|| CliError::user(format!("{revision}: no such revision")))?;
    if json {
        print_json(out, &entry)
    } else {
        print_entry(out, &entry)
    }
}
