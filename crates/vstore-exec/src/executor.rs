//! Process spawning for backend binaries

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use crate::{Error, Result};

/// Runs one backend subcommand and returns its stdout.
///
/// Clients own their executor. Cloning yields an independent executor with
/// the same binary and global arguments.
pub trait CommandExecutor: Clone {
    /// Run `command` with `args`, inside `cwd` when given.
    ///
    /// Fails with [`Error::CommandFailed`] on a nonzero exit.
    fn exec(&self, cwd: Option<&Path>, command: &str, args: &[&str]) -> Result<String>;
}

/// Executor for a command-line binary.
///
/// The spawned argument vector is
/// `binary <leading args> <command> <args> <trailing args>`.
/// Trailing arguments typically carry credentials and are never logged.
#[derive(Debug, Clone)]
pub struct CliExecutor {
    binary: PathBuf,
    leading_args: Vec<String>,
    trailing_args: Vec<String>,
    env: Vec<(String, String)>,
}

impl CliExecutor {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
            leading_args: Vec::new(),
            trailing_args: Vec::new(),
            env: Vec::new(),
        }
    }

    /// Add an argument placed before the subcommand.
    pub fn leading_arg(mut self, arg: impl Into<String>) -> Self {
        self.leading_args.push(arg.into());
        self
    }

    /// Add an argument placed after the subcommand's own arguments.
    pub fn trailing_arg(mut self, arg: impl Into<String>) -> Self {
        self.trailing_args.push(arg.into());
        self
    }

    /// Set an environment variable for every spawned process.
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    pub fn binary(&self) -> &Path {
        &self.binary
    }

    /// Human-readable form of an invocation, without the trailing arguments.
    pub fn render(&self, command: &str, args: &[&str]) -> String {
        let mut parts = vec![self.binary.display().to_string()];
        parts.extend(self.leading_args.iter().cloned());
        parts.push(command.to_string());
        parts.extend(args.iter().map(|a| a.to_string()));
        parts.join(" ")
    }
}

impl CommandExecutor for CliExecutor {
    fn exec(&self, cwd: Option<&Path>, command: &str, args: &[&str]) -> Result<String> {
        let rendered = self.render(command, args);

        let mut cmd = Command::new(&self.binary);
        cmd.args(&self.leading_args)
            .arg(command)
            .args(args)
            .args(&self.trailing_args)
            .stdin(Stdio::null());
        for (key, value) in &self.env {
            cmd.env(key, value);
        }
        if let Some(cwd) = cwd {
            if !cwd.is_dir() {
                return Err(Error::MissingWorkingDirectory {
                    path: cwd.to_path_buf(),
                });
            }
            cmd.current_dir(cwd);
        }

        tracing::debug!(command = %rendered, cwd = ?cwd, "Executing");

        let output = cmd.output().map_err(|e| match e.kind() {
            ErrorKind::NotFound => Error::BinaryNotFound {
                binary: self.binary.clone(),
            },
            _ => Error::Spawn {
                binary: self.binary.clone(),
                source: e,
            },
        })?;

        if output.status.success() {
            return Ok(String::from_utf8_lossy(&output.stdout).into_owned());
        }

        let exit_status = output.status.code().unwrap_or(-1);
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        tracing::warn!(command = %rendered, exit_status, %stderr, "Command failed");

        Err(Error::CommandFailed {
            command: rendered,
            exit_status,
            stderr,
        })
    }
}
