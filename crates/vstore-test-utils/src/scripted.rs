//! Executor replaying canned replies.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

use vstore_exec::{CommandExecutor, Error, Result};

/// One recorded invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call {
    pub cwd: Option<PathBuf>,
    pub command: String,
    pub args: Vec<String>,
}

impl Call {
    /// The subcommand followed by its arguments.
    pub fn argv(&self) -> Vec<String> {
        std::iter::once(self.command.clone())
            .chain(self.args.iter().cloned())
            .collect()
    }
}

/// A canned reply for the next invocation.
#[derive(Debug, Clone)]
pub enum Reply {
    Output(String),
    Fail { exit_status: i32, stderr: String },
}

#[derive(Debug, Default)]
struct Script {
    replies: VecDeque<Reply>,
    calls: Vec<Call>,
}

/// Executor that answers from a queue and records every call.
///
/// Clones share the same queue and call log, so a client that clones its
/// executor internally is still fully observable. Once the queue is empty
/// every call succeeds with empty output.
#[derive(Debug, Clone, Default)]
pub struct ScriptedExecutor {
    script: Arc<Mutex<Script>>,
}

impl ScriptedExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    fn script(&self) -> MutexGuard<'_, Script> {
        self.script.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Queue a successful reply.
    pub fn reply(&self, output: impl Into<String>) -> &Self {
        self.script().replies.push_back(Reply::Output(output.into()));
        self
    }

    /// Queue a failing reply.
    pub fn fail(&self, exit_status: i32, stderr: impl Into<String>) -> &Self {
        self.script().replies.push_back(Reply::Fail {
            exit_status,
            stderr: stderr.into(),
        });
        self
    }

    /// Queue an svn "path not found" failure.
    pub fn not_found(&self) -> &Self {
        self.fail(
            1,
            "svn: warning: W155010: The node was not found.\n\
             svn: E200009: Could not display info for all targets because some targets don't exist",
        )
    }

    pub fn calls(&self) -> Vec<Call> {
        self.script().calls.clone()
    }

    /// Subcommand and arguments of every call, in order.
    pub fn argv(&self) -> Vec<Vec<String>> {
        self.script().calls.iter().map(Call::argv).collect()
    }

    pub fn clear_calls(&self) {
        self.script().calls.clear();
    }

    /// Replies not yet consumed.
    pub fn remaining(&self) -> usize {
        self.script().replies.len()
    }
}

impl CommandExecutor for ScriptedExecutor {
    fn exec(&self, cwd: Option<&Path>, command: &str, args: &[&str]) -> Result<String> {
        let mut script = self.script();
        let call = Call {
            cwd: cwd.map(Path::to_path_buf),
            command: command.to_string(),
            args: args.iter().map(|a| a.to_string()).collect(),
        };
        let rendered = call.argv().join(" ");
        script.calls.push(call);

        match script.replies.pop_front() {
            None => Ok(String::new()),
            Some(Reply::Output(output)) => Ok(output),
            Some(Reply::Fail {
                exit_status,
                stderr,
            }) => Err(Error::CommandFailed {
                command: rendered,
                exit_status,
                stderr,
            }),
        }
    }
}

/// Shorthand for building expected argv vectors in assertions.
#[macro_export]
macro_rules! argv {
    ($($arg:expr),* $(,)?) => {
        vec![$($arg.to_string()),*]
    };
}
