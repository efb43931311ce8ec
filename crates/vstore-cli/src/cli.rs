//! CLI argument parsing using clap derive

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use vstore_client::{BackendKind, DEFAULT_LOG_LIMIT};

/// vstore - read and write files in Git or Subversion repositories
#[derive(Parser, Debug)]
#[command(name = "vstore")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Commands,
}

/// Options shared by every command.
#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct GlobalArgs {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Configuration file (TOML, JSON or YAML)
    #[arg(short, long, global = true, env = "VSTORE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Backend: git, svn or svn-remote
    #[arg(short, long, global = true)]
    pub backend: Option<BackendKind>,

    /// Repository URL, overriding the configuration file
    #[arg(short, long, global = true, env = "VSTORE_URL")]
    pub url: Option<String>,

    /// Branch or tag to operate on (`name`, `branches/name`, `tags/name`)
    #[arg(short = 'r', long = "ref", global = true)]
    pub reference: Option<String>,

    /// Output as JSON for scripting
    #[arg(long, global = true)]
    pub json: bool,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Show the bound URL and current ref
    Info,

    /// Print a file's content
    Get {
        path: String,
    },

    /// Check whether a file (or directory with --dir) exists
    Has {
        path: String,

        /// Check for a directory instead of a file
        #[arg(long)]
        dir: bool,
    },

    /// List a directory
    Ls {
        #[arg(default_value = "")]
        path: String,
    },

    /// Show history, newest first
    Log {
        #[arg(default_value = "")]
        path: String,

        /// Maximum number of entries (0 for all)
        #[arg(short = 'n', long, default_value_t = DEFAULT_LOG_LIMIT)]
        limit: usize,
    },

    /// Show a single revision or commit
    Show {
        revision: String,

        /// Only match if the revision touched this path
        path: Option<String>,
    },

    /// Write a file and publish it
    ///
    /// Examples:
    ///   vstore put docs/a.md --content "hello" -m "Add a"
    ///   vstore put docs/a.md --file ./a.md -m "Add a"
    Put {
        path: String,

        /// Literal content to write
        #[arg(long, conflicts_with = "file")]
        content: Option<String>,

        /// Read the content from a local file
        #[arg(long)]
        file: Option<PathBuf>,

        /// Commit message
        #[arg(short, long)]
        message: String,
    },

    /// Remove a file or directory and publish the removal
    Rm {
        path: String,

        /// Commit message
        #[arg(short, long)]
        message: String,
    },

    /// Create a branch from the current ref
    Branch {
        name: String,

        /// Stay on the current ref
        #[arg(long)]
        no_switch: bool,
    },

    /// Tag the current ref
    Tag {
        name: String,
    },
}

impl Commands {
    /// Commands that change the remote and need a final push.
    pub fn publishes(&self) -> bool {
        matches!(self, Self::Put { .. } | Self::Rm { .. } | Self::Branch { .. })
    }
}
