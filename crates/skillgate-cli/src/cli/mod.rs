//! CLI command definitions for the `skillgate` binary.
//!
//! Uses clap derive macros for argument parsing. `check` gates a tree,
//! `report` prints budget tables, `commit-msg` validates a commit subject.

pub mod check;
pub mod commit_msg;
pub mod output;
pub mod report;
pub mod scan;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;

/// Static analyzer and policy gate for skill document trees.
#[derive(Parser)]
#[command(name = "skillgate", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output machine-readable JSON instead of styled text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Only print blocking findings and the decision.
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Log verbosity on stderr (-v for info, -vv for debug, -vvv for trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run every check and decide accept or reject.
    Check {
        #[command(flatten)]
        scan: ScanArgs,

        /// Stop after the first stage that produces a blocking finding.
        #[arg(long)]
        fail_fast: bool,
    },

    /// Print budget and context-load tables.
    Report {
        #[command(subcommand)]
        kind: ReportCommand,
    },

    /// Validate a commit message file.
    #[command(name = "commit-msg")]
    CommitMsg {
        /// Path to the message file (e.g. .git/COMMIT_EDITMSG).
        file: PathBuf,
    },

    /// Generate shell completions.
    Completions {
        /// Shell to generate completions for.
        shell: Shell,
    },
}

#[derive(Subcommand)]
pub enum ReportCommand {
    /// Words, tokens and headroom for every skill and reference document.
    Budget {
        #[command(flatten)]
        scan: ScanArgs,
    },

    /// Worst-case simultaneous load per suite.
    #[command(name = "context-load")]
    ContextLoad {
        #[command(flatten)]
        scan: ScanArgs,
    },
}

/// Options shared by every command that scans a tree.
#[derive(Args, Debug, Clone)]
pub struct ScanArgs {
    /// Files or directories to report on (default: the whole root).
    pub paths: Vec<PathBuf>,

    /// Scan root; document paths are reported relative to it.
    #[arg(long, default_value = ".")]
    pub root: PathBuf,

    /// Budget table (default: <root>/.skillgate/budgets.toml).
    #[arg(long, env = "SKILLGATE_BUDGETS")]
    pub budgets: Option<PathBuf>,

    /// Suppression table (default: <root>/.skillgate/suppressions.toml).
    #[arg(long, env = "SKILLGATE_SUPPRESSIONS")]
    pub suppressions: Option<PathBuf>,

    /// Descriptions shorter than this many words get a warning.
    #[arg(long, default_value_t = 10)]
    pub min_description_words: usize,

    /// Directory name to skip; repeatable. Replaces the default list.
    #[arg(long = "exclude", value_name = "DIR")]
    pub exclude: Vec<String>,
}
