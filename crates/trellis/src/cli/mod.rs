//! CLI argument parsing and command dispatch.
//!
//! Trellis operates on a read-only project snapshot (JSONL files in the
//! snapshot directory) and derives everything else on demand:
//!
//! - `status`: computed status board for every node
//! - `explain`: blocking reason tree for one node
//! - `layout`: auto-arranged grid positions
//! - `complete`: run the unblock cascade for a node that just finished
//! - `check`: surface load warnings and graph defects
//!
//! All commands accept `--json` for programmatic output and `-C/--dir` to
//! point at a project directory.

mod args;
mod execute;

use anyhow::Result;
use clap::{Parser, Subcommand};

pub use args::{CheckArgs, CompleteArgs, ExplainArgs, GlobalArgs, LayoutArgs, StatusArgs};

/// Trellis - dependency-aware task graph tracking
///
/// Computes effective node statuses from a project snapshot, explains
/// blocking chains, lays the graph out on a grid, and emits idempotent
/// unblock notifications.
#[derive(Parser, Debug)]
#[command(name = "trellis")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Global options
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Show the computed status of every node
    ///
    /// Statuses are derived from the snapshot on every run; nothing is
    /// written back. Blocked nodes held up only by open requests show as
    /// waiting.
    Status(StatusArgs),

    /// Explain why a node is blocked
    ///
    /// Prints the node's blocking reasons as a tree, following dependency
    /// and approval edges transitively. Cycles are marked, not followed.
    Explain(ExplainArgs),

    /// Compute grid positions for the graph view
    Layout(LayoutArgs),

    /// Run the unblock cascade for a node that just reached done
    ///
    /// Notifies owners of dependents whose last dependency cleared.
    /// Re-running for the same node is safe: the notification log
    /// deduplicates on a stable key.
    Complete(CompleteArgs),

    /// Check the snapshot for defects
    ///
    /// Reports malformed lines, dangling edges, self-loops, duplicates,
    /// and dependency cycles. Defects never stop the other commands; this
    /// is where they become visible.
    Check(CheckArgs),
}

impl Cli {
    /// Parse command-line arguments.
    #[must_use]
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Execute the parsed command.
    pub async fn execute(self) -> Result<()> {
        execute::run(self).await
    }
}
