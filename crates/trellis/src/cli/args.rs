//! CLI argument structs for all commands.

use clap::Parser;
use std::path::PathBuf;

/// Arguments for the `status` command
#[derive(Parser, Debug, Clone, Default)]
pub struct StatusArgs {
    /// Only show blocked (or waiting) nodes
    #[arg(long)]
    pub blocked: bool,
}

/// Arguments for the `explain` command
#[derive(Parser, Debug, Clone)]
pub struct ExplainArgs {
    /// Node ID to explain
    pub node_id: String,
}

/// Arguments for the `layout` command
#[derive(Parser, Debug, Clone, Default)]
pub struct LayoutArgs {
    /// Nodes per row (overrides configuration)
    #[arg(long)]
    pub columns: Option<usize>,
}

/// Arguments for the `complete` command
#[derive(Parser, Debug, Clone)]
pub struct CompleteArgs {
    /// Node ID that just transitioned to done
    pub node_id: String,

    /// Evaluate the cascade without writing to the notification log
    #[arg(long)]
    pub dry_run: bool,
}

/// Arguments for the `check` command
#[derive(Parser, Debug, Clone, Default)]
pub struct CheckArgs {
    /// Exit non-zero when any defect is found
    #[arg(long)]
    pub strict: bool,
}

/// Global options shared by every command
#[derive(Parser, Debug, Clone)]
pub struct GlobalArgs {
    /// Output in JSON format for programmatic use
    #[arg(long, global = true)]
    pub json: bool,

    /// Project directory (defaults to the current directory)
    #[arg(short = 'C', long = "dir", global = true)]
    pub dir: Option<PathBuf>,
}
