//! Output formatting for CLI commands.
//!
//! Renders computed statuses, blocking explanations, layout tables, and
//! snapshot diagnostics as human-readable text. JSON output paths live in
//! the command layer and serialize engine types directly.
//!
//! Submodules:
//! - [`color`]: semantic colors and status icons

pub mod color;

use std::collections::HashSet;
use std::io::{self, Write};

use color::{colorize_id, colorize_relation, colorize_status, dimmed, status_icon, warning};
use std::collections::BTreeMap;
use std::env;
use trellis_engine::diagnose::GraphDiagnostics;
use trellis_engine::domain::{ComputedStatus, NodeId};
use trellis_engine::layout::Position;
use trellis_engine::snapshot::SnapshotIndex;
use trellis_engine::status::{blocking_details, BlockingReason};

use crate::store::LoadWarning;

const DEFAULT_TERMINAL_WIDTH: u16 = 80;
const DEFAULT_MAX_CONTENT_WIDTH: usize = 80;

/// Depth limit for the blocking explanation tree. Cycles are cut by a
/// visited set; this guards against pathologically deep chains.
const MAX_EXPLAIN_DEPTH: usize = 50;

/// Configuration for output formatting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputConfig {
    /// Maximum content width for text wrapping.
    pub max_width: usize,
    /// Whether to use ASCII-only icons instead of Unicode.
    pub use_ascii: bool,
    /// Whether to use colors in output.
    pub use_colors: bool,
}

impl OutputConfig {
    /// Create an `OutputConfig` by reading from environment variables.
    ///
    /// Reads:
    /// - `TRELLIS_MAX_WIDTH`: maximum content width (default: terminal
    ///   width, capped at 80)
    /// - `TRELLIS_ASCII`: set to "1" or "true" for ASCII-only icons
    /// - `NO_COLOR`: standard env var to disable colors
    /// - `TRELLIS_COLOR`: set to "0" or "false" to disable colors
    #[must_use]
    pub fn from_env() -> Self {
        let max_width = match env::var("TRELLIS_MAX_WIDTH") {
            Ok(s) if !s.is_empty() => s.parse().unwrap_or_else(|_| {
                tracing::warn!(env_var = "TRELLIS_MAX_WIDTH", value = %s, "invalid value, using default");
                DEFAULT_MAX_CONTENT_WIDTH
            }),
            _ => terminal_width().min(DEFAULT_MAX_CONTENT_WIDTH),
        };

        let use_ascii = matches!(
            env::var("TRELLIS_ASCII").as_deref(),
            Ok("1") | Ok("true") | Ok("TRUE") | Ok("True")
        );

        // Respect the NO_COLOR convention (https://no-color.org/).
        let use_colors = env::var("NO_COLOR").is_err()
            && env::var("TRELLIS_COLOR")
                .map(|v| v != "0" && !v.eq_ignore_ascii_case("false"))
                .unwrap_or(true);

        Self {
            max_width,
            use_ascii,
            use_colors,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            max_width: DEFAULT_MAX_CONTENT_WIDTH,
            use_ascii: false,
            use_colors: true,
        }
    }
}

fn terminal_width() -> usize {
    terminal_size::terminal_size()
        .map(|(w, _)| w.0 as usize)
        .unwrap_or(DEFAULT_TERMINAL_WIDTH as usize)
}

/// Presentation status for a node: the computed value, with `blocked`
/// relabeled as `waiting` when every blocking reason is a request — held
/// up by a person rather than a task. This is a display distinction only;
/// the engine's computed value stays `blocked`.
#[must_use]
pub fn display_status(computed: ComputedStatus, reasons: &[BlockingReason]) -> ComputedStatus {
    if computed == ComputedStatus::Blocked
        && !reasons.is_empty()
        && reasons.iter().all(BlockingReason::is_request)
    {
        ComputedStatus::Waiting
    } else {
        computed
    }
}

/// Print one line per node: icon, id, status, title, blocker count.
pub fn print_status_board<W: Write>(
    w: &mut W,
    index: &SnapshotIndex<'_>,
    statuses: &BTreeMap<NodeId, ComputedStatus>,
    config: &OutputConfig,
) -> io::Result<()> {
    for node in index.nodes() {
        let Some(&computed) = statuses.get(&node.id) else {
            continue;
        };
        let reasons = blocking_details(index, &node.id);
        let shown = display_status(computed, &reasons);

        let blockers = if reasons.is_empty() {
            String::new()
        } else {
            let suffix = format!(
                " ({} blocker{})",
                reasons.len(),
                if reasons.len() == 1 { "" } else { "s" }
            );
            dimmed(&suffix, config)
        };

        let prefix = format!(
            "{} {} {:<8} ",
            status_icon(shown, config),
            colorize_id(node.id.as_str(), config),
            colorize_status(shown, config),
        );
        let title = fit_title(&node.title, config);
        writeln!(w, "{prefix}{title}{blockers}")?;
    }
    Ok(())
}

/// Truncate a title so board lines stay near the configured width.
///
/// Wrapping would misalign the columns, so long titles get an ellipsis
/// instead.
fn fit_title(title: &str, config: &OutputConfig) -> String {
    // Leave room for icon, id, and status columns.
    let width = config.max_width.saturating_sub(30).max(20);
    let mut wrapped = textwrap::wrap(title, width);
    match wrapped.len() {
        0 => String::new(),
        1 => wrapped.remove(0).into_owned(),
        _ => format!("{}…", wrapped.remove(0)),
    }
}

/// Print a blocking explanation tree for one node.
///
/// The root line shows the node itself; children are its blocking
/// reasons, and dependency/approval reasons recurse into the target's own
/// reasons. A visited set cuts cycles, printing a `(cycle)` marker
/// instead of looping.
///
/// ```text
/// ✗ app-deploy [blocked] Deploy the app
/// ├── app-build (depends-on) ▶ Build the app
/// │   └── request req-7 (open)
/// └── sec-review (approval-by) ○ Security review
/// ```
pub fn print_blocking_tree<W: Write>(
    w: &mut W,
    index: &SnapshotIndex<'_>,
    statuses: &BTreeMap<NodeId, ComputedStatus>,
    id: &NodeId,
    config: &OutputConfig,
) -> io::Result<()> {
    let reasons = blocking_details(index, id);
    let computed = statuses
        .get(id)
        .copied()
        .unwrap_or(ComputedStatus::Blocked);
    let shown = display_status(computed, &reasons);

    let root_icon = if config.use_ascii { "*" } else { "◆" };
    let title = index.node(id).map(|n| n.title.as_str()).unwrap_or("");
    writeln!(
        w,
        "{} {} [{}] {}",
        dimmed(root_icon, config),
        colorize_id(id.as_str(), config),
        colorize_status(shown, config),
        title
    )?;

    if reasons.is_empty() {
        writeln!(w, "{}", dimmed("  not blocked", config))?;
        return Ok(());
    }

    let mut visited = HashSet::new();
    visited.insert(id.clone());
    print_reason_children(w, index, statuses, &reasons, &[], &mut visited, config)
}

#[allow(clippy::too_many_lines)]
fn print_reason_children<W: Write>(
    w: &mut W,
    index: &SnapshotIndex<'_>,
    statuses: &BTreeMap<NodeId, ComputedStatus>,
    reasons: &[BlockingReason],
    prefix_segments: &[bool],
    visited: &mut HashSet<NodeId>,
    config: &OutputConfig,
) -> io::Result<()> {
    let (branch, corner, pipe, space) = if config.use_ascii {
        ("|-- ", "`-- ", "|   ", "    ")
    } else {
        ("├── ", "└── ", "│   ", "    ")
    };

    for (i, reason) in reasons.iter().enumerate() {
        let is_last = i == reasons.len() - 1;

        let mut prefix = String::new();
        for &has_more in prefix_segments {
            prefix.push_str(&dimmed(if has_more { pipe } else { space }, config));
        }
        let connector = dimmed(if is_last { corner } else { branch }, config);

        match reason {
            BlockingReason::Dependency { target, .. } | BlockingReason::Approval { target, .. } => {
                let relation = match reason {
                    BlockingReason::Dependency { .. } => {
                        trellis_engine::domain::EdgeRelation::DependsOn
                    }
                    _ => trellis_engine::domain::EdgeRelation::ApprovalBy,
                };
                let label = format!("({})", colorize_relation(relation, config));

                match index.node(target) {
                    None => {
                        writeln!(
                            w,
                            "{prefix}{connector}{} {label} {}",
                            colorize_id(target.as_str(), config),
                            warning("(missing)", config)
                        )?;
                    }
                    Some(node) => {
                        let child_reasons = blocking_details(index, target);
                        let child_status = statuses
                            .get(target)
                            .copied()
                            .unwrap_or(ComputedStatus::Blocked);
                        let child_status = display_status(child_status, &child_reasons);
                        let cycle = !visited.insert(target.clone());
                        let cycle_marker = if cycle {
                            format!(" {}", warning("(cycle)", config))
                        } else {
                            String::new()
                        };
                        writeln!(
                            w,
                            "{prefix}{connector}{} {label} {} {}{cycle_marker}",
                            colorize_id(target.as_str(), config),
                            status_icon(child_status, config),
                            node.title
                        )?;

                        if !cycle && prefix_segments.len() < MAX_EXPLAIN_DEPTH {
                            let mut child_prefix = prefix_segments.to_vec();
                            child_prefix.push(!is_last);
                            print_reason_children(
                                w,
                                index,
                                statuses,
                                &child_reasons,
                                &child_prefix,
                                visited,
                                config,
                            )?;
                        }
                    }
                }
            }
            BlockingReason::Request { request, status } => {
                writeln!(
                    w,
                    "{prefix}{connector}request {} ({})",
                    colorize_id(&request.to_string(), config),
                    warning(&status.to_string(), config)
                )?;
            }
        }
    }
    Ok(())
}

/// Print the layout as an aligned table of grid positions.
pub fn print_layout_table<W: Write>(
    w: &mut W,
    index: &SnapshotIndex<'_>,
    positions: &BTreeMap<NodeId, Position>,
    config: &OutputConfig,
) -> io::Result<()> {
    writeln!(w, "{}", dimmed("node          x        y", config))?;
    for (id, position) in positions {
        let title = index.node(id).map(|n| n.title.as_str()).unwrap_or("");
        writeln!(
            w,
            "{:<12} {:>8.1} {:>8.1}  {}",
            colorize_id(id.as_str(), config),
            position.x,
            position.y,
            title
        )?;
    }
    Ok(())
}

/// Print snapshot load warnings, one per line.
pub fn print_load_warnings<W: Write>(
    w: &mut W,
    warnings: &[LoadWarning],
    config: &OutputConfig,
) -> io::Result<()> {
    for item in warnings {
        writeln!(w, "{} {item}", warning("warning:", config))?;
    }
    Ok(())
}

/// Print graph diagnostics: cycles and malformed records.
pub fn print_diagnostics<W: Write>(
    w: &mut W,
    diagnostics: &GraphDiagnostics,
    config: &OutputConfig,
) -> io::Result<()> {
    if diagnostics.is_clean() {
        writeln!(w, "{}", color::success("graph is clean", config))?;
        return Ok(());
    }

    for cycle in &diagnostics.cycles {
        let members: Vec<&str> = cycle.iter().map(NodeId::as_str).collect();
        writeln!(
            w,
            "{} {}",
            color::error("cycle:", config),
            members.join(" -> ")
        )?;
    }
    for edge in &diagnostics.dangling_edges {
        writeln!(
            w,
            "{} edge {} -> {} references a missing node",
            warning("dangling:", config),
            edge.from,
            edge.to
        )?;
    }
    for edge in &diagnostics.self_loops {
        writeln!(
            w,
            "{} node {} has an edge to itself",
            warning("self-loop:", config),
            edge.from
        )?;
    }
    for edge in &diagnostics.duplicate_edges {
        writeln!(
            w,
            "{} edge {} -> {} ({}) is declared more than once",
            warning("duplicate:", config),
            edge.from,
            edge.to,
            edge.relation
        )?;
    }
    for node in &diagnostics.duplicate_nodes {
        writeln!(
            w,
            "{} node id {} appears more than once",
            warning("duplicate:", config),
            node
        )?;
    }
    Ok(())
}
