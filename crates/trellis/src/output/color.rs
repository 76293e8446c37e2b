//! Color and styling helpers for CLI output.
//!
//! Semantic color theme:
//!   - Done:            green
//!   - Doing/Waiting:   yellow
//!   - Blocked:         red
//!   - Todo:            white
//!   - Ids/References:  cyan
//!   - Connectors:      dimmed

use colored::Colorize;
use trellis_engine::domain::{ComputedStatus, EdgeRelation};

use super::OutputConfig;

/// Apply semantic "success" color (green) to text.
pub fn success(text: &str, config: &OutputConfig) -> String {
    if !config.use_colors {
        return text.to_string();
    }
    text.green().to_string()
}

/// Apply semantic "error" color (red) to text.
pub fn error(text: &str, config: &OutputConfig) -> String {
    if !config.use_colors {
        return text.to_string();
    }
    text.red().to_string()
}

/// Apply semantic "warning" color (yellow) to text.
pub fn warning(text: &str, config: &OutputConfig) -> String {
    if !config.use_colors {
        return text.to_string();
    }
    text.yellow().to_string()
}

/// Apply semantic "info" color (cyan) to text.
pub fn info(text: &str, config: &OutputConfig) -> String {
    if !config.use_colors {
        return text.to_string();
    }
    text.cyan().to_string()
}

/// Dim a connector or field label.
pub(crate) fn dimmed(text: &str, config: &OutputConfig) -> String {
    if !config.use_colors {
        return text.to_string();
    }
    text.dimmed().to_string()
}

/// Colorize a node id (cyan).
pub(crate) fn colorize_id(id: &str, config: &OutputConfig) -> String {
    if !config.use_colors {
        return id.to_string();
    }
    id.cyan().to_string()
}

/// Apply color to a computed status.
pub(crate) fn colorize_status(status: ComputedStatus, config: &OutputConfig) -> String {
    let text = format!("{status}");
    if !config.use_colors {
        return text;
    }
    match status {
        ComputedStatus::Blocked => text.red().to_string(),
        ComputedStatus::Waiting | ComputedStatus::Doing => text.yellow().to_string(),
        ComputedStatus::Todo => text.white().to_string(),
        ComputedStatus::Done => text.green().to_string(),
    }
}

/// Colorize a relation label (dimmed, parenthesized by the caller).
pub(crate) fn colorize_relation(relation: EdgeRelation, config: &OutputConfig) -> String {
    let text = format!("{relation}");
    if !config.use_colors {
        return text;
    }
    text.dimmed().to_string()
}

/// Get a colored status icon, with ASCII fallback support.
pub(crate) fn status_icon(status: ComputedStatus, config: &OutputConfig) -> String {
    let icon = if config.use_ascii {
        match status {
            ComputedStatus::Blocked => "x",
            ComputedStatus::Waiting => "?",
            ComputedStatus::Todo => "o",
            ComputedStatus::Doing => ">",
            ComputedStatus::Done => "+",
        }
    } else {
        match status {
            ComputedStatus::Blocked => "✗",
            ComputedStatus::Waiting => "…",
            ComputedStatus::Todo => "○",
            ComputedStatus::Doing => "▶",
            ComputedStatus::Done => "✓",
        }
    };

    if !config.use_colors {
        return icon.to_string();
    }

    match status {
        ComputedStatus::Blocked => icon.red().to_string(),
        ComputedStatus::Waiting | ComputedStatus::Doing => icon.yellow().to_string(),
        ComputedStatus::Todo => icon.white().to_string(),
        ComputedStatus::Done => icon.green().to_string(),
    }
}
