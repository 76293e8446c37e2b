//! Command implementations.

use std::collections::BTreeMap;
use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::Result;
use serde_json::json;
use tracing::warn;

use trellis_engine::cascade::{trigger_unblock_cascade, NotificationSink};
use trellis_engine::diagnose::diagnose;
use trellis_engine::domain::{ComputedStatus, NodeId, OrgId};
use trellis_engine::layout::compute_layout;
use trellis_engine::snapshot::ProjectSnapshot;
use trellis_engine::status::{blocking_details, compute_statuses};

use super::{Cli, Commands};
use crate::config::TrellisConfig;
use crate::error::Error;
use crate::output::{
    self, display_status, print_blocking_tree, print_diagnostics, print_layout_table,
    print_load_warnings, print_status_board, OutputConfig,
};
use crate::sink::{JsonlSink, MemorySink};
use crate::store::{JsonlSnapshotStore, LoadWarning, SnapshotSource};

/// Dispatch the parsed CLI invocation.
pub(super) async fn run(cli: Cli) -> Result<()> {
    let project_dir = cli
        .global
        .dir
        .clone()
        .unwrap_or_else(|| PathBuf::from("."));
    let config = TrellisConfig::load_or_default(&project_dir).await?;
    let store = JsonlSnapshotStore::new(config.snapshot_dir_in(&project_dir));
    let (snapshot, warnings) = store.load().await?;

    // The check command renders warnings itself; elsewhere they only go
    // to the log so machine output stays clean.
    if !matches!(cli.command, Commands::Check(_)) {
        for warning in &warnings {
            warn!(%warning, "snapshot warning");
        }
    }

    let output_config = OutputConfig::from_env();
    let json = cli.global.json;

    match cli.command {
        Commands::Status(args) => status(&snapshot, args.blocked, json, &output_config),
        Commands::Explain(args) => explain(&snapshot, &args.node_id, json, &output_config),
        Commands::Layout(args) => layout(&snapshot, &config, args.columns, json, &output_config),
        Commands::Complete(args) => {
            complete(
                &snapshot,
                &config,
                &project_dir,
                &args.node_id,
                args.dry_run,
                json,
                &output_config,
            )
            .await
        }
        Commands::Check(args) => check(&snapshot, &warnings, args.strict, json, &output_config),
    }
}

fn status(
    snapshot: &ProjectSnapshot,
    only_blocked: bool,
    json: bool,
    output_config: &OutputConfig,
) -> Result<()> {
    let index = snapshot.index();
    let mut statuses = compute_statuses(&index);
    if only_blocked {
        statuses.retain(|_, status| *status == ComputedStatus::Blocked);
    }

    let stdout = io::stdout();
    let mut handle = stdout.lock();
    if json {
        let shown: BTreeMap<&NodeId, ComputedStatus> = statuses
            .iter()
            .map(|(id, &status)| (id, display_status(status, &blocking_details(&index, id))))
            .collect();
        writeln!(handle, "{}", serde_json::to_string_pretty(&shown)?)?;
    } else {
        print_status_board(&mut handle, &index, &statuses, output_config)?;
    }
    Ok(())
}

fn explain(
    snapshot: &ProjectSnapshot,
    node_id: &str,
    json: bool,
    output_config: &OutputConfig,
) -> Result<()> {
    let id = NodeId::new(node_id);
    let index = snapshot.index();
    if index.node(&id).is_none() {
        return Err(Error::NodeNotFound(id).into());
    }

    let statuses = compute_statuses(&index);
    let stdout = io::stdout();
    let mut handle = stdout.lock();
    if json {
        let reasons = blocking_details(&index, &id);
        let payload = json!({
            "node": &id,
            "status": statuses[&id],
            "display_status": display_status(statuses[&id], &reasons),
            "reasons": reasons,
        });
        writeln!(handle, "{}", serde_json::to_string_pretty(&payload)?)?;
    } else {
        print_blocking_tree(&mut handle, &index, &statuses, &id, output_config)?;
    }
    Ok(())
}

fn layout(
    snapshot: &ProjectSnapshot,
    config: &TrellisConfig,
    columns: Option<usize>,
    json: bool,
    output_config: &OutputConfig,
) -> Result<()> {
    let mut options = config.layout.clone();
    if let Some(columns) = columns {
        options.columns = columns;
    }
    let positions = compute_layout(&snapshot.nodes, &snapshot.edges, &options);

    let stdout = io::stdout();
    let mut handle = stdout.lock();
    if json {
        writeln!(handle, "{}", serde_json::to_string_pretty(&positions)?)?;
    } else {
        let index = snapshot.index();
        print_layout_table(&mut handle, &index, &positions, output_config)?;
    }
    Ok(())
}

async fn complete(
    snapshot: &ProjectSnapshot,
    config: &TrellisConfig,
    project_dir: &std::path::Path,
    node_id: &str,
    dry_run: bool,
    json: bool,
    output_config: &OutputConfig,
) -> Result<()> {
    let id = NodeId::new(node_id);
    let index = snapshot.index();
    match index.node(&id) {
        None => return Err(Error::NodeNotFound(id).into()),
        Some(node) if !node.manual_status.is_done() => {
            warn!(node = %id, status = %node.manual_status,
                "snapshot does not record this node as done, cascading anyway");
        }
        Some(_) => {}
    }

    let sink: Box<dyn NotificationSink> = if dry_run {
        Box::new(MemorySink::new())
    } else {
        Box::new(JsonlSink::open(config.notification_log_in(project_dir)).await?)
    };

    let org = OrgId(config.org.clone());
    let outcome = trigger_unblock_cascade(&index, &org, &id, sink.as_ref()).await;

    let stdout = io::stdout();
    let mut handle = stdout.lock();
    if json {
        let payload = json!({
            "notified": outcome
                .notified
                .iter()
                .map(|(node, owner)| json!({ "node": node, "owner": owner }))
                .collect::<Vec<_>>(),
            "deduplicated": outcome.deduplicated,
            "errors": outcome.errors.iter().map(ToString::to_string).collect::<Vec<_>>(),
            "dry_run": dry_run,
        });
        writeln!(handle, "{}", serde_json::to_string_pretty(&payload)?)?;
    } else {
        for (node, owner) in &outcome.notified {
            writeln!(
                handle,
                "{} {owner} about {node}",
                output::color::success("notified", output_config)
            )?;
        }
        if outcome.deduplicated > 0 {
            writeln!(
                handle,
                "{} duplicate notification(s) discarded",
                outcome.deduplicated
            )?;
        }
        for error in &outcome.errors {
            writeln!(
                handle,
                "{} {error}",
                output::color::error("failed:", output_config)
            )?;
        }
        if outcome.notified.is_empty() && outcome.deduplicated == 0 && outcome.errors.is_empty() {
            writeln!(handle, "no dependents became actionable")?;
        }
    }
    Ok(())
}

fn check(
    snapshot: &ProjectSnapshot,
    warnings: &[LoadWarning],
    strict: bool,
    json: bool,
    output_config: &OutputConfig,
) -> Result<()> {
    let diagnostics = diagnose(&snapshot.nodes, &snapshot.edges);

    let stdout = io::stdout();
    let mut handle = stdout.lock();
    if json {
        let payload = json!({
            "warnings": warnings.iter().map(ToString::to_string).collect::<Vec<_>>(),
            "diagnostics": diagnostics,
        });
        writeln!(handle, "{}", serde_json::to_string_pretty(&payload)?)?;
    } else {
        print_load_warnings(&mut handle, warnings, output_config)?;
        print_diagnostics(&mut handle, &diagnostics, output_config)?;
    }

    if strict && (!warnings.is_empty() || !diagnostics.is_clean()) {
        anyhow::bail!("snapshot has defects");
    }
    Ok(())
}
