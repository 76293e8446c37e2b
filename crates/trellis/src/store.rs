//! JSONL snapshot loading.
//!
//! A project snapshot lives in a directory as three JSON Lines files:
//! `nodes.jsonl`, `edges.jsonl`, `requests.jsonl`. Loading is resilient:
//! a malformed line is skipped with a warning, and structurally suspect
//! records (dangling edge endpoints, self-loops, requests on unknown
//! nodes) are *kept* with a warning — the engine tolerates them, and
//! dropping records here would hide defects the `check` command exists to
//! surface.

use crate::error::{Error, Result};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};
use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{debug, warn};
use trellis_engine::domain::{Edge, Node, NodeId, Request, RequestId};
use trellis_engine::snapshot::ProjectSnapshot;

/// File name of the node list inside a snapshot directory.
pub const NODES_FILE: &str = "nodes.jsonl";

/// File name of the edge list inside a snapshot directory.
pub const EDGES_FILE: &str = "edges.jsonl";

/// File name of the request list inside a snapshot directory.
pub const REQUESTS_FILE: &str = "requests.jsonl";

/// Non-fatal problems found while loading a snapshot.
///
/// Loading continues past all of these; callers should show them to the
/// user (the `check` command renders them directly).
#[derive(Debug, Clone, PartialEq)]
pub enum LoadWarning {
    /// A line that could not be parsed as the expected record type. The
    /// line is skipped.
    MalformedLine {
        /// File the line came from.
        file: String,
        /// 1-based line number.
        line_number: usize,
        /// Parser error text.
        error: String,
    },

    /// An edge referencing a node absent from the node list. Kept; the
    /// engine treats the missing target as not done.
    DanglingEdge {
        /// Source node id.
        from: NodeId,
        /// Target node id.
        to: NodeId,
    },

    /// An edge from a node to itself. Kept; it permanently gates its node
    /// if it is a gating relation.
    SelfLoop {
        /// The node in question.
        node: NodeId,
    },

    /// A request linked to a node absent from the node list. Kept but
    /// inert.
    OrphanRequest {
        /// The request id.
        request: RequestId,
        /// The missing node id.
        node: NodeId,
    },

    /// A node id that appeared more than once. The later record shadows
    /// the earlier one in the engine's index.
    DuplicateNode {
        /// The repeated id.
        node: NodeId,
    },
}

impl fmt::Display for LoadWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MalformedLine {
                file,
                line_number,
                error,
            } => write!(f, "{file}:{line_number}: malformed line: {error}"),
            Self::DanglingEdge { from, to } => {
                write!(f, "edge {from} -> {to} references a missing node")
            }
            Self::SelfLoop { node } => write!(f, "node {node} has an edge to itself"),
            Self::OrphanRequest { request, node } => {
                write!(f, "request {request} is linked to missing node {node}")
            }
            Self::DuplicateNode { node } => write!(f, "node id {node} appears more than once"),
        }
    }
}

/// Source of project snapshots — the loader collaborator the engine's
/// callers depend on. Implementations return the snapshot together with
/// any non-fatal warnings they hit.
#[async_trait]
pub trait SnapshotSource: Send + Sync {
    /// Load the full snapshot.
    async fn load(&self) -> Result<(ProjectSnapshot, Vec<LoadWarning>)>;
}

/// Snapshot source backed by a directory of JSONL files.
#[derive(Debug, Clone)]
pub struct JsonlSnapshotStore {
    dir: PathBuf,
}

impl JsonlSnapshotStore {
    /// Create a store reading from the given directory.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// The directory this store reads from.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

#[async_trait]
impl SnapshotSource for JsonlSnapshotStore {
    async fn load(&self) -> Result<(ProjectSnapshot, Vec<LoadWarning>)> {
        let mut warnings = Vec::new();

        let nodes_path = self.dir.join(NODES_FILE);
        if !tokio::fs::try_exists(&nodes_path).await.unwrap_or(false) {
            return Err(Error::SnapshotMissing { path: nodes_path });
        }

        let nodes: Vec<Node> = read_jsonl(&nodes_path, &mut warnings).await?;
        let edges: Vec<Edge> = read_jsonl(&self.dir.join(EDGES_FILE), &mut warnings).await?;
        let requests: Vec<Request> =
            read_jsonl(&self.dir.join(REQUESTS_FILE), &mut warnings).await?;

        collect_structural_warnings(&nodes, &edges, &requests, &mut warnings);

        debug!(
            nodes = nodes.len(),
            edges = edges.len(),
            requests = requests.len(),
            warnings = warnings.len(),
            "loaded snapshot"
        );

        Ok((
            ProjectSnapshot {
                nodes,
                edges,
                requests,
            },
            warnings,
        ))
    }
}

/// Read one JSONL file into records, collecting malformed-line warnings.
///
/// A missing file is an empty list: edge and request files are optional.
async fn read_jsonl<T: DeserializeOwned>(
    path: &Path,
    warnings: &mut Vec<LoadWarning>,
) -> Result<Vec<T>> {
    let file = match File::open(path).await {
        Ok(file) => file,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "snapshot file missing, treating as empty");
            return Ok(Vec::new());
        }
        Err(err) => return Err(err.into()),
    };
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    let mut records = Vec::new();
    let mut lines = BufReader::new(file).lines();
    let mut line_number = 0usize;
    while let Some(line) = lines.next_line().await? {
        line_number += 1;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        match serde_json::from_str::<T>(trimmed) {
            Ok(record) => records.push(record),
            Err(err) => {
                warn!(file = %file_name, line = line_number, error = %err, "skipping malformed line");
                warnings.push(LoadWarning::MalformedLine {
                    file: file_name.clone(),
                    line_number,
                    error: err.to_string(),
                });
            }
        }
    }

    Ok(records)
}

fn collect_structural_warnings(
    nodes: &[Node],
    edges: &[Edge],
    requests: &[Request],
    warnings: &mut Vec<LoadWarning>,
) {
    let mut ids: HashSet<&NodeId> = HashSet::with_capacity(nodes.len());
    for node in nodes {
        if !ids.insert(&node.id) {
            warnings.push(LoadWarning::DuplicateNode {
                node: node.id.clone(),
            });
        }
    }

    for edge in edges {
        if edge.from == edge.to {
            warnings.push(LoadWarning::SelfLoop {
                node: edge.from.clone(),
            });
        }
        if !ids.contains(&edge.from) || !ids.contains(&edge.to) {
            warnings.push(LoadWarning::DanglingEdge {
                from: edge.from.clone(),
                to: edge.to.clone(),
            });
        }
    }

    for request in requests {
        if !ids.contains(&request.node_id) {
            warnings.push(LoadWarning::OrphanRequest {
                request: request.id.clone(),
                node: request.node_id.clone(),
            });
        }
    }
}
