//! Error types for the trellis CLI and tooling layer.

use std::io;
use std::path::PathBuf;
use thiserror::Error;
use trellis_engine::domain::NodeId;

/// The error type for trellis tooling operations.
#[derive(Debug, Error)]
pub enum Error {
    /// IO error occurred.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML configuration error.
    #[error("config error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// An error bubbled up from the engine.
    #[error(transparent)]
    Engine(#[from] trellis_engine::error::Error),

    /// The snapshot directory has no node file.
    #[error("no snapshot found: {path} is missing (expected a nodes.jsonl)")]
    SnapshotMissing {
        /// The path that was checked.
        path: PathBuf,
    },

    /// A node id given on the command line does not exist in the snapshot.
    #[error("node not found in snapshot: {0}")]
    NodeNotFound(NodeId),
}

/// A specialized Result type for trellis tooling operations.
pub type Result<T> = std::result::Result<T, Error>;
