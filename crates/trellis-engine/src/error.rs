//! Error types for engine operations.

use crate::domain::{NodeId, UserId};
use std::io;
use thiserror::Error;

/// The error type for engine operations.
///
/// The pure compute functions are total and never fail; errors only arise
/// on the cascade's I/O seam, and there they are collected per owner rather
/// than aborting the run.
#[derive(Debug, Error)]
pub enum Error {
    /// IO error surfaced by a notification sink implementation.
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// A notification sink rejected an emission.
    #[error("notification sink failed for {node} -> {owner}: {message}")]
    Sink {
        /// The node the notification was about.
        node: NodeId,
        /// The owner the notification was addressed to.
        owner: UserId,
        /// Description of the underlying failure.
        message: String,
    },
}

/// A specialized Result type for engine operations.
pub type Result<T> = std::result::Result<T, Error>;
