//! Unblock notification cascade.
//!
//! Invoked by the caller exactly once per node transition into done (the
//! cascade does not detect transitions itself). It walks the completed
//! node's direct `depends-on` dependents, re-checks their remaining
//! dependencies against the snapshot, and emits one notification per owner
//! of each newly actionable node through the injected sink.
//!
//! Every emission carries a deduplication key derived from the
//! `(node, owner)` pair, so retries — including two sibling prerequisites
//! completing concurrently and both cascading into the same candidate —
//! cannot double-deliver. The sink owns the uniqueness constraint; no node
//! locking is involved.

use crate::domain::{EdgeRelation, ManualStatus, NodeId, OrgId, UserId};
use crate::error::{Error, Result};
use crate::snapshot::SnapshotIndex;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::HashSet;
use tracing::{debug, warn};

/// Length of the hex-encoded dedupe key.
const DEDUPE_KEY_LEN: usize = 16;

/// A notification about a node becoming actionable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    /// Organization the notification belongs to; passed through for the
    /// sink to route.
    pub org: OrgId,

    /// The node that became actionable.
    pub node: NodeId,

    /// The owner being notified.
    pub owner: UserId,

    /// Short subject line.
    pub title: String,

    /// Human-readable body.
    pub message: String,

    /// Uniqueness key for at-most-once delivery; see [`dedupe_key`].
    pub dedupe_key: String,
}

/// Outcome of a single sink emission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmitOutcome {
    /// The notification was recorded.
    Created,

    /// A notification with the same dedupe key already existed; the sink
    /// discarded this one silently.
    Deduplicated,
}

/// Destination for cascade notifications.
///
/// Implementations must honor [`Notification::dedupe_key`] as a uniqueness
/// constraint, returning [`EmitOutcome::Deduplicated`] rather than erroring
/// on a repeat. Delivery (email, push) is someone else's problem; this
/// trait only records that a notification exists.
#[async_trait]
pub trait NotificationSink: Send + Sync {
    /// Record one notification, deduplicating on its key.
    async fn emit(&self, notification: &Notification) -> Result<EmitOutcome>;
}

/// What a cascade run did.
#[derive(Debug, Default)]
pub struct CascadeOutcome {
    /// `(node, owner)` pairs the sink newly recorded.
    pub notified: Vec<(NodeId, UserId)>,

    /// Emissions the sink discarded as duplicates.
    pub deduplicated: usize,

    /// Per-owner failures. A failure never aborts the remaining owners or
    /// candidates; the caller may retry the whole cascade safely.
    pub errors: Vec<Error>,
}

/// Derive the deduplication key for an unblock notification.
///
/// Stable across processes and runs: SHA-256 of the `(node, owner)` pair,
/// hex-truncated. Anything re-deriving the key for the same pair lands on
/// the same sink row.
#[must_use]
pub fn dedupe_key(node: &NodeId, owner: &UserId) -> String {
    let mut hasher = Sha256::new();
    hasher.update(b"unblocked\x1f");
    hasher.update(node.as_str().as_bytes());
    hasher.update(b"\x1f");
    hasher.update(owner.as_str().as_bytes());
    let digest = hasher.finalize();
    let mut key = String::with_capacity(DEDUPE_KEY_LEN);
    for byte in digest.iter().take(DEDUPE_KEY_LEN / 2) {
        key.push_str(&format!("{byte:02x}"));
    }
    key
}

/// Run the unblock cascade for a node that just transitioned into done.
///
/// A candidate dependent is notified when all of its *other* `depends-on`
/// targets are done and its own manual status is still todo — a node
/// already doing (or done) is not newly actionable and stays quiet.
/// Dangling sibling targets count as unfinished, so a malformed edge makes
/// the cascade conservative rather than noisy.
pub async fn trigger_unblock_cascade(
    index: &SnapshotIndex<'_>,
    org: &OrgId,
    completed: &NodeId,
    sink: &dyn NotificationSink,
) -> CascadeOutcome {
    let mut outcome = CascadeOutcome::default();

    let completed_title = match index.node(completed) {
        Some(node) => node.title.clone(),
        None => {
            warn!(node = %completed, "completed node missing from snapshot, cascading by id only");
            completed.to_string()
        }
    };

    // Duplicate depends-on edges collapse to one candidate evaluation.
    let mut seen: HashSet<&NodeId> = HashSet::new();
    let candidates: Vec<&NodeId> = index
        .dependents_of(completed)
        .map(|edge| &edge.from)
        .filter(|id| seen.insert(*id))
        .collect();

    for candidate_id in candidates {
        let Some(candidate) = index.node(candidate_id) else {
            warn!(node = %candidate_id, "dependent edge source missing from snapshot, skipping");
            continue;
        };

        if candidate.manual_status != ManualStatus::Todo {
            debug!(node = %candidate_id, status = %candidate.manual_status,
                "skipping dependent not sitting at todo");
            continue;
        }

        let others_done = index
            .outgoing_edges(candidate_id)
            .filter(|edge| edge.relation == EdgeRelation::DependsOn && edge.to != *completed)
            .all(|edge| {
                index
                    .node(&edge.to)
                    .is_some_and(|target| target.manual_status.is_done())
            });
        if !others_done {
            debug!(node = %candidate_id, "skipping dependent with other unfinished dependencies");
            continue;
        }

        for owner in &candidate.owners {
            let notification = Notification {
                org: org.clone(),
                node: candidate_id.clone(),
                owner: owner.clone(),
                title: format!("Unblocked: {}", candidate.title),
                message: format!(
                    "\"{}\" is done. Every dependency of \"{}\" is now resolved.",
                    completed_title, candidate.title
                ),
                dedupe_key: dedupe_key(candidate_id, owner),
            };

            match sink.emit(&notification).await {
                Ok(EmitOutcome::Created) => {
                    outcome.notified.push((candidate_id.clone(), owner.clone()));
                }
                Ok(EmitOutcome::Deduplicated) => {
                    debug!(node = %candidate_id, owner = %owner, "notification deduplicated by sink");
                    outcome.deduplicated += 1;
                }
                Err(err) => {
                    warn!(node = %candidate_id, owner = %owner, error = %err,
                        "notification emission failed, continuing cascade");
                    outcome.errors.push(Error::Sink {
                        node: candidate_id.clone(),
                        owner: owner.clone(),
                        message: err.to_string(),
                    });
                }
            }
        }
    }

    outcome
}
