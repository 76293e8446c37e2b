//! Status computation and blocking explanations.
//!
//! The computed status of a node is a pure function of the snapshot. The
//! rule, evaluated in priority order with first match winning:
//!
//! 1. `manual_status == done` computes to done. Completion is
//!    authoritative; a done node is never blocked.
//! 2. Any outgoing gating edge (`depends-on`, `approval-by`) whose target
//!    is not done — or is missing from the snapshot — blocks the node, as
//!    does any active request linked to it.
//! 3. Otherwise the computed status mirrors the manual one.
//!
//! `ComputedStatus::Waiting` is deliberately never produced here: the
//! inspectable rule is two-state (done vs blocked vs fallthrough), and
//! waiting exists only as a presentation relabeling of blocked nodes whose
//! every reason is a request. See `trellis::output::display_status`.

use crate::domain::{ComputedStatus, ManualStatus, Node, NodeId, RequestId, RequestStatus};
use crate::snapshot::SnapshotIndex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::warn;

/// Why a node is blocked, in enough detail to render an explanation or
/// feed an assistant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BlockingReason {
    /// An unmet `depends-on` edge.
    Dependency {
        /// Target node id.
        target: NodeId,
        /// Target title, when the target exists in the snapshot.
        title: Option<String>,
        /// Target manual status; `None` for a dangling reference.
        status: Option<ManualStatus>,
    },

    /// An unmet `approval-by` edge.
    Approval {
        /// Target node id.
        target: NodeId,
        /// Target title, when the target exists in the snapshot.
        title: Option<String>,
        /// Target manual status; `None` for a dangling reference.
        status: Option<ManualStatus>,
    },

    /// An active request linked to the node.
    Request {
        /// Request id.
        request: RequestId,
        /// Current request status (`open` or `responded`).
        status: RequestStatus,
    },
}

impl BlockingReason {
    /// Whether this reason is about a person (an active request) rather
    /// than a task.
    #[must_use]
    pub fn is_request(&self) -> bool {
        matches!(self, Self::Request { .. })
    }
}

/// Compute the status of every node in the snapshot.
///
/// Side-effect free and deterministic: identical snapshots yield identical
/// maps, and the `BTreeMap` gives a stable iteration order on top.
#[must_use]
pub fn compute_statuses(index: &SnapshotIndex<'_>) -> BTreeMap<NodeId, ComputedStatus> {
    index
        .nodes()
        .iter()
        .map(|node| (node.id.clone(), compute_status(index, node)))
        .collect()
}

/// Compute the status of a single node against the indexed snapshot.
#[must_use]
pub fn compute_status(index: &SnapshotIndex<'_>, node: &Node) -> ComputedStatus {
    if node.manual_status.is_done() {
        return ComputedStatus::Done;
    }
    if is_hard_blocked(index, node) {
        return ComputedStatus::Blocked;
    }
    match node.manual_status {
        ManualStatus::Doing => ComputedStatus::Doing,
        // Done handled above; anything else mirrors as todo.
        _ => ComputedStatus::Todo,
    }
}

fn is_hard_blocked(index: &SnapshotIndex<'_>, node: &Node) -> bool {
    let gated = index
        .outgoing_edges(&node.id)
        .filter(|edge| edge.relation.is_gating())
        .any(|edge| !target_is_done(index, &edge.to));
    gated || index.active_requests(&node.id).next().is_some()
}

/// A dangling target counts as not done, so a bad edge blocks rather than
/// crashes.
fn target_is_done(index: &SnapshotIndex<'_>, target: &NodeId) -> bool {
    match index.node(target) {
        Some(node) => node.manual_status.is_done(),
        None => {
            warn!(target = %target, "gating edge target not found, treating as not done");
            false
        }
    }
}

/// Ordered blocking reasons for one node.
///
/// Gating edges come first, in declaration order, then active requests in
/// list order. The list is complete, never sampled: it feeds both the
/// "why is this blocked" UI and downstream analysis. A done node has no
/// reasons, whatever its edges and requests say; an id absent from the
/// snapshot yields an empty list.
#[must_use]
pub fn blocking_details(index: &SnapshotIndex<'_>, id: &NodeId) -> Vec<BlockingReason> {
    let Some(node) = index.node(id) else {
        return Vec::new();
    };
    if node.manual_status.is_done() {
        return Vec::new();
    }

    let mut reasons = Vec::new();
    for edge in index.outgoing_edges(id) {
        if !edge.relation.is_gating() {
            continue;
        }
        let target = index.node(&edge.to);
        if target.is_some_and(|t| t.manual_status.is_done()) {
            continue;
        }
        let title = target.map(|t| t.title.clone());
        let status = target.map(|t| t.manual_status);
        let reason = match edge.relation {
            crate::domain::EdgeRelation::DependsOn => BlockingReason::Dependency {
                target: edge.to.clone(),
                title,
                status,
            },
            _ => BlockingReason::Approval {
                target: edge.to.clone(),
                title,
                status,
            },
        };
        reasons.push(reason);
    }

    for request in index.active_requests(id) {
        reasons.push(BlockingReason::Request {
            request: request.id.clone(),
            status: request.status,
        });
    }

    reasons
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Edge, EdgeRelation, Request, RequestStatus};
    use crate::snapshot::ProjectSnapshot;

    fn node(id: &str, status: ManualStatus) -> Node {
        Node {
            id: NodeId::new(id),
            title: format!("Node {id}"),
            kind: crate::domain::NodeKind::Task,
            manual_status: status,
            owners: vec![],
            teams: vec![],
            priority: 2,
            due_at: None,
            width: None,
            height: None,
        }
    }

    fn edge(from: &str, to: &str, relation: EdgeRelation) -> Edge {
        Edge {
            from: NodeId::new(from),
            to: NodeId::new(to),
            relation,
        }
    }

    #[test]
    fn advisory_edges_never_block() {
        let snapshot = ProjectSnapshot {
            nodes: vec![node("a", ManualStatus::Todo), node("b", ManualStatus::Todo)],
            edges: vec![
                edge("a", "b", EdgeRelation::NeedsInfoFrom),
                edge("a", "b", EdgeRelation::HandoffTo),
            ],
            requests: vec![],
        };
        let index = snapshot.index();
        let statuses = compute_statuses(&index);
        assert_eq!(statuses[&NodeId::new("a")], ComputedStatus::Todo);
    }

    #[test]
    fn doing_mirrors_through_when_unblocked() {
        let snapshot = ProjectSnapshot {
            nodes: vec![node("a", ManualStatus::Doing)],
            edges: vec![],
            requests: vec![],
        };
        let index = snapshot.index();
        assert_eq!(
            compute_statuses(&index)[&NodeId::new("a")],
            ComputedStatus::Doing
        );
    }

    #[test]
    fn dangling_gating_edge_blocks() {
        let snapshot = ProjectSnapshot {
            nodes: vec![node("a", ManualStatus::Todo)],
            edges: vec![edge("a", "ghost", EdgeRelation::DependsOn)],
            requests: vec![],
        };
        let index = snapshot.index();
        assert_eq!(
            compute_statuses(&index)[&NodeId::new("a")],
            ComputedStatus::Blocked
        );

        let reasons = blocking_details(&index, &NodeId::new("a"));
        assert_eq!(
            reasons,
            vec![BlockingReason::Dependency {
                target: NodeId::new("ghost"),
                title: None,
                status: None,
            }]
        );
    }

    #[test]
    fn details_for_unknown_node_are_empty() {
        let snapshot = ProjectSnapshot::default();
        let index = snapshot.index();
        assert!(blocking_details(&index, &NodeId::new("ghost")).is_empty());
    }

    #[test]
    fn details_order_edges_then_requests() {
        let snapshot = ProjectSnapshot {
            nodes: vec![
                node("a", ManualStatus::Todo),
                node("b", ManualStatus::Todo),
                node("c", ManualStatus::Todo),
            ],
            edges: vec![
                edge("a", "b", EdgeRelation::ApprovalBy),
                edge("a", "c", EdgeRelation::DependsOn),
            ],
            requests: vec![Request {
                id: crate::domain::RequestId("r1".to_string()),
                node_id: NodeId::new("a"),
                status: RequestStatus::Responded,
                assignee: None,
                team: None,
            }],
        };
        let index = snapshot.index();
        let reasons = blocking_details(&index, &NodeId::new("a"));
        assert_eq!(reasons.len(), 3);
        assert!(matches!(reasons[0], BlockingReason::Approval { .. }));
        assert!(matches!(reasons[1], BlockingReason::Dependency { .. }));
        assert!(matches!(reasons[2], BlockingReason::Request { .. }));
    }
}
