//! Domain types for the dependency graph engine.
//!
//! A project is a set of [`Node`]s connected by directed [`Edge`]s, with
//! out-of-band [`Request`]s attached to individual nodes. The only status
//! that is ever persisted is [`Node::manual_status`]; everything else
//! ([`ComputedStatus`] in particular) is derived on demand and has no
//! identity of its own.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier for a node.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeId(pub String);

impl NodeId {
    /// Create a new node ID.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The ID as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for NodeId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for NodeId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Unique identifier for a user.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct UserId(pub String);

impl UserId {
    /// Create a new user ID.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The ID as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for UserId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Unique identifier for a team.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TeamId(pub String);

impl fmt::Display for TeamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for TeamId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Unique identifier for a request.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RequestId(pub String);

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for RequestId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Unique identifier for an organization.
///
/// Threaded through notifications so the sink can route them; membership
/// resolution itself lives outside this engine.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OrgId(pub String);

impl fmt::Display for OrgId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for OrgId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Author-controlled lifecycle status of a node.
///
/// This is the only status with a lifecycle of its own; it is mutated only
/// by explicit user action, never by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ManualStatus {
    /// Not started.
    Todo,

    /// Currently being worked on.
    Doing,

    /// Completed. Completion is authoritative: a done node is never
    /// considered blocked, whatever its edges or requests say.
    Done,
}

impl ManualStatus {
    /// Whether this status is [`ManualStatus::Done`].
    #[must_use]
    pub fn is_done(self) -> bool {
        matches!(self, Self::Done)
    }
}

impl fmt::Display for ManualStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Todo => "todo",
            Self::Doing => "doing",
            Self::Done => "done",
        };
        write!(f, "{s}")
    }
}

/// Descriptive category of a node. Has no effect on status computation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    /// A unit of work.
    #[default]
    Task,

    /// A decision to be made.
    Decision,

    /// Something standing in the way of other work.
    Blocker,

    /// A question that needs answering.
    InfoRequest,
}

/// A unit of work in the project graph.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    /// Unique identifier.
    pub id: NodeId,

    /// Short human-readable title.
    pub title: String,

    /// Descriptive node category.
    #[serde(default)]
    pub kind: NodeKind,

    /// Author-controlled status; see [`ManualStatus`].
    pub manual_status: ManualStatus,

    /// Users responsible for this node.
    #[serde(default)]
    pub owners: Vec<UserId>,

    /// Teams associated with this node.
    #[serde(default)]
    pub teams: Vec<TeamId>,

    /// Priority level (0 = highest).
    #[serde(default)]
    pub priority: u8,

    /// Optional due timestamp.
    #[serde(default)]
    pub due_at: Option<DateTime<Utc>>,

    /// Render width, when the caller has measured one.
    #[serde(default)]
    pub width: Option<f64>,

    /// Render height, when the caller has measured one.
    #[serde(default)]
    pub height: Option<f64>,
}

/// Kind of relation carried by an [`Edge`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EdgeRelation {
    /// The source node is gated on the target reaching done.
    DependsOn,

    /// The source node is gated on an approval, represented by the target
    /// reaching done.
    ApprovalBy,

    /// Advisory: the source wants information from the target.
    NeedsInfoFrom,

    /// Advisory: work passes from the source to the target.
    HandoffTo,
}

impl EdgeRelation {
    /// Whether this relation gates the source node's computed status.
    ///
    /// Only `depends-on` and `approval-by` gate; the other relations exist
    /// for visualization and never block anything.
    #[must_use]
    pub fn is_gating(self) -> bool {
        matches!(self, Self::DependsOn | Self::ApprovalBy)
    }
}

impl fmt::Display for EdgeRelation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::DependsOn => "depends-on",
            Self::ApprovalBy => "approval-by",
            Self::NeedsInfoFrom => "needs-info-from",
            Self::HandoffTo => "handoff-to",
        };
        write!(f, "{s}")
    }
}

/// A directed relation between two nodes in the same project.
///
/// For gating relations the **from** node is the one being held up:
/// `from` cannot be considered unblocked until `to` is done.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    /// The gated (or annotating) node.
    pub from: NodeId,

    /// The node being depended on, approving, informing, or receiving.
    pub to: NodeId,

    /// Relation kind.
    pub relation: EdgeRelation,
}

/// Status of a [`Request`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    /// Awaiting a response.
    Open,

    /// A response arrived but has not been accepted yet.
    Responded,

    /// Terminal: the response was accepted.
    Approved,

    /// Terminal: closed without approval.
    Closed,
}

impl RequestStatus {
    /// Whether the request is still unresolved (`open` or `responded`).
    /// Active requests gate the node they are linked to.
    #[must_use]
    pub fn is_active(self) -> bool {
        matches!(self, Self::Open | Self::Responded)
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Open => "open",
            Self::Responded => "responded",
            Self::Approved => "approved",
            Self::Closed => "closed",
        };
        write!(f, "{s}")
    }
}

/// An out-of-band question linked to exactly one node.
///
/// In steady state a request is addressed to a user or a team, not both.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Request {
    /// Unique identifier.
    pub id: RequestId,

    /// The node this request is linked to.
    pub node_id: NodeId,

    /// Current request status.
    pub status: RequestStatus,

    /// Addressee, when directed at a single user.
    #[serde(default)]
    pub assignee: Option<UserId>,

    /// Addressee, when directed at a team.
    #[serde(default)]
    pub team: Option<TeamId>,
}

/// Derived lifecycle status of a node.
///
/// Recomputed from a snapshot every time it is needed and never written
/// back to storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComputedStatus {
    /// Gated by an unmet dependency or approval edge, or by an active
    /// request.
    Blocked,

    /// Presentation-layer relabeling of [`ComputedStatus::Blocked`] for
    /// nodes held up only by people (active requests). The compute engine
    /// itself never returns this; see `status::compute_statuses`.
    Waiting,

    /// Unblocked, not started.
    Todo,

    /// Unblocked, in progress.
    Doing,

    /// Completed.
    Done,
}

impl fmt::Display for ComputedStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Blocked => "blocked",
            Self::Waiting => "waiting",
            Self::Todo => "todo",
            Self::Doing => "doing",
            Self::Done => "done",
        };
        write!(f, "{s}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gating_relations() {
        assert!(EdgeRelation::DependsOn.is_gating());
        assert!(EdgeRelation::ApprovalBy.is_gating());
        assert!(!EdgeRelation::NeedsInfoFrom.is_gating());
        assert!(!EdgeRelation::HandoffTo.is_gating());
    }

    #[test]
    fn active_request_statuses() {
        assert!(RequestStatus::Open.is_active());
        assert!(RequestStatus::Responded.is_active());
        assert!(!RequestStatus::Approved.is_active());
        assert!(!RequestStatus::Closed.is_active());
    }

    #[test]
    fn node_deserializes_with_defaults() {
        let json = r#"{"id":"n1","title":"First","manual_status":"todo"}"#;
        let node: Node = serde_json::from_str(json).unwrap();
        assert_eq!(node.id, NodeId::new("n1"));
        assert_eq!(node.kind, NodeKind::Task);
        assert!(node.owners.is_empty());
        assert_eq!(node.priority, 0);
        assert!(node.width.is_none());
    }

    #[test]
    fn edge_relation_serializes_kebab_case() {
        let edge = Edge {
            from: NodeId::new("a"),
            to: NodeId::new("b"),
            relation: EdgeRelation::ApprovalBy,
        };
        let json = serde_json::to_string(&edge).unwrap();
        assert!(json.contains("\"approval-by\""));
    }
}
