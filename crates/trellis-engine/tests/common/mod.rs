//! Shared fixtures for engine integration tests.
#![allow(dead_code)]

use trellis_engine::domain::{
    Edge, EdgeRelation, ManualStatus, Node, NodeId, NodeKind, Request, RequestId, RequestStatus,
    UserId,
};

/// Build a bare node with the given manual status.
pub fn node(id: &str, status: ManualStatus) -> Node {
    Node {
        id: NodeId::new(id),
        title: format!("Node {id}"),
        kind: NodeKind::Task,
        manual_status: status,
        owners: vec![],
        teams: vec![],
        priority: 2,
        due_at: None,
        width: None,
        height: None,
    }
}

/// Build a node with owners.
pub fn owned_node(id: &str, status: ManualStatus, owners: &[&str]) -> Node {
    let mut n = node(id, status);
    n.owners = owners.iter().map(|o| UserId::new(*o)).collect();
    n
}

/// Build an edge of any relation.
pub fn edge(from: &str, to: &str, relation: EdgeRelation) -> Edge {
    Edge {
        from: NodeId::new(from),
        to: NodeId::new(to),
        relation,
    }
}

/// Build a `depends-on` edge.
pub fn dep(from: &str, to: &str) -> Edge {
    edge(from, to, EdgeRelation::DependsOn)
}

/// Build a request linked to a node.
pub fn request(id: &str, node: &str, status: RequestStatus) -> Request {
    Request {
        id: RequestId(id.to_string()),
        node_id: NodeId::new(node),
        status,
        assignee: Some(UserId::new("reviewer")),
        team: None,
    }
}
