//! Project snapshots and their adjacency index.
//!
//! The engine never queries storage. Callers load a [`ProjectSnapshot`]
//! (plain node/edge/request lists) through whatever collaborator they use
//! and hand it to the engine, which builds a [`SnapshotIndex`] once and
//! reuses it across status computation, blocking details, and the cascade
//! instead of re-scanning the flat lists.
//!
//! Malformed input is tolerated, not rejected: self-loops, dangling edge
//! endpoints, and duplicate node ids are logged at `warn` and kept, so a
//! single bad record can never take down computation for a whole project.

use crate::domain::{Edge, Node, NodeId, Request};
use std::collections::HashMap;
use tracing::warn;

/// All nodes, edges, and requests of one project at a point in time.
///
/// Immutable as far as the engine is concerned; every compute function
/// takes it by shared reference and returns fresh output.
#[derive(Debug, Clone, Default)]
pub struct ProjectSnapshot {
    /// Nodes, in whatever order the loader produced them. Layout treats
    /// this order as the tie-breaking "original index".
    pub nodes: Vec<Node>,

    /// Edges, in declaration order. Blocking details preserve this order.
    pub edges: Vec<Edge>,

    /// Requests, in list order. Blocking details preserve this order.
    pub requests: Vec<Request>,
}

impl ProjectSnapshot {
    /// Build the adjacency index for this snapshot.
    #[must_use]
    pub fn index(&self) -> SnapshotIndex<'_> {
        SnapshotIndex::new(self)
    }
}

/// Adjacency maps over a [`ProjectSnapshot`], built once and shared by all
/// engine passes.
///
/// Holds only indices into the snapshot's own vectors, so iteration orders
/// (edge declaration order, request list order) survive indexing.
#[derive(Debug)]
pub struct SnapshotIndex<'a> {
    snapshot: &'a ProjectSnapshot,
    nodes_by_id: HashMap<&'a NodeId, &'a Node>,
    outgoing: HashMap<&'a NodeId, Vec<usize>>,
    incoming_depends: HashMap<&'a NodeId, Vec<usize>>,
    active_requests: HashMap<&'a NodeId, Vec<usize>>,
}

impl<'a> SnapshotIndex<'a> {
    fn new(snapshot: &'a ProjectSnapshot) -> Self {
        let mut nodes_by_id: HashMap<&NodeId, &Node> =
            HashMap::with_capacity(snapshot.nodes.len());
        for node in &snapshot.nodes {
            if nodes_by_id.insert(&node.id, node).is_some() {
                warn!(node = %node.id, "duplicate node id in snapshot, later entry shadows earlier");
            }
        }

        let mut outgoing: HashMap<&NodeId, Vec<usize>> = HashMap::new();
        let mut incoming_depends: HashMap<&NodeId, Vec<usize>> = HashMap::new();
        for (i, edge) in snapshot.edges.iter().enumerate() {
            if edge.from == edge.to {
                warn!(node = %edge.from, relation = %edge.relation, "self-loop edge in snapshot");
            }
            if !nodes_by_id.contains_key(&edge.from) || !nodes_by_id.contains_key(&edge.to) {
                warn!(from = %edge.from, to = %edge.to, "edge references a node missing from the snapshot");
            }
            outgoing.entry(&edge.from).or_default().push(i);
            if edge.relation == crate::domain::EdgeRelation::DependsOn {
                incoming_depends.entry(&edge.to).or_default().push(i);
            }
        }

        let mut active_requests: HashMap<&NodeId, Vec<usize>> = HashMap::new();
        for (i, request) in snapshot.requests.iter().enumerate() {
            if request.status.is_active() {
                active_requests.entry(&request.node_id).or_default().push(i);
            }
        }

        Self {
            snapshot,
            nodes_by_id,
            outgoing,
            incoming_depends,
            active_requests,
        }
    }

    /// All nodes, in input order.
    #[must_use]
    pub fn nodes(&self) -> &'a [Node] {
        &self.snapshot.nodes
    }

    /// All edges, in declaration order.
    #[must_use]
    pub fn edges(&self) -> &'a [Edge] {
        &self.snapshot.edges
    }

    /// Look up a node by id.
    #[must_use]
    pub fn node(&self, id: &NodeId) -> Option<&'a Node> {
        self.nodes_by_id.get(id).copied()
    }

    /// Outgoing edges of a node, in declaration order.
    pub fn outgoing_edges(&self, id: &NodeId) -> impl Iterator<Item = &'a Edge> + '_ {
        self.outgoing
            .get(id)
            .into_iter()
            .flatten()
            .map(|&i| &self.snapshot.edges[i])
    }

    /// Incoming `depends-on` edges of a node, in declaration order.
    ///
    /// These identify the node's direct dependents: the `from` side of each
    /// returned edge is a node gated on `id`.
    pub fn dependents_of(&self, id: &NodeId) -> impl Iterator<Item = &'a Edge> + '_ {
        self.incoming_depends
            .get(id)
            .into_iter()
            .flatten()
            .map(|&i| &self.snapshot.edges[i])
    }

    /// Active (open or responded) requests linked to a node, in list order.
    pub fn active_requests(&self, id: &NodeId) -> impl Iterator<Item = &'a Request> + '_ {
        self.active_requests
            .get(id)
            .into_iter()
            .flatten()
            .map(|&i| &self.snapshot.requests[i])
    }
}
