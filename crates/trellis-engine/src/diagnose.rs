//! Structural diagnostics for project graphs.
//!
//! The status and layout passes tolerate malformed graphs silently (beyond
//! a `warn` log): dangling edges block, cycles drain into sentinel
//! positions. This module is the separate pass that names the defects so a
//! caller can surface them — the layout sentinels guarantee termination
//! but do not report which nodes form a cycle.

use crate::domain::{Edge, Node, NodeId};
use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use serde::Serialize;
use std::collections::{HashMap, HashSet};

/// Structural defects found in one snapshot's graph.
#[derive(Debug, Clone, Default, Serialize)]
pub struct GraphDiagnostics {
    /// Strongly connected cycle groups, each sorted by node id; the list
    /// itself is sorted by first member for stable output.
    pub cycles: Vec<Vec<NodeId>>,

    /// Edges referencing a node missing from the snapshot.
    pub dangling_edges: Vec<Edge>,

    /// Edges from a node to itself.
    pub self_loops: Vec<Edge>,

    /// Second and later occurrences of an identical `(from, to, relation)`
    /// triple.
    pub duplicate_edges: Vec<Edge>,

    /// Node ids appearing more than once in the node list.
    pub duplicate_nodes: Vec<NodeId>,
}

impl GraphDiagnostics {
    /// Whether the graph has none of the defects this pass looks for.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.cycles.is_empty()
            && self.dangling_edges.is_empty()
            && self.self_loops.is_empty()
            && self.duplicate_edges.is_empty()
            && self.duplicate_nodes.is_empty()
    }
}

/// Inspect a graph for cycles and malformed records.
///
/// Total on any input; diagnostics are reported, never thrown.
#[must_use]
pub fn diagnose(nodes: &[Node], edges: &[Edge]) -> GraphDiagnostics {
    let mut diagnostics = GraphDiagnostics::default();

    let mut graph: DiGraph<NodeId, ()> = DiGraph::with_capacity(nodes.len(), edges.len());
    let mut node_map: HashMap<&NodeId, NodeIndex> = HashMap::with_capacity(nodes.len());
    for node in nodes {
        if node_map.contains_key(&node.id) {
            diagnostics.duplicate_nodes.push(node.id.clone());
            continue;
        }
        let ix = graph.add_node(node.id.clone());
        node_map.insert(&node.id, ix);
    }

    let mut seen_edges: HashSet<(&NodeId, &NodeId, crate::domain::EdgeRelation)> = HashSet::new();
    for edge in edges {
        if !seen_edges.insert((&edge.from, &edge.to, edge.relation)) {
            diagnostics.duplicate_edges.push(edge.clone());
        }
        if edge.from == edge.to {
            diagnostics.self_loops.push(edge.clone());
        }
        let (Some(&from), Some(&to)) = (node_map.get(&edge.from), node_map.get(&edge.to)) else {
            diagnostics.dangling_edges.push(edge.clone());
            continue;
        };
        graph.add_edge(from, to, ());
    }

    for scc in tarjan_scc(&graph) {
        let cyclic = scc.len() > 1 || scc.iter().any(|&ix| graph.find_edge(ix, ix).is_some());
        if !cyclic {
            continue;
        }
        let mut members: Vec<NodeId> = scc.iter().map(|&ix| graph[ix].clone()).collect();
        members.sort();
        diagnostics.cycles.push(members);
    }
    diagnostics.cycles.sort();

    diagnostics
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{EdgeRelation, ManualStatus, NodeKind};

    fn node(id: &str) -> Node {
        Node {
            id: NodeId::new(id),
            title: id.to_string(),
            kind: NodeKind::Task,
            manual_status: ManualStatus::Todo,
            owners: vec![],
            teams: vec![],
            priority: 2,
            due_at: None,
            width: None,
            height: None,
        }
    }

    fn dep(from: &str, to: &str) -> Edge {
        Edge {
            from: NodeId::new(from),
            to: NodeId::new(to),
            relation: EdgeRelation::DependsOn,
        }
    }

    #[test]
    fn clean_graph_reports_nothing() {
        let nodes = vec![node("a"), node("b")];
        let edges = vec![dep("b", "a")];
        assert!(diagnose(&nodes, &edges).is_clean());
    }

    #[test]
    fn reports_cycle_members() {
        let nodes = vec![node("a"), node("b"), node("c"), node("d")];
        let edges = vec![dep("a", "b"), dep("b", "c"), dep("c", "a")];
        let diagnostics = diagnose(&nodes, &edges);
        assert_eq!(
            diagnostics.cycles,
            vec![vec![NodeId::new("a"), NodeId::new("b"), NodeId::new("c")]]
        );
    }

    #[test]
    fn self_loop_counts_as_cycle_and_defect() {
        let nodes = vec![node("a")];
        let edges = vec![dep("a", "a")];
        let diagnostics = diagnose(&nodes, &edges);
        assert_eq!(diagnostics.self_loops.len(), 1);
        assert_eq!(diagnostics.cycles, vec![vec![NodeId::new("a")]]);
    }

    #[test]
    fn reports_dangling_and_duplicate_edges() {
        let nodes = vec![node("a"), node("b")];
        let edges = vec![dep("a", "ghost"), dep("a", "b"), dep("a", "b")];
        let diagnostics = diagnose(&nodes, &edges);
        assert_eq!(diagnostics.dangling_edges.len(), 1);
        assert_eq!(diagnostics.duplicate_edges.len(), 1);
    }
}
