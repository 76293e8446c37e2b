//! Deterministic grid layout for graph views.
//!
//! Layout ignores status entirely: it looks only at the structural edges,
//! treating every edge `from -> to` as "from comes after to", which
//! matches dependency semantics (a node renders after the things it waits
//! on). Three steps:
//!
//! 1. Longest-path depth labeling via Kahn's algorithm.
//! 2. A stable topological order: the ready queue always pops the node
//!    with the smallest original input index, so ties resolve
//!    reproducibly.
//! 3. Row-major grid placement sorted by `(depth, order)`.
//!
//! Cyclic graphs terminate rather than error: nodes the traversal never
//! reaches get the sentinel depth [`CYCLE_DEPTH`] and an order of
//! [`CYCLE_ORDER_BASE`] plus their input index, which renders them after
//! every acyclic node without colliding with each other. The sentinels are
//! a termination guarantee, not cycle reporting; `diagnose` has a separate
//! pass for naming cycle members.

use crate::domain::{Edge, Node, NodeId};
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::collections::{BTreeMap, BinaryHeap, HashMap};
use tracing::warn;

/// Depth assigned to nodes caught in a cycle.
pub const CYCLE_DEPTH: usize = 999;

/// Base of the order range assigned to nodes caught in a cycle; the node's
/// original input index is added on top.
pub const CYCLE_ORDER_BASE: usize = 10_000;

/// Width used for nodes that do not carry their own.
pub const DEFAULT_NODE_WIDTH: f64 = 240.0;

/// Height used for nodes that do not carry their own.
pub const DEFAULT_NODE_HEIGHT: f64 = 120.0;

/// Tunables for grid placement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutOptions {
    /// Nodes per row.
    pub columns: usize,

    /// Horizontal gap between columns.
    pub x_gap: f64,

    /// Vertical gap between rows.
    pub y_gap: f64,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            columns: 5,
            x_gap: 60.0,
            y_gap: 40.0,
        }
    }
}

/// A node's position in the auto-arranged view.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    /// Horizontal coordinate.
    pub x: f64,
    /// Vertical coordinate.
    pub y: f64,
}

/// Depth and stable topological order for every node, exposed for tests
/// and diagnostics alongside [`compute_layout`].
#[derive(Debug, Clone, PartialEq)]
pub struct TopoLabels {
    /// Longest-path depth per input index; [`CYCLE_DEPTH`] for cycle
    /// members.
    pub depth: Vec<usize>,
    /// Stable topological order per input index; `CYCLE_ORDER_BASE + i`
    /// for cycle members.
    pub order: Vec<usize>,
}

/// Label every node with its longest-path depth and stable topological
/// order.
///
/// Total on any input: dangling edges are skipped (with a warning), and a
/// cycle of any size drains into the sentinel labels instead of looping.
#[must_use]
pub fn topo_labels(nodes: &[Node], edges: &[Edge]) -> TopoLabels {
    let n = nodes.len();
    let mut index_of: HashMap<&NodeId, usize> = HashMap::with_capacity(n);
    for (i, node) in nodes.iter().enumerate() {
        index_of.entry(&node.id).or_insert(i);
    }

    // Edges run gated -> prerequisite, so the traversal walks them
    // backwards: popping a prerequisite relaxes its dependents.
    let mut in_degree = vec![0usize; n];
    let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); n];
    for edge in edges {
        let (Some(&from), Some(&to)) = (index_of.get(&edge.from), index_of.get(&edge.to)) else {
            warn!(from = %edge.from, to = %edge.to, "skipping edge with missing endpoint in layout");
            continue;
        };
        in_degree[from] += 1;
        dependents[to].push(from);
    }

    let mut ready: BinaryHeap<Reverse<usize>> = (0..n)
        .filter(|&i| in_degree[i] == 0)
        .map(Reverse)
        .collect();

    let mut depth = vec![0usize; n];
    let mut order = vec![usize::MAX; n];
    let mut next_order = 0usize;

    while let Some(Reverse(u)) = ready.pop() {
        order[u] = next_order;
        next_order += 1;
        for &v in &dependents[u] {
            depth[v] = depth[v].max(depth[u] + 1);
            in_degree[v] -= 1;
            if in_degree[v] == 0 {
                ready.push(Reverse(v));
            }
        }
    }

    // Whatever the queue never reached sits on a cycle.
    for i in 0..n {
        if order[i] == usize::MAX {
            depth[i] = CYCLE_DEPTH;
            order[i] = CYCLE_ORDER_BASE + i;
        }
    }

    TopoLabels { depth, order }
}

/// Assign every node a deterministic grid position.
///
/// Pure and total: no exceptions on malformed or cyclic graphs, no state
/// carried between calls. `x` advances by column using the default node
/// width; `y` advances per row by the tallest node seen in the finished
/// row plus the vertical gap.
#[must_use]
pub fn compute_layout(
    nodes: &[Node],
    edges: &[Edge],
    options: &LayoutOptions,
) -> BTreeMap<NodeId, Position> {
    let labels = topo_labels(nodes, edges);
    let columns = options.columns.max(1);

    let mut placement: Vec<usize> = (0..nodes.len()).collect();
    placement.sort_by_key(|&i| (labels.depth[i], labels.order[i]));

    let mut positions = BTreeMap::new();
    let mut y = 0.0f64;
    let mut row_tallest = 0.0f64;
    for (slot, &i) in placement.iter().enumerate() {
        let column = slot % columns;
        if slot > 0 && column == 0 {
            y += row_tallest + options.y_gap;
            row_tallest = 0.0;
        }
        let node = &nodes[i];
        let x = column as f64 * (DEFAULT_NODE_WIDTH + options.x_gap);
        row_tallest = row_tallest.max(node.height.unwrap_or(DEFAULT_NODE_HEIGHT));
        positions.insert(node.id.clone(), Position { x, y });
    }

    positions
}
