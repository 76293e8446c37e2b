//! Integration tests for the layout engine.

mod common;

use common::{dep, edge, node};
use std::collections::HashMap;
use trellis_engine::domain::{EdgeRelation, ManualStatus, NodeId};
use trellis_engine::layout::{
    compute_layout, topo_labels, LayoutOptions, CYCLE_DEPTH, CYCLE_ORDER_BASE,
    DEFAULT_NODE_HEIGHT, DEFAULT_NODE_WIDTH,
};

#[test]
fn topological_order_is_sound() {
    // Diamond: d depends on b and c, both depend on a.
    let nodes = vec![
        node("a", ManualStatus::Todo),
        node("b", ManualStatus::Todo),
        node("c", ManualStatus::Todo),
        node("d", ManualStatus::Todo),
    ];
    let edges = vec![dep("b", "a"), dep("c", "a"), dep("d", "b"), dep("d", "c")];
    let labels = topo_labels(&nodes, &edges);

    let index_of: HashMap<&str, usize> = nodes
        .iter()
        .enumerate()
        .map(|(i, n)| (n.id.as_str(), i))
        .collect();
    for e in &edges {
        // The prerequisite (to) must come before the gated node (from).
        assert!(
            labels.order[index_of[e.to.as_str()]] < labels.order[index_of[e.from.as_str()]],
            "{} should order before {}",
            e.to,
            e.from
        );
    }
}

#[test]
fn layout_is_deterministic() {
    let nodes = vec![
        node("a", ManualStatus::Todo),
        node("b", ManualStatus::Todo),
        node("c", ManualStatus::Todo),
    ];
    let edges = vec![dep("b", "a"), dep("c", "b")];
    let options = LayoutOptions::default();

    let first = compute_layout(&nodes, &edges, &options);
    let second = compute_layout(&nodes, &edges, &options);
    assert_eq!(first, second);
}

#[test]
fn layout_ignores_status() {
    let todo = vec![node("a", ManualStatus::Todo), node("b", ManualStatus::Todo)];
    let done = vec![node("a", ManualStatus::Done), node("b", ManualStatus::Doing)];
    let edges = vec![dep("b", "a")];
    let options = LayoutOptions::default();

    assert_eq!(
        compute_layout(&todo, &edges, &options),
        compute_layout(&done, &edges, &options)
    );
}

#[test]
fn cycle_terminates_and_renders_last() {
    let nodes = vec![
        node("free", ManualStatus::Todo),
        node("loop-a", ManualStatus::Todo),
        node("loop-b", ManualStatus::Todo),
        node("loop-c", ManualStatus::Todo),
    ];
    let edges = vec![
        dep("loop-a", "loop-b"),
        dep("loop-b", "loop-c"),
        dep("loop-c", "loop-a"),
    ];
    let labels = topo_labels(&nodes, &edges);

    assert_eq!(labels.depth[0], 0);
    assert_eq!(labels.order[0], 0);
    for i in 1..4 {
        assert_eq!(labels.depth[i], CYCLE_DEPTH);
        assert_eq!(labels.order[i], CYCLE_ORDER_BASE + i);
    }

    // Every node still gets a position.
    let positions = compute_layout(&nodes, &edges, &LayoutOptions::default());
    assert_eq!(positions.len(), 4);

    // Cycle members come after the free node in the grid walk.
    let free_y = positions[&NodeId::new("free")].y;
    for id in ["loop-a", "loop-b", "loop-c"] {
        let p = positions[&NodeId::new(id)];
        assert!(p.y > free_y || p.x > positions[&NodeId::new("free")].x);
    }
}

#[test]
fn default_grid_wraps_after_five_columns() {
    let nodes: Vec<_> = (0..6)
        .map(|i| node(&format!("n{i}"), ManualStatus::Todo))
        .collect();
    let options = LayoutOptions::default();
    let positions = compute_layout(&nodes, &[], &options);

    let last = positions[&NodeId::new("n5")];
    assert_eq!(last.x, 0.0);
    assert_eq!(last.y, DEFAULT_NODE_HEIGHT + options.y_gap);

    let fifth = positions[&NodeId::new("n4")];
    assert_eq!(fifth.x, 4.0 * (DEFAULT_NODE_WIDTH + options.x_gap));
    assert_eq!(fifth.y, 0.0);
}

#[test]
fn advisory_edges_shape_depth_too() {
    // The depth walk is relation-agnostic: a handoff also orders nodes.
    let nodes = vec![node("a", ManualStatus::Todo), node("b", ManualStatus::Todo)];
    let edges = vec![edge("b", "a", EdgeRelation::HandoffTo)];
    let labels = topo_labels(&nodes, &edges);
    assert_eq!(labels.depth, vec![0, 1]);
}

#[test]
fn dangling_edges_do_not_disturb_placement() {
    let nodes = vec![node("a", ManualStatus::Todo), node("b", ManualStatus::Todo)];
    let edges = vec![dep("b", "a"), dep("b", "ghost")];
    let positions = compute_layout(&nodes, &edges, &LayoutOptions::default());
    assert_eq!(positions.len(), 2);

    let labels = topo_labels(&nodes, &edges);
    assert_eq!(labels.depth, vec![0, 1]);
}
