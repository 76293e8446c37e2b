//! Property tests: the pure passes must be total and deterministic on
//! arbitrary graphs, cyclic or malformed included.

mod common;

use common::node;
use proptest::prelude::*;
use trellis_engine::domain::{ComputedStatus, Edge, EdgeRelation, ManualStatus, Node, NodeId};
use trellis_engine::layout::{compute_layout, topo_labels, LayoutOptions, CYCLE_ORDER_BASE};
use trellis_engine::snapshot::ProjectSnapshot;
use trellis_engine::status::compute_statuses;

fn arb_status() -> impl Strategy<Value = ManualStatus> {
    prop_oneof![
        Just(ManualStatus::Todo),
        Just(ManualStatus::Doing),
        Just(ManualStatus::Done),
    ]
}

fn arb_relation() -> impl Strategy<Value = EdgeRelation> {
    prop_oneof![
        Just(EdgeRelation::DependsOn),
        Just(EdgeRelation::ApprovalBy),
        Just(EdgeRelation::NeedsInfoFrom),
        Just(EdgeRelation::HandoffTo),
    ]
}

/// Up to a dozen nodes with random statuses and up to twenty random edges,
/// self-loops and duplicates allowed.
fn arb_graph() -> impl Strategy<Value = (Vec<Node>, Vec<Edge>)> {
    (1usize..12).prop_flat_map(|n| {
        let nodes = proptest::collection::vec(arb_status(), n).prop_map(|statuses| {
            statuses
                .into_iter()
                .enumerate()
                .map(|(i, status)| node(&format!("n{i}"), status))
                .collect::<Vec<_>>()
        });
        let edges = proptest::collection::vec((0..n, 0..n, arb_relation()), 0..20).prop_map(
            move |raw| {
                raw.into_iter()
                    .map(|(from, to, relation)| Edge {
                        from: NodeId::new(format!("n{from}")),
                        to: NodeId::new(format!("n{to}")),
                        relation,
                    })
                    .collect::<Vec<_>>()
            },
        );
        (nodes, edges)
    })
}

proptest! {
    #[test]
    fn layout_is_total_and_deterministic((nodes, edges) in arb_graph()) {
        let options = LayoutOptions::default();
        let first = compute_layout(&nodes, &edges, &options);
        let second = compute_layout(&nodes, &edges, &options);
        prop_assert_eq!(&first, &second);
        prop_assert_eq!(first.len(), nodes.len());
    }

    #[test]
    fn every_node_is_labeled((nodes, edges) in arb_graph()) {
        let labels = topo_labels(&nodes, &edges);
        prop_assert_eq!(labels.depth.len(), nodes.len());

        // Orders never collide, cycle sentinels included.
        let mut orders = labels.order.clone();
        orders.sort_unstable();
        orders.dedup();
        prop_assert_eq!(orders.len(), nodes.len());

        for (i, &order) in labels.order.iter().enumerate() {
            if order >= CYCLE_ORDER_BASE {
                prop_assert_eq!(order, CYCLE_ORDER_BASE + i);
            }
        }
    }

    #[test]
    fn statuses_are_deterministic_and_done_absorbs((nodes, edges) in arb_graph()) {
        let snapshot = ProjectSnapshot { nodes, edges, requests: vec![] };
        let index = snapshot.index();

        let first = compute_statuses(&index);
        let second = compute_statuses(&index);
        prop_assert_eq!(&first, &second);

        for node in &snapshot.nodes {
            if node.manual_status.is_done() {
                prop_assert_eq!(first[&node.id], ComputedStatus::Done);
            }
            prop_assert_ne!(first[&node.id], ComputedStatus::Waiting);
        }
    }
}
