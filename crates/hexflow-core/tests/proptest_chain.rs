//! Property-based tests for chain stepping.
//!
//! Uses proptest to generate random belt lines and scan orders, then verifies
//! the stepping invariants hold.

use hexflow_core::test_utils::*;
use hexflow_core::{Item, NodeId, TickEvent, TransportNetwork, step_chains};
use proptest::prelude::*;

// ===========================================================================
// Generators
// ===========================================================================

/// A belt line of 1..=max belts where each belt is independently loaded.
fn arb_loaded_line(max: usize) -> impl Strategy<Value = Vec<bool>> {
    proptest::collection::vec(any::<bool>(), 1..=max)
}

/// Build the line, putting a distinct item `item-i` on each loaded belt.
fn build_loaded(loaded: &[bool]) -> (TransportNetwork, Vec<NodeId>) {
    let mut net = TransportNetwork::new();
    let nodes: Vec<NodeId> = (0..loaded.len())
        .map(|i| add_belt(&mut net, i as u32 + 1))
        .collect();
    link_all(&mut net, &nodes);
    for (i, &full) in loaded.iter().enumerate() {
        if full {
            net.set_inventory(nodes[i], Some(item(&format!("item-{i}"))))
                .unwrap();
        }
    }
    (net, nodes)
}

fn position_of(net: &TransportNetwork, nodes: &[NodeId], wanted: &Item) -> Option<usize> {
    nodes.iter().position(|&n| net.inventory(n) == Some(wanted))
}

fn snapshot(net: &TransportNetwork, nodes: &[NodeId]) -> Vec<Option<Item>> {
    nodes.iter().map(|&n| net.inventory(n).cloned()).collect()
}

// ===========================================================================
// Properties
// ===========================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// One step moves every item zero or one hop downstream, never more.
    #[test]
    fn items_move_at_most_one_hop(loaded in arb_loaded_line(24)) {
        let (mut net, nodes) = build_loaded(&loaded);
        let before: Vec<(Item, usize)> = loaded
            .iter()
            .enumerate()
            .filter(|(_, full)| **full)
            .map(|(i, _)| (item(&format!("item-{i}")), i))
            .collect();

        step_chains(&mut net, nodes.clone());

        for (it, old) in before {
            let new = position_of(&net, &nodes, &it);
            prop_assert!(new.is_some(), "{} vanished", it);
            let new = new.unwrap();
            prop_assert!(new == old || new == old + 1, "{} moved {} -> {}", it, old, new);
        }
    }

    /// The chain is the same no matter which node the scan reaches first.
    #[test]
    fn scan_order_does_not_matter(
        (loaded, order) in arb_loaded_line(16).prop_flat_map(|loaded| {
            let n = loaded.len();
            (Just(loaded), Just((0..n).collect::<Vec<_>>()).prop_shuffle())
        })
    ) {
        let (mut in_order, nodes_a) = build_loaded(&loaded);
        let (mut shuffled, nodes_b) = build_loaded(&loaded);

        let ra = step_chains(&mut in_order, nodes_a.clone());
        let rb = step_chains(&mut shuffled, order.iter().map(|&i| nodes_b[i]));

        prop_assert_eq!(ra.chains, 1);
        prop_assert_eq!(rb.chains, 1);
        prop_assert_eq!(snapshot(&in_order, &nodes_a), snapshot(&shuffled, &nodes_b));
    }

    /// Everything a producer emits is either consumed or still on the line.
    #[test]
    fn producer_line_conserves_items(belts in 1usize..12, steps in 1usize..60) {
        let mut net = TransportNetwork::new();
        let nodes = build_line(&mut net, 1, iron(), belts, iron());
        let receiver = *nodes.last().unwrap();

        let mut produced = 0usize;
        let mut consumed = 0usize;
        for _ in 0..steps {
            let report = step_chains(&mut net, nodes.clone());
            prop_assert!(report.is_clean());
            for event in &report.events {
                match event {
                    TickEvent::ItemProduced { .. } => produced += 1,
                    TickEvent::ItemConsumed { .. } => consumed += 1,
                    _ => {}
                }
            }
        }

        let on_belts = nodes[1..nodes.len() - 1]
            .iter()
            .filter(|&&n| net.inventory(n).is_some())
            .count();
        let at_receiver = usize::from(net.raw_slot(receiver).is_some());
        // The receiver's seed accounts for the extra consumption.
        prop_assert_eq!(produced + 1, consumed + on_belts + at_receiver);
    }
}
