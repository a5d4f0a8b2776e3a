//! Shared test helpers for integration tests and benchmarks.
//!
//! Gated behind `#[cfg(any(test, feature = "test-utils"))]` so these helpers
//! are available in unit tests, integration tests, and benchmarks (via the
//! `test-utils` feature).

use crate::id::{NodeId, TransportId};
use crate::item::Item;
use crate::network::TransportNetwork;
use crate::transport::Transport;

// ===========================================================================
// Item constructors
// ===========================================================================

/// Build an item, panicking on an empty name.
pub fn item(name: &str) -> Item {
    Item::new(name).expect("test item names are non-empty")
}

pub fn iron() -> Item {
    item("iron")
}

pub fn copper() -> Item {
    item("copper")
}

// ===========================================================================
// Network builders
// ===========================================================================

/// Add a belt with the given save-format id.
pub fn add_belt(net: &mut TransportNetwork, id: u32) -> NodeId {
    net.add(Transport::belt(TransportId(id)))
        .expect("test ids are unique")
}

pub fn add_producer(net: &mut TransportNetwork, id: u32, key: Item) -> NodeId {
    net.add(Transport::producer(TransportId(id), key))
        .expect("test ids are unique")
}

pub fn add_receiver(net: &mut TransportNetwork, id: u32, key: Item) -> NodeId {
    net.add(Transport::receiver(TransportId(id), key))
        .expect("test ids are unique")
}

/// Link the nodes in order with `connect`.
pub fn link_all(net: &mut TransportNetwork, nodes: &[NodeId]) {
    for pair in nodes.windows(2) {
        net.connect(pair[0], pair[1]).expect("test links are valid");
    }
}

/// Build `Producer(produce) -> belts x n -> Receiver(expect)` with ids
/// `first_id..`. Returns the nodes head first.
pub fn build_line(
    net: &mut TransportNetwork,
    first_id: u32,
    produce: Item,
    belts: usize,
    expect: Item,
) -> Vec<NodeId> {
    let mut id = first_id;
    let mut nodes = Vec::with_capacity(belts + 2);
    nodes.push(add_producer(net, id, produce));
    for _ in 0..belts {
        id += 1;
        nodes.push(add_belt(net, id));
    }
    id += 1;
    nodes.push(add_receiver(net, id, expect));
    link_all(net, &nodes);
    nodes
}

/// `count` independent lines of `belts` belts each, all carrying iron.
pub fn build_lines(count: usize, belts: usize) -> (TransportNetwork, Vec<NodeId>) {
    let mut net = TransportNetwork::new();
    let mut all = Vec::new();
    let stride = belts as u32 + 2;
    for i in 0..count as u32 {
        all.extend(build_line(&mut net, 1 + i * stride, iron(), belts, iron()));
    }
    (net, all)
}
