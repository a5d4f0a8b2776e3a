//! Chain discovery and stepping.
//!
//! One step visits the given nodes in order. Every node not yet claimed this
//! step seeds a chain: walk previous links to the head and next links to the
//! tail, claiming every node on the way, then tick the chain from tail to
//! head. Ticking downstream first lets a node empty its slot before the
//! upstream neighbour pushes into it, so no item moves two hops in one step.
//!
//! A bad-state fault stops the rest of its own chain for this step and is
//! recorded in the report; other chains still run.

use crate::event::TickEvent;
use crate::id::{NodeId, TransportId};
use crate::network::TransportNetwork;
use crate::transport::{TickOutcome, TransportError};
use slotmap::SecondaryMap;
use tracing::{debug, warn};

/// A fault raised while ticking one chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainFault {
    /// Save-format id of the chain's head.
    pub head: TransportId,
    /// Save-format id of the chain's tail.
    pub tail: TransportId,
    pub error: TransportError,
}

/// Everything that happened during one step.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StepReport {
    /// Step number assigned by the caller; `step_chains` leaves it at 0.
    pub step: u64,
    /// Number of distinct chains discovered.
    pub chains: usize,
    /// Number of node visits, including nodes held back after receiving.
    pub ticks: usize,
    pub events: Vec<TickEvent>,
    pub faults: Vec<ChainFault>,
}

impl StepReport {
    pub fn is_clean(&self) -> bool {
        self.faults.is_empty()
    }

    pub fn moved(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, TickEvent::ItemMoved { .. }))
            .count()
    }

    pub fn consumed(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, TickEvent::ItemConsumed { .. }))
            .count()
    }
}

/// Discover the chains through `nodes` and advance each by one tick.
///
/// `nodes` is the scan order (the grid's cell order); duplicates and handles
/// not in the network are ignored.
pub fn step_chains(
    network: &mut TransportNetwork,
    nodes: impl IntoIterator<Item = NodeId>,
) -> StepReport {
    let mut report = StepReport::default();
    let mut claimed: SecondaryMap<NodeId, ()> = SecondaryMap::new();

    for start in nodes {
        if claimed.contains_key(start) || network.get(start).is_none() {
            continue;
        }
        let chain = network.chain_with(start, &mut claimed);
        if chain.is_empty() {
            continue;
        }
        report.chains += 1;
        tick_chain(network, &chain, &mut report);
    }

    report
}

/// Tick `chain` (head first) from its tail back to its head.
///
/// A node that received an item earlier in this pass is not ticked again.
/// In a straight chain that never happens; in a ring it stops the item that
/// crosses from tail to head from moving twice.
fn tick_chain(network: &mut TransportNetwork, chain: &[NodeId], report: &mut StepReport) {
    let mut received: SecondaryMap<NodeId, ()> = SecondaryMap::new();
    for &node in chain.iter().rev() {
        let Some(id) = network.transport_id(node) else {
            continue;
        };
        report.ticks += 1;
        if received.contains_key(node) {
            continue;
        }
        match network.tick(node) {
            Ok(outcome) => {
                if let TickOutcome::Moved { to, .. }
                | TickOutcome::Produced {
                    pushed_to: Some(to),
                    ..
                } = outcome
                {
                    received.insert(to, ());
                }
                record(network, id, outcome, &mut report.events);
            }
            Err(error) => {
                let head = chain.first().and_then(|&n| network.transport_id(n)).unwrap_or(id);
                let tail = chain.last().and_then(|&n| network.transport_id(n)).unwrap_or(id);
                warn!(%head, %tail, %error, "chain tick aborted");
                report.faults.push(ChainFault { head, tail, error });
                return;
            }
        }
    }
}

fn record(
    network: &TransportNetwork,
    id: TransportId,
    outcome: TickOutcome,
    events: &mut Vec<TickEvent>,
) {
    match outcome {
        TickOutcome::Idle | TickOutcome::Resting => {}
        TickOutcome::Blocked => events.push(TickEvent::Blocked { node: id }),
        TickOutcome::Moved { to, item } => {
            if let Some(to) = network.transport_id(to) {
                debug!(from = %id, %to, %item, "item moved");
                events.push(TickEvent::ItemMoved { from: id, to, item });
            }
        }
        TickOutcome::Produced { pushed_to, item } => {
            if let Some(to) = pushed_to.and_then(|n| network.transport_id(n)) {
                debug!(from = %id, %to, %item, "item moved");
                events.push(TickEvent::ItemMoved {
                    from: id,
                    to,
                    item: item.clone(),
                });
                debug!(node = %id, %item, "item produced");
                events.push(TickEvent::ItemProduced { node: id, item });
            } else {
                events.push(TickEvent::Blocked { node: id });
            }
        }
        TickOutcome::Consumed { item } => {
            debug!(node = %id, %item, "item consumed");
            events.push(TickEvent::ItemConsumed { node: id, item });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::Item;
    use crate::transport::Transport;

    fn item(name: &str) -> Item {
        Item::new(name).unwrap()
    }

    fn belts(net: &mut TransportNetwork, ids: &[u32]) -> Vec<NodeId> {
        ids.iter()
            .map(|&i| net.add(Transport::belt(TransportId(i))).unwrap())
            .collect()
    }

    #[test]
    fn item_moves_one_hop_per_step() {
        let mut net = TransportNetwork::new();
        let nodes = belts(&mut net, &[1, 2, 3, 4]);
        for pair in nodes.windows(2) {
            net.connect(pair[0], pair[1]).unwrap();
        }
        net.set_inventory(nodes[0], Some(item("coal"))).unwrap();

        let coal = item("coal");
        for expected in 1..4 {
            let report = step_chains(&mut net, nodes.clone());
            assert_eq!(report.chains, 1);
            assert_eq!(report.moved(), 1);
            for (i, &n) in nodes.iter().enumerate() {
                let want = if i == expected { Some(&coal) } else { None };
                assert_eq!(net.inventory(n), want, "step {expected}, node {i}");
            }
        }
    }

    #[test]
    fn full_belt_line_moves_in_lockstep() {
        let mut net = TransportNetwork::new();
        let nodes = belts(&mut net, &[1, 2, 3]);
        net.connect(nodes[0], nodes[1]).unwrap();
        net.connect(nodes[1], nodes[2]).unwrap();
        net.set_inventory(nodes[0], Some(item("a"))).unwrap();
        net.set_inventory(nodes[1], Some(item("b"))).unwrap();

        // Tail is empty: b moves to the tail first, then a follows.
        let report = step_chains(&mut net, nodes.clone());
        assert_eq!(report.moved(), 2);
        assert_eq!(net.inventory(nodes[0]), None);
        assert_eq!(net.inventory(nodes[1]), Some(&item("a")));
        assert_eq!(net.inventory(nodes[2]), Some(&item("b")));

        // Tail has nowhere to go; everything is blocked.
        let report = step_chains(&mut net, nodes.clone());
        assert_eq!(report.moved(), 0);
        assert_eq!(report.events.len(), 2);
    }

    #[test]
    fn producer_does_not_skip_the_belt() {
        let mut net = TransportNetwork::new();
        let p = net.add(Transport::producer(TransportId(1), item("iron"))).unwrap();
        let b = net.add(Transport::belt(TransportId(2))).unwrap();
        let r = net.add(Transport::receiver(TransportId(3), item("iron"))).unwrap();
        net.connect(p, b).unwrap();
        net.connect(b, r).unwrap();
        // Receiver starts empty so the only item in the chain is the producer's.
        net.take_slot(r);

        let report = step_chains(&mut net, [p, b, r]);
        assert!(report.is_clean());
        assert_eq!(net.inventory(b), Some(&item("iron")));
        assert_eq!(net.raw_slot(r), None);
    }

    #[test]
    fn each_chain_ticks_once_regardless_of_scan_order() {
        let mut net = TransportNetwork::new();
        let nodes = belts(&mut net, &[1, 2, 3]);
        net.connect(nodes[0], nodes[1]).unwrap();
        net.connect(nodes[1], nodes[2]).unwrap();
        net.set_inventory(nodes[0], Some(item("x"))).unwrap();

        let report = step_chains(&mut net, [nodes[1], nodes[2], nodes[0], nodes[1]]);
        assert_eq!(report.chains, 1);
        assert_eq!(report.ticks, 3);
        assert_eq!(net.inventory(nodes[1]), Some(&item("x")));
    }

    #[test]
    fn fault_is_isolated_to_its_chain() {
        let mut net = TransportNetwork::new();
        // Chain A: belt holding copper -> receiver wanting iron.
        let a1 = net.add(Transport::belt(TransportId(1))).unwrap();
        let a2 = net.add(Transport::receiver(TransportId(2), item("iron"))).unwrap();
        net.connect(a1, a2).unwrap();
        net.take_slot(a2);
        net.set_inventory(a1, Some(item("copper"))).unwrap();
        // Chain B: two belts.
        let b1 = net.add(Transport::belt(TransportId(3))).unwrap();
        let b2 = net.add(Transport::belt(TransportId(4))).unwrap();
        net.connect(b1, b2).unwrap();
        net.set_inventory(b1, Some(item("coal"))).unwrap();

        // Step 1 delivers the copper.
        let report = step_chains(&mut net, [a1, a2, b1, b2]);
        assert!(report.is_clean());
        assert_eq!(report.chains, 2);

        // Step 2: the receiver detects the mismatch; chain B is unaffected.
        let report = step_chains(&mut net, [a1, a2, b1, b2]);
        assert_eq!(report.faults.len(), 1);
        let fault = &report.faults[0];
        assert_eq!(fault.head, TransportId(1));
        assert_eq!(fault.tail, TransportId(2));
        assert!(matches!(fault.error, TransportError::BadState { .. }));
        assert_eq!(net.inventory(b2), Some(&item("coal")));
    }

    #[test]
    fn unknown_handles_are_ignored() {
        let mut other = TransportNetwork::new();
        let stray = other.add(Transport::belt(TransportId(1))).unwrap();
        let mut net = TransportNetwork::new();
        let report = step_chains(&mut net, [stray]);
        assert_eq!(report.chains, 0);
        assert_eq!(report.ticks, 0);
    }

    #[test]
    fn ring_is_ticked_once_per_node() {
        let mut net = TransportNetwork::new();
        let nodes = belts(&mut net, &[1, 2, 3]);
        net.connect(nodes[0], nodes[1]).unwrap();
        net.connect(nodes[1], nodes[2]).unwrap();
        net.connect(nodes[2], nodes[0]).unwrap();
        net.set_inventory(nodes[0], Some(item("loop"))).unwrap();

        let report = step_chains(&mut net, nodes.clone());
        assert_eq!(report.chains, 1);
        assert_eq!(report.ticks, 3);
        assert_eq!(report.moved(), 1);
        assert_eq!(net.inventory(nodes[1]), Some(&item("loop")));
    }
}
