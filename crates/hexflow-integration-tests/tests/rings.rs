//! Integration test: Belt rings and unplaced nodes
//!
//! Six belts around the centre wall of a range-1 disk form a closed ring.
//! Rings have no head or tail; stepping must still move every item exactly
//! one hop and terminate.

use hexflow_core::test_utils::{add_belt, item};
use hexflow_core::{NodeId, TickEvent, TransportId};
use hexflow_data::load_str;
use hexflow_spatial::Factory;

const RING: &str = "\
1
_____
0
0
_____
_____
_____
b b
b w b
b b
_____
1-3,2
2-1,4
4-2,6
6-4,5
5-6,3
3-5,1
";

/// Clockwise order of belt ids starting at the top left.
const CLOCKWISE: [u32; 6] = [1, 2, 4, 6, 5, 3];

fn ring() -> Factory {
    load_str(RING).unwrap()
}

fn node(f: &Factory, id: u32) -> NodeId {
    f.network().lookup(TransportId(id)).unwrap()
}

fn loaded(f: &Factory) -> Vec<u32> {
    CLOCKWISE
        .iter()
        .copied()
        .filter(|&id| f.network().inventory(node(f, id)).is_some())
        .collect()
}

#[test]
fn ring_cells_are_neighbours() {
    let f = ring();
    for i in 0..CLOCKWISE.len() {
        let a = f.locate(node(&f, CLOCKWISE[i])).unwrap();
        let b = f.locate(node(&f, CLOCKWISE[(i + 1) % 6])).unwrap();
        assert!(a.is_neighbor(b), "{a} -> {b}");
    }
}

#[test]
fn single_item_goes_round_once_in_six_steps() {
    let mut f = ring();
    let start = node(&f, 1);
    f.network_mut().set_inventory(start, Some(item("ore"))).unwrap();

    for (step, &expected) in CLOCKWISE.iter().cycle().skip(1).take(6).enumerate() {
        let report = f.step();
        assert_eq!(report.chains, 1);
        assert_eq!(report.moved(), 1, "step {}", step + 1);
        assert_eq!(loaded(&f), vec![expected], "step {}", step + 1);
    }
}

#[test]
fn every_ring_node_ticks_once_per_step() {
    let mut f = ring();
    let report = f.step();
    assert_eq!(report.chains, 1);
    assert_eq!(report.ticks, 6);
}

#[test]
fn full_ring_is_gridlocked() {
    let mut f = ring();
    for id in CLOCKWISE {
        let n = node(&f, id);
        f.network_mut().set_inventory(n, Some(item("ore"))).unwrap();
    }
    let report = f.step();
    assert_eq!(report.moved(), 0);
    let blocked = report
        .events
        .iter()
        .filter(|e| matches!(e, TickEvent::Blocked { .. }))
        .count();
    assert_eq!(blocked, 6);
}

#[test]
fn unplaced_nodes_are_not_stepped() {
    let mut f = ring();
    let stray = add_belt(f.network_mut(), 100);
    let next = add_belt(f.network_mut(), 101);
    f.network_mut().connect(stray, next).unwrap();
    f.network_mut().set_inventory(stray, Some(item("ore"))).unwrap();

    let report = f.step();
    assert_eq!(report.chains, 1);
    assert_eq!(f.network().inventory(stray), Some(&item("ore")));
    assert_eq!(f.network().inventory(next), None);
}
