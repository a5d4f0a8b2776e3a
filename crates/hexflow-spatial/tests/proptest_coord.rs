//! Property-based tests for coordinates and the grid store.

use hexflow_spatial::{Coordinate, HexGrid, Orientation};
use proptest::prelude::*;

// ===========================================================================
// Generators
// ===========================================================================

fn arb_coord() -> impl Strategy<Value = Coordinate> {
    (-50i32..=50, -50i32..=50).prop_map(|(q, r)| Coordinate::from_axial(q, r))
}

fn arb_orientation() -> impl Strategy<Value = Orientation> {
    proptest::sample::select(Orientation::ALL.to_vec())
}

// ===========================================================================
// Properties
// ===========================================================================

proptest! {
    #[test]
    fn disk_size_matches_formula(range in 1i32..=12) {
        let grid = HexGrid::new(range).unwrap();
        let expected = (3 * range * range + 3 * range + 1) as usize;
        prop_assert_eq!(grid.len(), expected);
        prop_assert!(grid.iter().all(|(c, _)| Coordinate::ORIGIN.distance(c) <= range as u32));
    }

    #[test]
    fn is_neighbor_is_symmetric(a in arb_coord(), b in arb_coord()) {
        prop_assert_eq!(a.is_neighbor(b), b.is_neighbor(a));
    }

    #[test]
    fn neighbor_direction_round_trip(c in arb_coord(), d in arb_orientation()) {
        let n = c.neighbor(d);
        prop_assert!(c.is_neighbor(n));
        prop_assert_eq!(c.direction_to(n), Ok(d));
        prop_assert_eq!(c.neighbor(c.direction_to(n).unwrap()), n);
        prop_assert_eq!(n.direction_to(c), Ok(d.opposite()));
    }

    #[test]
    fn direction_holds_along_a_straight_line(
        c in arb_coord(),
        d in arb_orientation(),
        steps in 1usize..20,
    ) {
        let mut far = c;
        for _ in 0..steps {
            far = far.neighbor(d);
        }
        prop_assert_eq!(c.direction_to(far), Ok(d));
        prop_assert_eq!(c.distance(far), steps as u32);
    }

    #[test]
    fn coordinates_stay_on_the_plane(c in arb_coord(), d in arb_orientation()) {
        let n = c.neighbor(d);
        prop_assert_eq!(n.q + n.r + n.s, 0);
    }
}
