//! Cube coordinates on a hexagonal grid.
//!
//! A [`Coordinate`] is a `(q, r, s)` triple with `q + r + s == 0`. The six
//! [`Orientation`]s are the unit offsets between neighbouring cells.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Sub};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CoordError {
    #[error("({q}, {r}, {s}) is not a cube coordinate: components must sum to zero")]
    NotOnPlane { q: i32, r: i32, s: i32 },
    #[error("no single direction leads from {from} to {to}")]
    NoDirection { from: Coordinate, to: Coordinate },
}

// ---------------------------------------------------------------------------
// Orientation
// ---------------------------------------------------------------------------

/// One of the six hex directions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Orientation {
    TopLeft,
    TopRight,
    Right,
    BottomRight,
    BottomLeft,
    Left,
}

impl Orientation {
    /// All six directions, clockwise from top-left.
    pub const ALL: [Orientation; 6] = [
        Orientation::TopLeft,
        Orientation::TopRight,
        Orientation::Right,
        Orientation::BottomRight,
        Orientation::BottomLeft,
        Orientation::Left,
    ];

    /// The unit vector for this direction.
    pub fn offset(self) -> Coordinate {
        match self {
            Orientation::TopLeft => Coordinate::new(0, -1, 1),
            Orientation::TopRight => Coordinate::new(1, -1, 0),
            Orientation::Right => Coordinate::new(1, 0, -1),
            Orientation::BottomRight => Coordinate::new(0, 1, -1),
            Orientation::BottomLeft => Coordinate::new(-1, 1, 0),
            Orientation::Left => Coordinate::new(-1, 0, 1),
        }
    }

    pub fn opposite(self) -> Self {
        match self {
            Orientation::TopLeft => Orientation::BottomRight,
            Orientation::TopRight => Orientation::BottomLeft,
            Orientation::Right => Orientation::Left,
            Orientation::BottomRight => Orientation::TopLeft,
            Orientation::BottomLeft => Orientation::TopRight,
            Orientation::Left => Orientation::Right,
        }
    }
}

// ---------------------------------------------------------------------------
// Coordinate
// ---------------------------------------------------------------------------

/// A cell position in cube coordinates.
///
/// Ordering is lexicographic on `(q, r, s)`, which is also the grid's scan
/// order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Coordinate {
    pub q: i32,
    pub r: i32,
    pub s: i32,
}

impl Coordinate {
    pub const ORIGIN: Coordinate = Coordinate { q: 0, r: 0, s: 0 };

    /// Build from all three components. The caller keeps `q + r + s == 0`;
    /// use [`Coordinate::try_new`] for unchecked input.
    pub const fn new(q: i32, r: i32, s: i32) -> Self {
        Self { q, r, s }
    }

    /// Build from axial `(q, r)`, deriving `s = -q - r`.
    pub const fn from_axial(q: i32, r: i32) -> Self {
        Self { q, r, s: -q - r }
    }

    pub fn try_new(q: i32, r: i32, s: i32) -> Result<Self, CoordError> {
        if q + r + s != 0 {
            return Err(CoordError::NotOnPlane { q, r, s });
        }
        Ok(Self { q, r, s })
    }

    pub fn neighbor(self, direction: Orientation) -> Self {
        self + direction.offset()
    }

    /// All six neighbours, in [`Orientation::ALL`] order.
    pub fn neighbors(self) -> [Coordinate; 6] {
        Orientation::ALL.map(|d| self.neighbor(d))
    }

    pub fn is_neighbor(self, other: Coordinate) -> bool {
        let diff = other - self;
        Orientation::ALL.iter().any(|d| d.offset() == diff)
    }

    /// The direction that points from `self` towards `target`.
    ///
    /// Each component of the difference is reduced to its sign; the result
    /// must match exactly one unit vector. Targets along a straight hex line
    /// resolve, as do direct neighbours. Anything else, including `self`, is
    /// [`CoordError::NoDirection`].
    pub fn direction_to(self, target: Coordinate) -> Result<Orientation, CoordError> {
        let diff = target - self;
        let unit = Coordinate::new(
            diff.q / diff.q.abs().max(1),
            diff.r / diff.r.abs().max(1),
            diff.s / diff.s.abs().max(1),
        );
        let mut matches = Orientation::ALL.iter().filter(|d| d.offset() == unit);
        match (matches.next(), matches.next()) {
            (Some(&d), None) => Ok(d),
            _ => Err(CoordError::NoDirection {
                from: self,
                to: target,
            }),
        }
    }

    /// Hex distance (number of steps) to `other`.
    pub fn distance(self, other: Coordinate) -> u32 {
        let d = other - self;
        d.q.unsigned_abs()
            .max(d.r.unsigned_abs())
            .max(d.s.unsigned_abs())
    }
}

impl Add for Coordinate {
    type Output = Coordinate;

    fn add(self, rhs: Coordinate) -> Coordinate {
        Coordinate::new(self.q + rhs.q, self.r + rhs.r, self.s + rhs.s)
    }
}

impl Sub for Coordinate {
    type Output = Coordinate;

    fn sub(self, rhs: Coordinate) -> Coordinate {
        Coordinate::new(self.q - rhs.q, self.r - rhs.r, self.s - rhs.s)
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.q, self.r, self.s)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
