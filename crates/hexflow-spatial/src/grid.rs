//! Hex-disk grid store.
//!
//! A [`HexGrid`] of range `n` holds every cube coordinate within distance
//! `n` of the origin, `3n² + 3n + 1` cells in all. Cells are materialised
//! eagerly as [`Cell::Placeholder`] and overwritten in place; nothing outside
//! the disk is ever stored.

use crate::coord::Coordinate;
use hexflow_core::{NodeId, NodeKindTag};
use serde::{Deserialize, Serialize};
use slotmap::SecondaryMap;
use std::collections::BTreeMap;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GridError {
    #[error("grid range must be positive, got {0}")]
    InvalidRange(i32),
    #[error("{coord} lies outside a grid of range {range}")]
    OutOfBounds { coord: Coordinate, range: i32 },
}

// ---------------------------------------------------------------------------
// Cells
// ---------------------------------------------------------------------------

/// Anything that can sit in a grid cell.
pub trait GridComponent {
    /// Short code shared by renderers and the save format.
    fn encoding(&self) -> &'static str;
}

/// A transport node placed on the grid. The tag is copied in so encoding
/// needs no arena lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeRef {
    pub node: NodeId,
    pub kind: NodeKindTag,
}

impl GridComponent for NodeRef {
    fn encoding(&self) -> &'static str {
        self.kind.encoding()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Cell {
    /// Not yet assigned by the loader.
    #[default]
    Placeholder,
    Empty,
    Wall,
    Transport(NodeRef),
}

impl Cell {
    pub fn node(&self) -> Option<NodeId> {
        match self {
            Cell::Transport(r) => Some(r.node),
            _ => None,
        }
    }
}

impl GridComponent for Cell {
    fn encoding(&self) -> &'static str {
        match self {
            Cell::Placeholder => "ERROR",
            Cell::Empty => "o",
            Cell::Wall => "w",
            Cell::Transport(r) => r.encoding(),
        }
    }
}

// ---------------------------------------------------------------------------
// Row walk
// ---------------------------------------------------------------------------

/// One display row of the walk: its leftmost cell and how many cells it has.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WalkRow {
    pub start: Coordinate,
    pub len: usize,
}

impl WalkRow {
    /// The row's cells, left to right.
    pub fn cells(self) -> impl Iterator<Item = Coordinate> {
        let Coordinate { q, r, s } = self.start;
        (0..self.len as i64).map(move |k| Coordinate {
            q: (i64::from(q) + k) as i32,
            r,
            s: (i64::from(s) - k) as i32,
        })
    }
}

/// The disk as display rows, top to bottom, each row left to right.
///
/// The upper `range` rows start at `range` steps top-left of the origin and
/// each following row starts one step bottom-left. The lower `range + 1`
/// rows start at the left end of the middle row and each following row
/// starts one step bottom-right. Upper row `i` has `range + 1 + i` cells;
/// lower row `j` has `2 * range + 1 - j`.
///
/// Rows are computed on demand, so walking the first rows of a huge disk
/// costs nothing for the rest.
#[derive(Debug, Clone)]
pub struct RowWalk {
    range: i32,
    row: usize,
}

impl RowWalk {
    pub fn new(range: i32) -> Self {
        Self {
            range: range.max(0),
            row: 0,
        }
    }

    fn rows(&self) -> usize {
        2 * self.range as usize + 1
    }
}

impl Iterator for RowWalk {
    type Item = WalkRow;

    fn next(&mut self) -> Option<WalkRow> {
        if self.row >= self.rows() {
            return None;
        }
        let range = self.range as usize;
        let index = self.row;
        self.row += 1;

        // Indices below `range` fit in i32 since `range` does.
        let row = if index < range {
            let i = index as i32;
            WalkRow {
                start: Coordinate::new(-i, i - self.range, self.range),
                len: range + 1 + index,
            }
        } else {
            let j = (index - range) as i32;
            WalkRow {
                start: Coordinate::new(-self.range, j, self.range - j),
                len: 2 * range + 1 - (index - range),
            }
        };
        Some(row)
    }

    fn nth(&mut self, n: usize) -> Option<WalkRow> {
        self.row = self.row.saturating_add(n).min(self.rows());
        self.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = self.rows() - self.row;
        (left, Some(left))
    }
}

impl ExactSizeIterator for RowWalk {}

/// [`RowWalk`] collected into coordinates.
pub fn row_walk(range: i32) -> Vec<Vec<Coordinate>> {
    RowWalk::new(range).map(|row| row.cells().collect()).collect()
}

// ---------------------------------------------------------------------------
// HexGrid
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HexGrid {
    range: i32,
    cells: BTreeMap<Coordinate, Cell>,
}

impl HexGrid {
    /// Materialise every cell of the disk as a placeholder.
    pub fn new(range: i32) -> Result<Self, GridError> {
        if range <= 0 {
            return Err(GridError::InvalidRange(range));
        }
        let mut cells = BTreeMap::new();
        for q in -range..=range {
            for r in -range..=range {
                let s = -q - r;
                if s.abs() <= range {
                    cells.insert(Coordinate::new(q, r, s), Cell::Placeholder);
                }
            }
        }
        Ok(Self { range, cells })
    }

    pub fn range(&self) -> i32 {
        self.range
    }

    /// Cells along one axis of the disk.
    pub fn axis_size(&self) -> i32 {
        2 * self.range + 1
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn contains(&self, coord: Coordinate) -> bool {
        self.cells.contains_key(&coord)
    }

    /// Owned snapshot of every cell. Node handles still point into the live
    /// network.
    pub fn get(&self) -> BTreeMap<Coordinate, Cell> {
        self.cells.clone()
    }

    pub fn cell(&self, coord: Coordinate) -> Option<&Cell> {
        self.cells.get(&coord)
    }

    /// Overwrite the cell at `coord`, returning what was there.
    pub fn set(&mut self, coord: Coordinate, cell: Cell) -> Result<Cell, GridError> {
        match self.cells.get_mut(&coord) {
            Some(slot) => Ok(std::mem::replace(slot, cell)),
            None => Err(GridError::OutOfBounds {
                coord,
                range: self.range,
            }),
        }
    }

    /// Cells in scan order.
    pub fn iter(&self) -> impl Iterator<Item = (Coordinate, &Cell)> {
        self.cells.iter().map(|(c, cell)| (*c, cell))
    }

    /// Distinct transport nodes in scan order.
    pub fn transport_nodes(&self) -> Vec<NodeId> {
        let mut seen: SecondaryMap<NodeId, ()> = SecondaryMap::new();
        let mut nodes = Vec::new();
        for node in self.cells.values().filter_map(Cell::node) {
            if seen.insert(node, ()).is_none() {
                nodes.push(node);
            }
        }
        nodes
    }

    pub fn row_walk(&self) -> Vec<Vec<Coordinate>> {
        row_walk(self.range)
    }

    /// Encoded rows in walk order, cells separated by spaces.
    pub fn render_rows(&self) -> Vec<String> {
        self.row_walk()
            .iter()
            .map(|row| {
                row.iter()
                    .map(|c| self.cell(*c).map_or("ERROR", |cell| cell.encoding()))
                    .collect::<Vec<_>>()
                    .join(" ")
            })
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
