//! Hexflow Spatial -- hex coordinates, the grid store and the factory that
//! ties the grid to a transport network.
//!
//! Coordinates are cube triples `(q, r, s)` with `q + r + s == 0`. A
//! [`grid::HexGrid`] holds every coordinate of a hex disk in scan order
//! (lexicographic on the triple); that order is what [`factory::Factory::step`]
//! hands to the chain stepper.

pub mod coord;
pub mod factory;
pub mod grid;

pub use coord::{CoordError, Coordinate, Orientation};
pub use factory::{Factory, FactoryError, FactorySnapshot, NodeSnapshot};
pub use grid::{Cell, GridComponent, GridError, HexGrid, NodeRef, RowWalk, WalkRow, row_walk};
