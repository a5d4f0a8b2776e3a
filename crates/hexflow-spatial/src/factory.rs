//! A populated factory: the grid plus the network its transport cells point
//! into, advanced one step at a time.

use crate::coord::Coordinate;
use crate::grid::{Cell, GridError, HexGrid, NodeRef};
use hexflow_core::{
    Item, NodeId, NodeKindTag, StepReport, Transport, TransportError, TransportId,
    TransportNetwork, step_chains,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FactoryError {
    #[error(transparent)]
    Grid(#[from] GridError),
    #[error(transparent)]
    Transport(#[from] TransportError),
}

// ---------------------------------------------------------------------------
// Snapshots
// ---------------------------------------------------------------------------

/// Serializable view of one placed node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeSnapshot {
    pub id: TransportId,
    pub kind: NodeKindTag,
    pub coord: Coordinate,
    pub inventory: Option<Item>,
    pub input: Option<TransportId>,
    pub output: Option<TransportId>,
}

/// Serializable view of the whole factory after some number of steps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FactorySnapshot {
    pub step: u64,
    pub range: i32,
    pub rows: Vec<String>,
    pub nodes: Vec<NodeSnapshot>,
}

// ---------------------------------------------------------------------------
// Factory
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Factory {
    grid: HexGrid,
    network: TransportNetwork,
    steps_run: u64,
}

impl Factory {
    /// An empty factory: every cell a placeholder, no nodes.
    pub fn new(range: i32) -> Result<Self, GridError> {
        Ok(Self {
            grid: HexGrid::new(range)?,
            network: TransportNetwork::new(),
            steps_run: 0,
        })
    }

    pub fn grid(&self) -> &HexGrid {
        &self.grid
    }

    pub fn network(&self) -> &TransportNetwork {
        &self.network
    }

    /// Mutable access for wiring. Cells keep their handles; only links and
    /// inventories should change through this.
    pub fn network_mut(&mut self) -> &mut TransportNetwork {
        &mut self.network
    }

    pub fn steps_run(&self) -> u64 {
        self.steps_run
    }

    /// Set a non-transport cell.
    pub fn set_cell(&mut self, coord: Coordinate, cell: Cell) -> Result<(), GridError> {
        self.grid.set(coord, cell)?;
        Ok(())
    }

    /// Add `transport` to the network and place it at `coord`.
    ///
    /// The coordinate is checked first so a failed placement never leaves an
    /// orphan node behind.
    pub fn place(
        &mut self,
        coord: Coordinate,
        transport: Transport,
    ) -> Result<NodeId, FactoryError> {
        if !self.grid.contains(coord) {
            return Err(GridError::OutOfBounds {
                coord,
                range: self.grid.range(),
            }
            .into());
        }
        let kind = transport.tag();
        let node = self.network.add(transport)?;
        self.grid.set(coord, Cell::Transport(NodeRef { node, kind }))?;
        Ok(node)
    }

    /// Where `node` sits on the grid.
    pub fn locate(&self, node: NodeId) -> Option<Coordinate> {
        self.grid
            .iter()
            .find(|(_, cell)| cell.node() == Some(node))
            .map(|(c, _)| c)
    }

    /// Node at `coord`, if the cell holds one.
    pub fn node_at(&self, coord: Coordinate) -> Option<NodeId> {
        self.grid.cell(coord).and_then(Cell::node)
    }

    /// Advance every chain on the grid by one tick.
    pub fn step(&mut self) -> StepReport {
        let mut report = step_chains(&mut self.network, self.grid.transport_nodes());
        self.steps_run += 1;
        report.step = self.steps_run;
        debug!(
            step = report.step,
            chains = report.chains,
            moved = report.moved(),
            consumed = report.consumed(),
            faults = report.faults.len(),
            "step complete"
        );
        report
    }

    /// Run `steps` steps, returning each report.
    pub fn run(&mut self, steps: u64) -> Vec<StepReport> {
        (0..steps).map(|_| self.step()).collect()
    }

    pub fn render_rows(&self) -> Vec<String> {
        self.grid.render_rows()
    }

    pub fn snapshot(&self) -> FactorySnapshot {
        let nodes = self
            .grid
            .iter()
            .filter_map(|(coord, cell)| match cell {
                Cell::Transport(r) => {
                    let t = self.network.get(r.node)?;
                    Some(NodeSnapshot {
                        id: t.id(),
                        kind: r.kind,
                        coord,
                        inventory: t.inventory().cloned(),
                        input: t.input().and_then(|n| self.network.transport_id(n)),
                        output: t.output().and_then(|n| self.network.transport_id(n)),
                    })
                }
                _ => None,
            })
            .collect();
        FactorySnapshot {
            step: self.steps_run,
            range: self.grid.range(),
            rows: self.render_rows(),
            nodes,
        }
    }

    /// Count of cells still holding their placeholder.
    pub fn unassigned_cells(&self) -> usize {
        self.grid
            .iter()
            .filter(|(_, c)| matches!(c, Cell::Placeholder))
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hexflow_core::test_utils::{iron, item};

    fn line_factory(expect: Item) -> (Factory, [NodeId; 3]) {
        let mut f = Factory::new(1).unwrap();
        let p = f
            .place(Coordinate::new(-1, 0, 1), Transport::producer(TransportId(1), iron()))
            .unwrap();
        let b = f
            .place(Coordinate::ORIGIN, Transport::belt(TransportId(2)))
            .unwrap();
        let r = f
            .place(Coordinate::new(1, 0, -1), Transport::receiver(TransportId(3), expect))
            .unwrap();
        f.network_mut().connect(p, b).unwrap();
        f.network_mut().connect(b, r).unwrap();
        (f, [p, b, r])
    }

    #[test]
    fn place_rejects_out_of_bounds_without_orphans() {
        let mut f = Factory::new(1).unwrap();
        let err = f
            .place(Coordinate::new(3, -3, 0), Transport::belt(TransportId(1)))
            .unwrap_err();
        assert!(matches!(err, FactoryError::Grid(GridError::OutOfBounds { .. })));
        assert!(f.network().is_empty());
    }

    #[test]
    fn place_rejects_duplicate_ids() {
        let mut f = Factory::new(1).unwrap();
        f.place(Coordinate::ORIGIN, Transport::belt(TransportId(1)))
            .unwrap();
        let err = f
            .place(Coordinate::new(1, 0, -1), Transport::belt(TransportId(1)))
            .unwrap_err();
        assert_eq!(
            err,
            FactoryError::Transport(TransportError::DuplicateId(TransportId(1)))
        );
    }

    #[test]
    fn step_counts_and_delivers() {
        let (mut f, [_, b, r]) = line_factory(iron());
        let first = f.step();
        assert_eq!(first.step, 1);
        assert!(first.is_clean());
        // Receiver consumed its seed; producer pushed onto the belt.
        assert_eq!(first.consumed(), 1);
        assert_eq!(f.network().inventory(b), Some(&iron()));

        let second = f.step();
        assert_eq!(second.step, 2);
        assert_eq!(f.network().inventory(b), None);
        assert_eq!(f.network().raw_slot(r), Some(&iron()));
        assert_eq!(f.steps_run(), 2);
    }

    #[test]
    fn mismatch_faults_on_the_following_step() {
        let (mut f, _) = line_factory(item("copper"));
        let reports = f.run(3);
        assert!(reports[0].is_clean());
        assert!(reports[1].is_clean());
        assert_eq!(reports[2].faults.len(), 1);
        assert_eq!(reports[2].faults[0].tail, TransportId(3));
    }

    #[test]
    fn locate_and_node_at() {
        let (f, [p, _, _]) = line_factory(iron());
        assert_eq!(f.locate(p), Some(Coordinate::new(-1, 0, 1)));
        assert_eq!(f.node_at(Coordinate::new(-1, 0, 1)), Some(p));
        assert_eq!(f.node_at(Coordinate::new(0, -1, 1)), None);
    }

    #[test]
    fn snapshot_lists_placed_nodes() {
        let (f, _) = line_factory(iron());
        let snap = f.snapshot();
        assert_eq!(snap.range, 1);
        assert_eq!(snap.rows[1], "p b r");
        assert_eq!(snap.nodes.len(), 3);
        let belt = snap.nodes.iter().find(|n| n.id == TransportId(2)).unwrap();
        assert_eq!(belt.input, Some(TransportId(1)));
        assert_eq!(belt.output, Some(TransportId(3)));
        assert_eq!(f.unassigned_cells(), 4);
    }

    #[test]
    fn snapshot_serializes_to_json() {
        let (mut f, _) = line_factory(iron());
        f.step();
        let json = serde_json::to_string(&f.snapshot()).unwrap();
        assert!(json.contains("\"step\":1"));
        let back: FactorySnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(back, f.snapshot());
    }
}
