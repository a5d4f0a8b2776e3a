//! Hexflow Core -- the transport-chain state machine for hex factory puzzles.
//!
//! This crate owns everything that moves items: the item value type, the
//! transport nodes (belts, producers, receivers), the arena that links them
//! into chains, and the chain stepper that advances every chain by one tick.
//! It knows nothing about the hex grid; `hexflow-spatial` places nodes and
//! feeds them back in grid order.
//!
//! # Tick Order
//!
//! Each call to [`chain::step_chains`] discovers every maximal chain reachable
//! from the given nodes and ticks it from **tail to head**, so a downstream
//! node empties before its upstream neighbour tries to push into it. An item
//! therefore advances at most one hop per step.
//!
//! # Key Types
//!
//! - [`network::TransportNetwork`] -- SlotMap arena of transport nodes. Path
//!   links are `Option<NodeId>` handles, never references.
//! - [`transport::Transport`] -- a node: save-format id, inventory slot, path
//!   links and a [`transport::TransportKind`] tag.
//! - [`item::Item`] -- immutable named item, equal by name.
//! - [`chain::StepReport`] -- events and per-chain faults from one step.

pub mod chain;
pub mod event;
pub mod id;
pub mod item;
pub mod network;
pub mod transport;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use chain::{ChainFault, StepReport, step_chains};
pub use event::TickEvent;
pub use id::{NodeId, TransportId};
pub use item::{Item, ItemError};
pub use network::TransportNetwork;
pub use transport::{
    LinkAction, NodeKindTag, Path, TickOutcome, Transport, TransportError, TransportKind,
};
