//! Events recorded while stepping chains.
//!
//! Events are plain data collected into a [`StepReport`]; collaborators such
//! as renderers or the headless runner read them after the step. They carry
//! save-format ids so they stay meaningful outside the arena.
//!
//! [`StepReport`]: crate::chain::StepReport

use crate::id::TransportId;
use crate::item::Item;
use serde::{Deserialize, Serialize};

/// Something observable that happened to a node during a step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TickEvent {
    /// An item moved one hop downstream.
    ItemMoved {
        from: TransportId,
        to: TransportId,
        item: Item,
    },
    /// A producer emitted a unit and refilled from its key.
    ItemProduced { node: TransportId, item: Item },
    /// A receiver consumed a matching item.
    ItemConsumed { node: TransportId, item: Item },
    /// A node held an item it could not push.
    Blocked { node: TransportId },
}

impl TickEvent {
    /// The node the event is about (the source for moves).
    pub fn node(&self) -> TransportId {
        match self {
            TickEvent::ItemMoved { from, .. } => *from,
            TickEvent::ItemProduced { node, .. }
            | TickEvent::ItemConsumed { node, .. }
            | TickEvent::Blocked { node } => *node,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn node_of_each_event() {
        let iron = Item::new("iron").unwrap();
        let moved = TickEvent::ItemMoved {
            from: TransportId(1),
            to: TransportId(2),
            item: iron.clone(),
        };
        assert_eq!(moved.node(), TransportId(1));
        assert_eq!(
            TickEvent::ItemConsumed { node: TransportId(5), item: iron }.node(),
            TransportId(5)
        );
        assert_eq!(TickEvent::Blocked { node: TransportId(3) }.node(), TransportId(3));
    }
}
