//! Transport nodes: belts, producers and receivers.
//!
//! A node is a plain struct with a closed [`TransportKind`] tag. There are no
//! trait objects; the network matches on the tag when ticking, and the
//! disallowed mutators (a producer's input, a receiver's output) are rejected
//! by matching on the same tag.
//!
//! # Variants
//!
//! - **Belt** -- pass-through. Pushes its item downstream when the next slot
//!   is free.
//! - **Producer** -- seeded with its key item. Every odd tick it pushes and
//!   then refills from the key, so it emits one unit every two ticks.
//! - **Receiver** -- seeded with its key item. Each tick it consumes whatever
//!   arrived; an item that does not match the key is a bad-state fault.

use crate::id::{NodeId, TransportId};
use crate::item::Item;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// A public mutator that some node kinds refuse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LinkAction {
    SetInput,
    SetOutput,
    SetInventory,
}

impl fmt::Display for LinkAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            LinkAction::SetInput => "setting the input link",
            LinkAction::SetOutput => "setting the output link",
            LinkAction::SetInventory => "setting the inventory",
        })
    }
}

/// Errors raised by transport nodes and the network that holds them.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    /// A mutator was called on a node kind that forbids it.
    #[error("{action} is not supported on {kind} {node}")]
    UnsupportedAction {
        node: TransportId,
        kind: NodeKindTag,
        action: LinkAction,
    },
    /// A receiver found an item that does not match its key.
    #[error("receiver {node} expected '{expected}' but holds '{found}'")]
    BadState {
        node: TransportId,
        expected: Item,
        found: Item,
    },
    #[error("node {0} cannot link to itself")]
    SelfLink(TransportId),
    #[error("transport id {0} is already in use")]
    DuplicateId(TransportId),
    #[error("node not found: {0:?}")]
    NodeNotFound(NodeId),
}

// ---------------------------------------------------------------------------
// Kinds
// ---------------------------------------------------------------------------

/// Variant-specific state of a transport node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportKind {
    Belt,
    Producer {
        key: Item,
        /// Number of ticks seen so far. Odd counts emit.
        counter: u64,
    },
    Receiver {
        key: Item,
    },
}

/// The variant of a node without its payload. Cheap to copy into grid cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeKindTag {
    Belt,
    Producer,
    Receiver,
}

impl NodeKindTag {
    /// Single-character code used by the save format and renderers.
    pub fn encoding(self) -> &'static str {
        match self {
            NodeKindTag::Belt => "b",
            NodeKindTag::Producer => "p",
            NodeKindTag::Receiver => "r",
        }
    }
}

impl fmt::Display for NodeKindTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            NodeKindTag::Belt => "Belt",
            NodeKindTag::Producer => "Producer",
            NodeKindTag::Receiver => "Receiver",
        })
    }
}

impl TransportKind {
    pub fn tag(&self) -> NodeKindTag {
        match self {
            TransportKind::Belt => NodeKindTag::Belt,
            TransportKind::Producer { .. } => NodeKindTag::Producer,
            TransportKind::Receiver { .. } => NodeKindTag::Receiver,
        }
    }
}

// ---------------------------------------------------------------------------
// Path
// ---------------------------------------------------------------------------

/// A node's position in its chain: handles of the upstream and downstream
/// neighbours. Owned by exactly one [`Transport`]; only the links change.
///
/// Two paths are equal when they belong to the same node, whatever their
/// links. The owner is stamped when the node is added to a network; until
/// then it is the null key.
#[derive(Debug, Clone, Copy, Default)]
pub struct Path {
    pub(crate) node: NodeId,
    pub(crate) previous: Option<NodeId>,
    pub(crate) next: Option<NodeId>,
}

impl PartialEq for Path {
    fn eq(&self, other: &Self) -> bool {
        self.node == other.node
    }
}

impl Eq for Path {}

impl Hash for Path {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.node.hash(state);
    }
}

impl Path {
    /// The node this path belongs to.
    pub fn node(&self) -> NodeId {
        self.node
    }

    pub fn previous(&self) -> Option<NodeId> {
        self.previous
    }

    pub fn next(&self) -> Option<NodeId> {
        self.next
    }
}

// ---------------------------------------------------------------------------
// Transport
// ---------------------------------------------------------------------------

/// A transport node: save-format id, one inventory slot, its [`Path`] links
/// and the variant tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transport {
    id: TransportId,
    pub(crate) kind: TransportKind,
    /// Raw slot. Receivers hide it from external readers.
    pub(crate) slot: Option<Item>,
    pub(crate) path: Path,
}

impl Transport {
    pub fn belt(id: TransportId) -> Self {
        Self {
            id,
            kind: TransportKind::Belt,
            slot: None,
            path: Path::default(),
        }
    }

    /// A producer, seeded with its key as inventory.
    pub fn producer(id: TransportId, key: Item) -> Self {
        Self {
            id,
            slot: Some(key.clone()),
            kind: TransportKind::Producer { key, counter: 0 },
            path: Path::default(),
        }
    }

    /// A receiver, seeded with its key as inventory.
    pub fn receiver(id: TransportId, key: Item) -> Self {
        Self {
            id,
            slot: Some(key.clone()),
            kind: TransportKind::Receiver { key },
            path: Path::default(),
        }
    }

    pub fn id(&self) -> TransportId {
        self.id
    }

    pub fn kind(&self) -> &TransportKind {
        &self.kind
    }

    pub fn tag(&self) -> NodeKindTag {
        self.kind.tag()
    }

    /// The container key for producers and receivers.
    pub fn key(&self) -> Option<&Item> {
        match &self.kind {
            TransportKind::Belt => None,
            TransportKind::Producer { key, .. } | TransportKind::Receiver { key } => Some(key),
        }
    }

    /// The inventory as seen from outside. Receivers always report empty.
    pub fn inventory(&self) -> Option<&Item> {
        match self.kind {
            TransportKind::Receiver { .. } => None,
            _ => self.slot.as_ref(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The upstream neighbour.
    pub fn input(&self) -> Option<NodeId> {
        self.path.previous
    }

    /// The downstream neighbour.
    pub fn output(&self) -> Option<NodeId> {
        self.path.next
    }

    pub(crate) fn unsupported(&self, action: LinkAction) -> TransportError {
        TransportError::UnsupportedAction {
            node: self.id,
            kind: self.tag(),
            action,
        }
    }
}

impl fmt::Display for Transport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}-{}>", self.tag(), self.id)
    }
}

// ---------------------------------------------------------------------------
// Tick outcome
// ---------------------------------------------------------------------------

/// What a single node did during one tick.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    /// Nothing held, nothing to do.
    Idle,
    /// Holding an item but no free downstream slot (or no downstream).
    Blocked,
    /// The held item moved to the downstream node.
    Moved { to: NodeId, item: Item },
    /// A producer's emitting tick. `pushed_to` is the node that received the
    /// previous unit, if the push succeeded; the slot is refilled either way.
    Produced {
        pushed_to: Option<NodeId>,
        item: Item,
    },
    /// A producer's off tick.
    Resting,
    /// A receiver consumed a matching item.
    Consumed { item: Item },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(name: &str) -> Item {
        Item::new(name).unwrap()
    }

    #[test]
    fn containers_are_seeded_with_key() {
        let p = Transport::producer(TransportId(1), item("iron"));
        assert_eq!(p.inventory(), Some(&item("iron")));
        assert_eq!(p.key(), Some(&item("iron")));

        let r = Transport::receiver(TransportId(2), item("iron"));
        assert_eq!(r.slot, Some(item("iron")));
        assert_eq!(r.key(), Some(&item("iron")));
    }

    #[test]
    fn receiver_reports_empty_inventory() {
        let r = Transport::receiver(TransportId(2), item("iron"));
        assert_eq!(r.inventory(), None);
    }

    #[test]
    fn belt_starts_empty_and_unlinked() {
        let b = Transport::belt(TransportId(3));
        assert_eq!(b.inventory(), None);
        assert_eq!(b.key(), None);
        assert_eq!(b.input(), None);
        assert_eq!(b.output(), None);
    }

    #[test]
    fn encodings() {
        assert_eq!(NodeKindTag::Belt.encoding(), "b");
        assert_eq!(NodeKindTag::Producer.encoding(), "p");
        assert_eq!(NodeKindTag::Receiver.encoding(), "r");
    }

    #[test]
    fn display_names_kind_and_id() {
        let b = Transport::belt(TransportId(4));
        assert_eq!(b.to_string(), "<Belt-4>");
        let p = Transport::producer(TransportId(1), item("iron"));
        assert_eq!(p.to_string(), "<Producer-1>");
    }

    #[test]
    fn unsupported_action_message() {
        let p = Transport::producer(TransportId(1), item("iron"));
        let err = p.unsupported(LinkAction::SetInventory);
        assert_eq!(
            err.to_string(),
            "setting the inventory is not supported on Producer 1"
        );
    }
}
