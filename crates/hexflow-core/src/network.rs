use crate::id::{NodeId, TransportId};
use crate::item::Item;
use crate::transport::{
    LinkAction, NodeKindTag, TickOutcome, Transport, TransportError, TransportKind,
};
use slotmap::{SecondaryMap, SlotMap};
use std::collections::BTreeMap;

// ---------------------------------------------------------------------------
// TransportNetwork
// ---------------------------------------------------------------------------

/// Arena of transport nodes linked into chains.
///
/// Nodes are addressed by [`NodeId`] handles; a node's [`Path`] stores the
/// handles of its neighbours, so chains are walked by index and there are no
/// ownership cycles. A secondary index maps save-format [`TransportId`]s to
/// handles.
///
/// [`Path`]: crate::transport::Path
#[derive(Debug, Clone, Default)]
pub struct TransportNetwork {
    nodes: SlotMap<NodeId, Transport>,
    by_transport_id: BTreeMap<TransportId, NodeId>,
}

impl TransportNetwork {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a node. Its save-format id must be unique within the network.
    pub fn add(&mut self, mut transport: Transport) -> Result<NodeId, TransportError> {
        let tid = transport.id();
        if self.by_transport_id.contains_key(&tid) {
            return Err(TransportError::DuplicateId(tid));
        }
        let node = self.nodes.insert_with_key(|node| {
            transport.path.node = node;
            transport
        });
        self.by_transport_id.insert(tid, node);
        Ok(node)
    }

    pub fn get(&self, node: NodeId) -> Option<&Transport> {
        self.nodes.get(node)
    }

    /// Resolve a save-format id to its arena handle.
    pub fn lookup(&self, id: TransportId) -> Option<NodeId> {
        self.by_transport_id.get(&id).copied()
    }

    pub fn transport_id(&self, node: NodeId) -> Option<TransportId> {
        self.nodes.get(node).map(Transport::id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// All nodes in save-format id order.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &Transport)> {
        self.by_transport_id
            .values()
            .filter_map(|&node| self.nodes.get(node).map(|t| (node, t)))
    }

    pub fn count_of(&self, tag: NodeKindTag) -> usize {
        self.nodes.values().filter(|t| t.tag() == tag).count()
    }

    fn node(&self, node: NodeId) -> Result<&Transport, TransportError> {
        self.nodes.get(node).ok_or(TransportError::NodeNotFound(node))
    }

    fn node_mut(&mut self, node: NodeId) -> Result<&mut Transport, TransportError> {
        self.nodes
            .get_mut(node)
            .ok_or(TransportError::NodeNotFound(node))
    }

    // -- Introspection --

    /// Externally visible inventory. Receivers always report `None`.
    pub fn inventory(&self, node: NodeId) -> Option<&Item> {
        self.nodes.get(node).and_then(Transport::inventory)
    }

    pub fn input(&self, node: NodeId) -> Option<NodeId> {
        self.nodes.get(node).and_then(Transport::input)
    }

    pub fn output(&self, node: NodeId) -> Option<NodeId> {
        self.nodes.get(node).and_then(Transport::output)
    }

    // -- Public mutators --

    /// Replace a belt's inventory. Producers and receivers manage their own
    /// slot and refuse.
    pub fn set_inventory(
        &mut self,
        node: NodeId,
        item: Option<Item>,
    ) -> Result<(), TransportError> {
        let transport = self.node_mut(node)?;
        match transport.kind {
            TransportKind::Belt => {
                transport.slot = item;
                Ok(())
            }
            _ => Err(transport.unsupported(LinkAction::SetInventory)),
        }
    }

    /// Point a node's previous link at `input`. Only this node's path changes.
    pub fn set_input(&mut self, node: NodeId, input: Option<NodeId>) -> Result<(), TransportError> {
        let transport = self.node(node)?;
        if transport.tag() == NodeKindTag::Producer {
            return Err(transport.unsupported(LinkAction::SetInput));
        }
        if let Some(from) = input {
            self.check_edge(from, node)?;
        }
        self.node_mut(node)?.path.previous = input;
        Ok(())
    }

    /// Point a node's next link at `output`. Only this node's path changes.
    pub fn set_output(
        &mut self,
        node: NodeId,
        output: Option<NodeId>,
    ) -> Result<(), TransportError> {
        let transport = self.node(node)?;
        if transport.tag() == NodeKindTag::Receiver {
            return Err(transport.unsupported(LinkAction::SetOutput));
        }
        if let Some(to) = output {
            self.check_edge(node, to)?;
        }
        self.node_mut(node)?.path.next = output;
        Ok(())
    }

    /// Validate an edge `from -> to`: no self links, nothing leaves a
    /// receiver, nothing enters a producer.
    fn check_edge(&self, from: NodeId, to: NodeId) -> Result<(), TransportError> {
        let source = self.node(from)?;
        let target = self.node(to)?;
        if from == to {
            return Err(TransportError::SelfLink(source.id()));
        }
        if source.tag() == NodeKindTag::Receiver {
            return Err(source.unsupported(LinkAction::SetOutput));
        }
        if target.tag() == NodeKindTag::Producer {
            return Err(target.unsupported(LinkAction::SetInput));
        }
        Ok(())
    }

    /// Link `from -> to` on both sides. Neighbours that pointed at either end
    /// lose their stale back-link.
    pub fn connect(&mut self, from: NodeId, to: NodeId) -> Result<(), TransportError> {
        self.check_edge(from, to)?;

        if let Some(old) = self.output(from).filter(|&old| old != to) {
            if let Some(t) = self.nodes.get_mut(old).filter(|t| t.path.previous == Some(from)) {
                t.path.previous = None;
            }
        }
        if let Some(old) = self.input(to).filter(|&old| old != from) {
            if let Some(t) = self.nodes.get_mut(old).filter(|t| t.path.next == Some(to)) {
                t.path.next = None;
            }
        }

        self.node_mut(from)?.path.next = Some(to);
        self.node_mut(to)?.path.previous = Some(from);
        Ok(())
    }

    /// Remove the outgoing edge of `from`, clearing the back-link too.
    pub fn disconnect(&mut self, from: NodeId) -> Result<(), TransportError> {
        let Some(to) = self.node(from)?.path.next else {
            return Ok(());
        };
        self.node_mut(from)?.path.next = None;
        if let Some(t) = self.nodes.get_mut(to).filter(|t| t.path.previous == Some(from)) {
            t.path.previous = None;
        }
        Ok(())
    }

    // -- Chain walks --

    /// Walk previous links to the first node. Stops before revisiting a node,
    /// so rings terminate.
    pub fn head(&self, node: NodeId) -> NodeId {
        let mut seen = SecondaryMap::new();
        self.walk(node, &mut seen, Transport::input)
            .last()
            .copied()
            .unwrap_or(node)
    }

    /// Walk next links to the last node. Stops before revisiting a node.
    pub fn tail(&self, node: NodeId) -> NodeId {
        let mut seen = SecondaryMap::new();
        self.walk(node, &mut seen, Transport::output)
            .last()
            .copied()
            .unwrap_or(node)
    }

    /// Collect `start` and every node reached through `link`, skipping nodes
    /// already in `seen` and marking every collected node.
    pub(crate) fn walk(
        &self,
        start: NodeId,
        seen: &mut SecondaryMap<NodeId, ()>,
        link: fn(&Transport) -> Option<NodeId>,
    ) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut current = Some(start);
        while let Some(node) = current {
            let Some(transport) = self.nodes.get(node) else {
                break;
            };
            if seen.insert(node, ()).is_some() {
                break;
            }
            out.push(node);
            current = link(transport);
        }
        out
    }

    /// The full chain through `node`, head first.
    pub fn chain(&self, node: NodeId) -> Vec<NodeId> {
        let mut seen = SecondaryMap::new();
        self.chain_with(node, &mut seen)
    }

    /// Like [`chain`](Self::chain) but shares the visited set with the caller,
    /// so nodes already claimed by another chain are not walked again.
    pub(crate) fn chain_with(
        &self,
        node: NodeId,
        seen: &mut SecondaryMap<NodeId, ()>,
    ) -> Vec<NodeId> {
        let mut upstream = self.walk(node, seen, Transport::input);
        if upstream.is_empty() {
            return upstream;
        }
        upstream.reverse();
        let downstream = match self.output(node) {
            Some(next) => self.walk(next, seen, Transport::output),
            None => Vec::new(),
        };
        upstream.extend(downstream);
        upstream
    }

    /// Render the path starting at `node`, following next links:
    /// `START -> <Belt-1> -> <Receiver-3> -> END`.
    pub fn describe_path(&self, node: NodeId) -> String {
        let mut seen = SecondaryMap::new();
        let parts: Vec<String> = self
            .walk(node, &mut seen, Transport::output)
            .into_iter()
            .filter_map(|n| self.nodes.get(n).map(ToString::to_string))
            .collect();
        if parts.is_empty() {
            return "START -> END".to_string();
        }
        format!("START -> {} -> END", parts.join(" -> "))
    }

    // -- Tick --

    /// Advance one node by one tick.
    pub fn tick(&mut self, node: NodeId) -> Result<TickOutcome, TransportError> {
        let transport = self.node_mut(node)?;
        let id = transport.id();
        match &mut transport.kind {
            TransportKind::Belt => Ok(self.push(node)),
            TransportKind::Producer { key, counter } => {
                *counter = counter.wrapping_add(1);
                if *counter % 2 == 0 {
                    return Ok(TickOutcome::Resting);
                }
                let key = key.clone();
                let pushed_to = match self.push(node) {
                    TickOutcome::Moved { to, .. } => Some(to),
                    _ => None,
                };
                self.node_mut(node)?.slot = Some(key.clone());
                Ok(TickOutcome::Produced { pushed_to, item: key })
            }
            TransportKind::Receiver { key } => match transport.slot.take() {
                None => Ok(TickOutcome::Idle),
                Some(item) if item == *key => Ok(TickOutcome::Consumed { item }),
                Some(found) => {
                    let err = TransportError::BadState {
                        node: id,
                        expected: key.clone(),
                        found: found.clone(),
                    };
                    transport.slot = Some(found);
                    Err(err)
                }
            },
        }
    }

    /// Base rule: move the held item into the next node if its slot is empty.
    fn push(&mut self, node: NodeId) -> TickOutcome {
        let Some(transport) = self.nodes.get(node) else {
            return TickOutcome::Idle;
        };
        if transport.slot.is_none() {
            return TickOutcome::Idle;
        }
        let Some(next) = transport.path.next else {
            return TickOutcome::Blocked;
        };
        if !self.nodes.get(next).is_some_and(|t| t.slot.is_none()) {
            return TickOutcome::Blocked;
        }
        let Some(item) = self.nodes.get_mut(node).and_then(|t| t.slot.take()) else {
            return TickOutcome::Idle;
        };
        if let Some(target) = self.nodes.get_mut(next) {
            target.slot = Some(item.clone());
        }
        TickOutcome::Moved { to: next, item }
    }

    /// Test hook: read a node's raw slot, including a receiver's hidden one.
    #[cfg(any(test, feature = "test-utils"))]
    pub fn raw_slot(&self, node: NodeId) -> Option<&Item> {
        self.nodes.get(node).and_then(|t| t.slot.as_ref())
    }

    /// Test hook: empty a node's raw slot regardless of kind.
    #[cfg(any(test, feature = "test-utils"))]
    pub fn take_slot(&mut self, node: NodeId) -> Option<Item> {
        self.nodes.get_mut(node).and_then(|t| t.slot.take())
    }
}
