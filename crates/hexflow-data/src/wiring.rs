//! Wiring lines: the trailing section of a save file that links nodes.
//!
//! Two shapes are accepted:
//!
//! - `id-other`: a single link. For a producer `other` is its output; for a
//!   belt or receiver it is the input.
//! - `id-prev,next`, `id-prev,` or `id-,next`: belt links, at least one side.

use crate::error::FormatErrorKind;
use hexflow_core::{NodeId, NodeKindTag, TransportId, TransportNetwork};
use std::collections::BTreeMap;
use tracing::debug;

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WiringLine {
    /// `id-other`.
    Single { id: TransportId, other: TransportId },
    /// `id-prev,next` with either side optional.
    Belt {
        id: TransportId,
        prev: Option<TransportId>,
        next: Option<TransportId>,
    },
}

impl WiringLine {
    pub fn parse(line: &str) -> Result<Self, FormatErrorKind> {
        let malformed = || FormatErrorKind::MalformedWiring(line.to_string());
        let (id, rest) = line.split_once('-').ok_or_else(malformed)?;
        let id = parse_id(id).ok_or_else(malformed)?;

        match rest.split_once(',') {
            None if rest.trim().is_empty() => Err(FormatErrorKind::EmptyWiring(line.to_string())),
            None => {
                let other = parse_id(rest).ok_or_else(malformed)?;
                Ok(WiringLine::Single { id, other })
            }
            Some((prev, next)) => {
                let prev = parse_side(prev).ok_or_else(malformed)?;
                let next = parse_side(next).ok_or_else(malformed)?;
                if prev.is_none() && next.is_none() {
                    return Err(FormatErrorKind::EmptyWiring(line.to_string()));
                }
                Ok(WiringLine::Belt { id, prev, next })
            }
        }
    }

    pub fn id(&self) -> TransportId {
        match self {
            WiringLine::Single { id, .. } | WiringLine::Belt { id, .. } => *id,
        }
    }
}

fn parse_id(text: &str) -> Option<TransportId> {
    let text = text.trim();
    if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    text.parse().ok().map(TransportId)
}

/// An optional side: empty means absent, anything else must be an id.
fn parse_side(text: &str) -> Option<Option<TransportId>> {
    if text.trim().is_empty() {
        Some(None)
    } else {
        parse_id(text).map(Some)
    }
}

// ---------------------------------------------------------------------------
// Context
// ---------------------------------------------------------------------------

/// The loader's id registry for one file. Resolves save-format ids to arena
/// handles and applies wiring lines to the network.
#[derive(Debug, Default)]
pub struct WiringContext {
    nodes: BTreeMap<TransportId, (NodeId, NodeKindTag)>,
    links: usize,
}

impl WiringContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, id: TransportId, node: NodeId, kind: NodeKindTag) {
        self.nodes.insert(id, (node, kind));
    }

    pub fn resolve(&self, id: TransportId) -> Result<(NodeId, NodeKindTag), FormatErrorKind> {
        self.nodes
            .get(&id)
            .copied()
            .ok_or(FormatErrorKind::UnknownId(id))
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Number of edges applied so far.
    pub fn links(&self) -> usize {
        self.links
    }

    /// Apply one wiring line to `network`.
    pub fn apply(
        &mut self,
        network: &mut TransportNetwork,
        line: WiringLine,
    ) -> Result<(), FormatErrorKind> {
        match line {
            WiringLine::Single { id, other } => {
                let (node, kind) = self.resolve(id)?;
                let (other_node, _) = self.resolve(other)?;
                match kind {
                    NodeKindTag::Producer => self.link(network, (id, node), (other, other_node)),
                    NodeKindTag::Belt | NodeKindTag::Receiver => {
                        self.link(network, (other, other_node), (id, node))
                    }
                }
            }
            WiringLine::Belt { id, prev, next } => {
                let (node, kind) = self.resolve(id)?;
                if kind != NodeKindTag::Belt {
                    return Err(FormatErrorKind::ContainerWiredAsBelt { id, kind });
                }
                // Resolve both sides before touching the network.
                let prev = prev.map(|p| self.resolve(p).map(|(n, _)| (p, n))).transpose()?;
                let next = next.map(|n| self.resolve(n).map(|(h, _)| (n, h))).transpose()?;
                if let Some(prev) = prev {
                    self.link(network, prev, (id, node))?;
                }
                if let Some(next) = next {
                    self.link(network, (id, node), next)?;
                }
                Ok(())
            }
        }
    }

    fn link(
        &mut self,
        network: &mut TransportNetwork,
        (from_id, from): (TransportId, NodeId),
        (to_id, to): (TransportId, NodeId),
    ) -> Result<(), FormatErrorKind> {
        network.connect(from, to)?;
        self.links += 1;
        debug!(from = %from_id, to = %to_id, "linked");
        Ok(())
    }
}
