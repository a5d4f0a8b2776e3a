use serde::{Deserialize, Serialize};
use slotmap::new_key_type;
use std::fmt;

new_key_type! {
    /// Stable arena handle for a transport node in a [`TransportNetwork`].
    ///
    /// [`TransportNetwork`]: crate::network::TransportNetwork
    pub struct NodeId;
}

/// The integer id a node carries in the save format. Assigned in grid-walk
/// order by the loader, starting at 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TransportId(pub u32);

impl fmt::Display for TransportId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
