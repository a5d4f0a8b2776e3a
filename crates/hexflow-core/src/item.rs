use serde::{Deserialize, Serialize};
use std::fmt;

/// Errors from constructing an [`Item`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ItemError {
    #[error("item name must not be empty")]
    EmptyName,
}

/// An immutable named item. Two items are equal iff their names match.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Item {
    name: String,
}

impl Item {
    pub fn new(name: impl Into<String>) -> Result<Self, ItemError> {
        let name = name.into();
        if name.is_empty() {
            return Err(ItemError::EmptyName);
        }
        Ok(Self { name })
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl TryFrom<String> for Item {
    type Error = ItemError;

    fn try_from(name: String) -> Result<Self, Self::Error> {
        Item::new(name)
    }
}

impl From<Item> for String {
    fn from(item: Item) -> Self {
        item.name
    }
}

impl fmt::Display for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}
