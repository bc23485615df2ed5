//! Storage abstractions for the service layer.
//!
//! [`ItemStore`] is the capability the user repository talks to: raw,
//! untyped items keyed by a single string attribute. Backends live in the
//! submodules.

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::errors::StoreError;

pub mod json_map_store;
pub mod map_item_store;
#[cfg(feature = "dynamodb")]
pub mod dynamodb;

pub use map_item_store::MapItemStore;

/// An untyped stored item: attribute name to JSON value.
pub type Item = Map<String, Value>;

/// Name and string value of an item's key attribute.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ItemKey {
    pub name: String,
    pub value: String,
}

impl ItemKey {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self { name: name.into(), value: value.into() }
    }

    /// Extract the key attribute `name` from an item, if it holds a string.
    pub fn of(item: &Item, name: &str) -> Option<Self> {
        item.get(name).and_then(Value::as_str).map(|v| Self::new(name, v))
    }
}

/// One page of a scan. `last_key` is set when more items may follow; pass
/// it back as the start key to resume.
#[derive(Clone, Debug, Default)]
pub struct ScanPage {
    pub items: Vec<Item>,
    pub last_key: Option<ItemKey>,
}

/// Key-value item store keyed by one string attribute.
#[async_trait]
pub trait ItemStore: Send + Sync {
    /// Point lookup. A miss is `Ok(None)`.
    async fn get_item(&self, key: &ItemKey) -> Result<Option<Item>, StoreError>;
    /// Up to `limit` items strictly after `start`, in a stable order.
    async fn scan(&self, start: Option<ItemKey>, limit: usize) -> Result<ScanPage, StoreError>;
    /// Unconditional upsert.
    async fn put_item(&self, item: Item) -> Result<(), StoreError>;
    /// Idempotent delete; removing a missing key is not an error.
    async fn delete_item(&self, key: &ItemKey) -> Result<(), StoreError>;
}
