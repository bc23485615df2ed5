use std::{path::PathBuf, sync::Arc};

use async_trait::async_trait;

use super::{json_map_store::JsonMapStore, Item, ItemKey, ItemStore, ScanPage};
use crate::errors::StoreError;

/// [`ItemStore`] over a [`JsonMapStore`], in memory or file-backed.
#[derive(Clone)]
pub struct MapItemStore {
    key_attribute: String,
    items: Arc<JsonMapStore<String, Item>>,
}

impl MapItemStore {
    pub fn in_memory(key_attribute: impl Into<String>) -> Self {
        Self { key_attribute: key_attribute.into(), items: JsonMapStore::in_memory() }
    }

    /// Open (or create) a JSON data file holding the items.
    pub async fn open<P: Into<PathBuf>>(key_attribute: impl Into<String>, path: P) -> Result<Self, StoreError> {
        let items = JsonMapStore::open(path).await?;
        Ok(Self { key_attribute: key_attribute.into(), items })
    }

    fn check_key<'k>(&self, key: &'k ItemKey) -> Result<&'k str, StoreError> {
        if key.name != self.key_attribute {
            return Err(StoreError::InvalidKey(format!(
                "expected key attribute `{}`, got `{}`",
                self.key_attribute, key.name
            )));
        }
        Ok(&key.value)
    }
}

#[async_trait]
impl ItemStore for MapItemStore {
    async fn get_item(&self, key: &ItemKey) -> Result<Option<Item>, StoreError> {
        let value = self.check_key(key)?;
        Ok(self.items.get(&value.to_owned()).await)
    }

    async fn scan(&self, start: Option<ItemKey>, limit: usize) -> Result<ScanPage, StoreError> {
        let after = match &start {
            Some(key) => Some(self.check_key(key)?.to_owned()),
            None => None,
        };
        let (entries, more) = self.items.page_after(after.as_ref(), limit.max(1)).await;
        let last_key = match (more, entries.last()) {
            (true, Some((k, _))) => Some(ItemKey::new(self.key_attribute.clone(), k.clone())),
            _ => None,
        };
        Ok(ScanPage { items: entries.into_iter().map(|(_, v)| v).collect(), last_key })
    }

    async fn put_item(&self, item: Item) -> Result<(), StoreError> {
        let key = ItemKey::of(&item, &self.key_attribute).ok_or_else(|| {
            StoreError::InvalidKey(format!("item has no string attribute `{}`", self.key_attribute))
        })?;
        self.items.insert(key.value, item).await
    }

    async fn delete_item(&self, key: &ItemKey) -> Result<(), StoreError> {
        let value = self.check_key(key)?;
        self.items.remove(&value.to_owned()).await?;
        Ok(())
    }
}
