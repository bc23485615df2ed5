use std::{collections::BTreeMap, ops::Bound, path::PathBuf, sync::Arc};

use serde::{de::DeserializeOwned, Serialize};
use tokio::{fs, sync::RwLock};
use tracing::debug;

use crate::errors::StoreError;

/// Ordered key-value map, optionally persisted to a JSON file.
///
/// The whole map is rewritten after every mutation, so this is meant for
/// small tables (local development, tests, single-node deployments).
/// Ordered keys give scans a stable order to resume from.
#[derive(Clone)]
pub struct JsonMapStore<K, V> {
    inner: Arc<RwLock<BTreeMap<K, V>>>,
    file_path: Option<PathBuf>,
}

impl<K, V> JsonMapStore<K, V>
where
    K: Ord + Serialize + DeserializeOwned + Clone,
    V: Serialize + DeserializeOwned + Clone,
{
    /// A store that lives only in memory.
    pub fn in_memory() -> Arc<Self> {
        Arc::new(Self { inner: Arc::new(RwLock::new(BTreeMap::new())), file_path: None })
    }

    /// Open the store at `path`, creating the file with an empty map if missing.
    pub async fn open<P: Into<PathBuf>>(path: P) -> Result<Arc<Self>, StoreError> {
        let file_path = path.into();
        if let Some(parent) = file_path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await?;
            }
        }

        let map: BTreeMap<K, V> = match fs::read(&file_path).await {
            Ok(bytes) if bytes.is_empty() => BTreeMap::new(),
            Ok(bytes) => serde_json::from_slice(&bytes).map_err(|e| {
                StoreError::Backend(format!("corrupt data file {}: {e}", file_path.display()))
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let empty: BTreeMap<K, V> = BTreeMap::new();
                let data = serde_json::to_vec(&empty).map_err(|e| StoreError::Backend(e.to_string()))?;
                fs::write(&file_path, data).await?;
                empty
            }
            Err(e) => return Err(e.into()),
        };
        debug!(path = %file_path.display(), entries = map.len(), "json map store opened");

        Ok(Arc::new(Self { inner: Arc::new(RwLock::new(map)), file_path: Some(file_path) }))
    }

    async fn save(&self, map: &BTreeMap<K, V>) -> Result<(), StoreError> {
        let Some(path) = &self.file_path else { return Ok(()) };
        let data = serde_json::to_vec(map).map_err(|e| StoreError::Backend(e.to_string()))?;
        fs::write(path, data).await?;
        Ok(())
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.is_empty()
    }

    /// Get value by key.
    pub async fn get(&self, key: &K) -> Option<V> {
        let map = self.inner.read().await;
        map.get(key).cloned()
    }

    /// Up to `limit` entries with keys strictly greater than `after`, plus
    /// whether any entries remain beyond them.
    pub async fn page_after(&self, after: Option<&K>, limit: usize) -> (Vec<(K, V)>, bool) {
        let map = self.inner.read().await;
        let lower = match after {
            Some(k) => Bound::Excluded(k),
            None => Bound::Unbounded,
        };
        let mut range = map.range((lower, Bound::Unbounded));
        let page: Vec<(K, V)> = range.by_ref().take(limit).map(|(k, v)| (k.clone(), v.clone())).collect();
        let more = range.next().is_some();
        (page, more)
    }

    /// Insert or replace a value and persist.
    ///
    /// The in-memory map only changes once the write has succeeded.
    pub async fn insert(&self, key: K, value: V) -> Result<(), StoreError> {
        let mut map = self.inner.write().await;
        let mut next = map.clone();
        next.insert(key, value);
        self.save(&next).await?;
        *map = next;
        Ok(())
    }

    /// Remove a key and persist; returns whether it existed.
    pub async fn remove(&self, key: &K) -> Result<bool, StoreError> {
        let mut map = self.inner.write().await;
        if !map.contains_key(key) {
            return Ok(false);
        }
        let mut next = map.clone();
        next.remove(key);
        self.save(&next).await?;
        *map = next;
        Ok(true)
    }
}
