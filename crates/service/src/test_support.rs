#![cfg(test)]
use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use models::user::{User, KEY_ATTRIBUTE};

use crate::errors::StoreError;
use crate::storage::{Item, ItemKey, ItemStore, MapItemStore, ScanPage};
use crate::users::repository::encode_user;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Op {
    Get,
    Scan,
    Put,
    Delete,
}

/// In-memory store that records every call and can be told to fail some operations.
pub struct RecordingStore {
    inner: MapItemStore,
    failing: Mutex<HashSet<Op>>,
    calls: Mutex<Vec<Op>>,
}

impl RecordingStore {
    pub fn new() -> Self {
        Self { inner: MapItemStore::in_memory(KEY_ATTRIBUTE), failing: Mutex::new(HashSet::new()), calls: Mutex::new(Vec::new()) }
    }

    pub fn failing(ops: &[Op]) -> Self {
        let store = Self::new();
        store.fail(ops);
        store
    }

    pub fn fail(&self, ops: &[Op]) {
        self.failing.lock().unwrap().extend(ops.iter().copied());
    }

    pub fn calls(&self) -> Vec<Op> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, op: Op) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| **c == op).count()
    }

    fn record(&self, op: Op) -> Result<(), StoreError> {
        self.calls.lock().unwrap().push(op);
        if self.failing.lock().unwrap().contains(&op) {
            return Err(StoreError::Backend(format!("injected {op:?} failure")));
        }
        Ok(())
    }
}

#[async_trait]
impl ItemStore for RecordingStore {
    async fn get_item(&self, key: &ItemKey) -> Result<Option<Item>, StoreError> {
        self.record(Op::Get)?;
        self.inner.get_item(key).await
    }

    async fn scan(&self, start: Option<ItemKey>, limit: usize) -> Result<ScanPage, StoreError> {
        self.record(Op::Scan)?;
        self.inner.scan(start, limit).await
    }

    async fn put_item(&self, item: Item) -> Result<(), StoreError> {
        self.record(Op::Put)?;
        self.inner.put_item(item).await
    }

    async fn delete_item(&self, key: &ItemKey) -> Result<(), StoreError> {
        self.record(Op::Delete)?;
        self.inner.delete_item(key).await
    }
}

/// In-memory store holding `n` users `user0@example.com ..`.
pub async fn seeded_store(n: usize) -> Arc<dyn ItemStore> {
    let store = MapItemStore::in_memory(KEY_ATTRIBUTE);
    for i in 0..n {
        let user = User::new(format!("user{i}@example.com"), format!("First{i}"), format!("Last{i}"));
        store.put_item(encode_user(&user).unwrap()).await.unwrap();
    }
    Arc::new(store)
}
