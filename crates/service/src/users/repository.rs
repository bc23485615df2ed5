use std::sync::Arc;

use models::user::{User, KEY_ATTRIBUTE};
use serde::ser::Error as _;
use serde_json::Value;
use tracing::{debug, instrument};

use crate::errors::UserError;
use crate::pagination::UserPages;
use crate::storage::{Item, ItemKey, ItemStore};

/// Default number of items requested per scan call.
pub const DEFAULT_PAGE_SIZE: usize = 100;

/// Maps user operations onto item-store calls, keyed by email.
#[derive(Clone)]
pub struct UserRepository {
    store: Arc<dyn ItemStore>,
    page_size: usize,
}

impl UserRepository {
    pub fn new(store: Arc<dyn ItemStore>) -> Self {
        Self::with_page_size(store, DEFAULT_PAGE_SIZE)
    }

    pub fn with_page_size(store: Arc<dyn ItemStore>, page_size: usize) -> Self {
        Self { store, page_size: page_size.max(1) }
    }

    fn key(email: &str) -> ItemKey {
        ItemKey::new(KEY_ATTRIBUTE, email)
    }

    /// Point lookup. A miss is `Ok(None)`.
    #[instrument(skip(self))]
    pub async fn fetch_one(&self, email: &str) -> Result<Option<User>, UserError> {
        let item = self.store.get_item(&Self::key(email)).await.map_err(UserError::FetchFailed)?;
        item.map(decode_user).transpose()
    }

    /// Resumable page-by-page walk over all users.
    pub fn pages(&self) -> UserPages {
        UserPages::new(Arc::clone(&self.store), self.page_size)
    }

    /// Every user in the table, following scan pages until exhausted.
    #[instrument(skip(self))]
    pub async fn fetch_all(&self) -> Result<Vec<User>, UserError> {
        let users = self.pages().collect_all().await?;
        debug!(count = users.len(), "fetched all users");
        Ok(users)
    }

    /// Unconditional upsert.
    #[instrument(skip(self, user), fields(email = %user.email))]
    pub async fn put(&self, user: &User) -> Result<(), UserError> {
        let item = encode_user(user)?;
        self.store.put_item(item).await.map_err(UserError::PutFailed)
    }

    /// Idempotent delete; a missing email is not an error.
    #[instrument(skip(self))]
    pub async fn delete(&self, email: &str) -> Result<(), UserError> {
        self.store.delete_item(&Self::key(email)).await.map_err(UserError::DeleteFailed)
    }
}

pub(crate) fn decode_user(item: Item) -> Result<User, UserError> {
    serde_json::from_value(Value::Object(item)).map_err(UserError::UnmarshalFailed)
}

pub(crate) fn encode_user(user: &User) -> Result<Item, UserError> {
    match serde_json::to_value(user).map_err(UserError::MarshalFailed)? {
        Value::Object(item) => Ok(item),
        _ => Err(UserError::MarshalFailed(serde_json::Error::custom("user did not encode to an object"))),
    }
}
