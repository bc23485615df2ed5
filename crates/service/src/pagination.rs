//! Lazy, resumable walk over every user in the store.
//!
//! Each call to [`UserPages::next_page`] issues one scan. The cursor is only
//! advanced after a page decodes cleanly, so a failed call can be retried
//! and picks up where it stopped.

use std::sync::Arc;

use models::User;

use crate::errors::UserError;
use crate::storage::{ItemKey, ItemStore};
use crate::users::repository::decode_user;

pub struct UserPages {
    store: Arc<dyn ItemStore>,
    page_size: usize,
    cursor: Option<ItemKey>,
    done: bool,
}

impl UserPages {
    pub(crate) fn new(store: Arc<dyn ItemStore>, page_size: usize) -> Self {
        Self { store, page_size: page_size.max(1), cursor: None, done: false }
    }

    /// Continue a walk from a cursor previously read with [`UserPages::cursor`].
    pub fn resume_from(mut self, cursor: ItemKey) -> Self {
        self.cursor = Some(cursor);
        self.done = false;
        self
    }

    /// Key of the last item returned, if more items may follow.
    pub fn cursor(&self) -> Option<&ItemKey> {
        self.cursor.as_ref()
    }

    pub fn is_done(&self) -> bool {
        self.done
    }

    /// The next page of users, or `None` once the scan is exhausted.
    pub async fn next_page(&mut self) -> Result<Option<Vec<User>>, UserError> {
        if self.done {
            return Ok(None);
        }
        let page = self
            .store
            .scan(self.cursor.clone(), self.page_size)
            .await
            .map_err(UserError::FetchFailed)?;
        let users = page.items.into_iter().map(decode_user).collect::<Result<Vec<_>, _>>()?;
        self.done = page.last_key.is_none();
        self.cursor = page.last_key;
        Ok(Some(users))
    }

    /// Drain the remaining pages into one vector.
    pub async fn collect_all(mut self) -> Result<Vec<User>, UserError> {
        let mut all = Vec::new();
        while let Some(page) = self.next_page().await? {
            all.extend(page);
        }
        Ok(all)
    }
}
