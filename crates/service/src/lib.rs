//! Service layer: the item-store capability and its backends, the user
//! repository that maps records onto it, and the gateway-facing handlers.
//!
//! ```
//! use std::sync::Arc;
//! use service::{gateway::GatewayRequest, storage::MapItemStore, users::{UserHandlers, UserRepository}};
//!
//! let store = Arc::new(MapItemStore::in_memory("email"));
//! let handlers = UserHandlers::new(UserRepository::new(store));
//! let req = GatewayRequest::new("POST").with_body(r#"{"email":"a@b.com","first_name":"A","last_name":"B"}"#);
//! let res = tokio_test::block_on(handlers.dispatch(&req));
//! assert_eq!(res.status_code, 200);
//! ```

pub mod errors;
pub mod gateway;
pub mod pagination;
pub mod storage;
pub mod users;
#[cfg(test)]
pub mod test_support;

pub use errors::{StoreError, UserError};
