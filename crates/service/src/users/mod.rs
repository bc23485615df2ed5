//! User CRUD: the record store adapter and the per-intent request handlers.

pub mod handlers;
pub mod repository;

pub use handlers::UserHandlers;
pub use repository::UserRepository;
