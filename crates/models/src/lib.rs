//! Domain records shared by the service and server crates.

pub mod user;

pub use user::{is_email_valid, User};
