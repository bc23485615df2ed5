//! Shared helpers used by every crate in the workspace: logging setup and
//! small wire types that do not belong to the user domain.

pub mod types;
pub mod utils;
