use axum::http::StatusCode;
use thiserror::Error;

/// Failures raised by an [`ItemStore`](crate::storage::ItemStore) backend.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store backend error: {0}")]
    Backend(String),
    #[error("invalid key: {0}")]
    InvalidKey(String),
    #[error("cannot decode stored item: {0}")]
    Decode(String),
    #[error("store i/o error: {0}")]
    Io(#[from] std::io::Error),
}

/// Request-level failures. The display text is what clients see in the
/// `error` field of a response; causes are kept for logs only.
#[derive(Debug, Error)]
pub enum UserError {
    #[error("failed to fetch record")]
    FetchFailed(#[source] StoreError),
    #[error("failed to unmarshal record")]
    UnmarshalFailed(#[source] serde_json::Error),
    #[error("failed to marshal record")]
    MarshalFailed(#[source] serde_json::Error),
    #[error("failed to put record")]
    PutFailed(#[source] StoreError),
    #[error("failed to delete record")]
    DeleteFailed(#[source] StoreError),
    #[error("invalid user data")]
    InvalidInputData(#[source] serde_json::Error),
    #[error("invalid email")]
    InvalidEmailData,
    #[error("user already exists")]
    UserAlreadyExists,
    #[error("user does not exist")]
    UserDoesNotExist,
}

impl UserError {
    /// Stable numeric code for external mapping/logging
    pub fn code(&self) -> u16 {
        match self {
            UserError::InvalidInputData(_) => 1001,
            UserError::InvalidEmailData => 1002,
            UserError::UserAlreadyExists => 1003,
            UserError::UserDoesNotExist => 1004,
            UserError::FetchFailed(_) => 1201,
            UserError::UnmarshalFailed(_) => 1202,
            UserError::MarshalFailed(_) => 1203,
            UserError::PutFailed(_) => 1204,
            UserError::DeleteFailed(_) => 1205,
        }
    }

    /// Every request failure answers 400, storage faults included.
    pub fn status(&self) -> StatusCode {
        StatusCode::BAD_REQUEST
    }
}
