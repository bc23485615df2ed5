use std::collections::HashMap;

use axum::http::{HeaderName, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use service::gateway::GatewayResponse;
use thiserror::Error;
use tracing::warn;

/// Writes a gateway envelope back out as an HTTP response.
#[derive(Debug)]
pub struct Envelope(pub GatewayResponse);

impl IntoResponse for Envelope {
    fn into_response(self) -> Response {
        let GatewayResponse { status_code, headers, body } = self.0;
        let status = StatusCode::from_u16(status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let mut res = (status, body).into_response();
        apply_headers(&mut res, headers);
        res
    }
}

fn apply_headers(res: &mut Response, headers: HashMap<String, String>) {
    for (name, value) in headers {
        match (HeaderName::from_bytes(name.as_bytes()), HeaderValue::from_str(&value)) {
            (Ok(name), Ok(value)) => {
                res.headers_mut().insert(name, value);
            }
            _ => warn!(header = %name, "dropping invalid response header"),
        }
    }
}

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("store initialisation failed: {0}")]
    Store(#[from] service::StoreError),
    #[error(transparent)]
    Any(#[from] anyhow::Error),
}
