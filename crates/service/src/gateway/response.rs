use std::collections::HashMap;

use axum::http::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Outbound envelope handed back to the gateway.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewayResponse {
    pub status_code: u16,
    pub headers: HashMap<String, String>,
    pub body: String,
}

/// JSON shape of every error body: `{"error": "..."}`.
#[derive(Debug, Serialize)]
pub struct ErrorBody<'a> {
    pub error: &'a str,
}

#[derive(Debug, Error)]
pub enum ResponseError {
    #[error("failed to serialize response body: {0}")]
    Serialize(#[from] serde_json::Error),
}

fn json_headers() -> HashMap<String, String> {
    HashMap::from([("Content-Type".to_string(), "application/json".to_string())])
}

/// Serialize `body` as JSON into an envelope with the given status.
pub fn build_response<T>(status: StatusCode, body: &T) -> Result<GatewayResponse, ResponseError>
where
    T: Serialize + ?Sized,
{
    let body = serde_json::to_string(body)?;
    Ok(GatewayResponse { status_code: status.as_u16(), headers: json_headers(), body })
}

/// Fixed 500 envelope used when a body cannot be serialized.
pub fn internal_error() -> GatewayResponse {
    GatewayResponse {
        status_code: StatusCode::INTERNAL_SERVER_ERROR.as_u16(),
        headers: json_headers(),
        body: r#"{"error":"failed to serialize response"}"#.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::ser::{Error as _, Serializer};

    struct Unserializable;

    impl Serialize for Unserializable {
        fn serialize<S: Serializer>(&self, _: S) -> Result<S::Ok, S::Error> {
            Err(S::Error::custom("nope"))
        }
    }

    #[test]
    fn sets_status_header_and_json_body() {
        let res = build_response(StatusCode::OK, &serde_json::json!({"a": 1})).unwrap();
        assert_eq!(res.status_code, 200);
        assert_eq!(res.headers.get("Content-Type").map(String::as_str), Some("application/json"));
        assert_eq!(res.body, r#"{"a":1}"#);
    }

    #[test]
    fn error_body_shape() {
        let res = build_response(StatusCode::BAD_REQUEST, &ErrorBody { error: "invalid email" }).unwrap();
        assert_eq!(res.status_code, 400);
        assert_eq!(res.body, r#"{"error":"invalid email"}"#);
    }

    #[test]
    fn serialization_failure_is_reported() {
        assert!(matches!(build_response(StatusCode::OK, &Unserializable), Err(ResponseError::Serialize(_))));
        let fallback = internal_error();
        assert_eq!(fallback.status_code, 500);
        assert!(fallback.body.contains("failed to serialize response"));
    }

    #[test]
    fn envelope_uses_proxy_field_names() {
        let res = build_response(StatusCode::OK, "x").unwrap();
        let v = serde_json::to_value(&res).unwrap();
        assert_eq!(v["statusCode"], 200);
        assert_eq!(v["body"], "\"x\"");
    }
}
