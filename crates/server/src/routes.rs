use std::collections::HashMap;

use axum::{
    body::Bytes,
    extract::{
        rejection::{BytesRejection, QueryRejection},
        Query, State,
    },
    http::Method,
    routing::{any, get, post},
    Json, Router,
};
use common::types::Health;
use service::gateway::{GatewayRequest, GatewayResponse};
use service::users::handlers::rejected_input;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::{warn, Level};

use crate::errors::Envelope;
use crate::state::AppState;

pub async fn health() -> Json<Health> {
    Json(Health::ok())
}

/// HTTP front for the user handlers: method, query string and body become a
/// gateway request; the envelope is written back as-is.
///
/// A query string or body that cannot be decoded still answers with a JSON
/// error envelope.
async fn users(
    State(state): State<AppState>,
    method: Method,
    query: Result<Query<HashMap<String, String>>, QueryRejection>,
    body: Result<Bytes, BytesRejection>,
) -> Envelope {
    let Ok(Query(params)) = query.map_err(|e| warn!(error = %e, "undecodable query string")) else {
        return Envelope(rejected_input());
    };
    let body = match body.map(|b| String::from_utf8(b.to_vec())) {
        Ok(Ok(body)) => body,
        Ok(Err(e)) => {
            warn!(error = %e, "request body is not utf-8");
            return Envelope(rejected_input());
        }
        Err(e) => {
            warn!(error = %e, "unreadable request body");
            return Envelope(rejected_input());
        }
    };
    let req = GatewayRequest {
        http_method: method.as_str().to_string(),
        query_string_parameters: Some(params),
        body: Some(body),
    };
    Envelope(state.handlers.dispatch(&req).await)
}

/// Raw proxy-event entry point: takes a gateway request document and
/// answers with the gateway response document.
async fn invoke(State(state): State<AppState>, Json(req): Json<GatewayRequest>) -> Json<GatewayResponse> {
    Json(state.handlers.dispatch(&req).await)
}

/// Build the full application router.
pub fn build_router(state: AppState, cors: CorsLayer) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/users", any(users))
        .route("/gateway/invoke", post(invoke))
        .with_state(state)
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO).include_headers(false))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO).include_headers(false))
                .on_failure(DefaultOnFailure::new().level(Level::ERROR)),
        )
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use models::user::KEY_ATTRIBUTE;
    use service::storage::MapItemStore;
    use tower::ServiceExt;

    fn app() -> Router {
        let state = AppState::with_store(Arc::new(MapItemStore::in_memory(KEY_ATTRIBUTE)), 10);
        build_router(state, CorsLayer::very_permissive())
    }

    async fn body_string(res: axum::response::Response) -> String {
        let bytes = to_bytes(res.into_body(), usize::MAX).await.unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn health_is_ok() {
        let res = app().oneshot(Request::get("/health").body(Body::empty()).unwrap()).await.unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(body_string(res).await, r#"{"status":"ok"}"#);
    }

    #[tokio::test]
    async fn patch_on_users_is_not_allowed() {
        let res = app()
            .oneshot(Request::patch("/users").body(Body::from("{}")).unwrap())
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_string(res).await, "\"method not allowed\"");
    }

    #[tokio::test]
    async fn non_utf8_body_gets_json_error_envelope() {
        let res = app()
            .oneshot(Request::post("/users").body(Body::from(vec![0xff_u8, 0xfe, 0x7b])).unwrap())
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            res.headers().get("content-type").and_then(|v| v.to_str().ok()),
            Some("application/json")
        );
        assert_eq!(body_string(res).await, r#"{"error":"invalid user data"}"#);
    }

    #[tokio::test]
    async fn invoke_returns_envelope_document() {
        let event = serde_json::json!({
            "httpMethod": "POST",
            "queryStringParameters": null,
            "body": r#"{"email":"a@b.com","first_name":"A","last_name":"B"}"#,
        });
        let res = app()
            .oneshot(
                Request::post("/gateway/invoke")
                    .header("content-type", "application/json")
                    .body(Body::from(event.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let envelope: GatewayResponse = serde_json::from_str(&body_string(res).await).unwrap();
        assert_eq!(envelope.status_code, 200);
        assert_eq!(envelope.headers.get("Content-Type").map(String::as_str), Some("application/json"));
    }
}
