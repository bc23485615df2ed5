use std::error::Error as _;

use axum::http::StatusCode;
use models::user::{is_email_valid, User};
use serde::Serialize;
use tracing::{error, info, instrument, warn};

use super::repository::UserRepository;
use crate::errors::UserError;
use crate::gateway::{build_response, internal_error, ErrorBody, GatewayRequest, GatewayResponse, Intent};

pub const METHOD_NOT_ALLOWED: &str = "method not allowed";
/// Client-visible text of [`UserError::InvalidInputData`].
pub const INVALID_INPUT: &str = "invalid user data";

/// Per-intent request handlers. Stateless apart from the repository handle.
#[derive(Clone)]
pub struct UserHandlers {
    repo: UserRepository,
}

impl UserHandlers {
    pub fn new(repo: UserRepository) -> Self {
        Self { repo }
    }

    pub fn repository(&self) -> &UserRepository {
        &self.repo
    }

    /// Route a request to the handler for its method.
    pub async fn dispatch(&self, req: &GatewayRequest) -> GatewayResponse {
        match req.intent() {
            Intent::Get => self.get_user(req).await,
            Intent::Create => self.create_user(req).await,
            Intent::Update => self.update_user(req).await,
            Intent::Delete => self.delete_user(req).await,
            Intent::Unhandled => unhandled_method(),
        }
    }

    /// One user when `email` is given and non-empty, otherwise every user.
    /// An unknown email answers with the empty record.
    #[instrument(skip_all, fields(intent = "get"))]
    pub async fn get_user(&self, req: &GatewayRequest) -> GatewayResponse {
        match req.query_param("email").filter(|e| !e.is_empty()) {
            Some(email) => {
                let result = self.repo.fetch_one(email).await.map(Option::unwrap_or_default);
                respond("get_user", result)
            }
            None => respond("list_users", self.repo.fetch_all().await),
        }
    }

    #[instrument(skip_all, fields(intent = "create"))]
    pub async fn create_user(&self, req: &GatewayRequest) -> GatewayResponse {
        respond("create_user", self.create(req.body()).await)
    }

    #[instrument(skip_all, fields(intent = "update"))]
    pub async fn update_user(&self, req: &GatewayRequest) -> GatewayResponse {
        respond("update_user", self.update(req.body()).await)
    }

    /// A missing `email` parameter is passed through as the empty key.
    #[instrument(skip_all, fields(intent = "delete"))]
    pub async fn delete_user(&self, req: &GatewayRequest) -> GatewayResponse {
        let email = req.query_param("email").unwrap_or_default();
        let result = self.repo.delete(email).await.map(|()| serde_json::Value::Null);
        respond("delete_user", result)
    }

    /// Validate, check the email is free, then store the new user.
    pub async fn create(&self, body: &str) -> Result<User, UserError> {
        let user = parse_user(body)?;
        if !is_email_valid(&user.email) {
            return Err(UserError::InvalidEmailData);
        }
        if self.repo.fetch_one(&user.email).await?.is_some() {
            return Err(UserError::UserAlreadyExists);
        }
        self.repo.put(&user).await?;
        Ok(user)
    }

    /// Replace an existing user wholesale; fields missing from `body` become empty.
    pub async fn update(&self, body: &str) -> Result<User, UserError> {
        let user = parse_user(body)?;
        if self.repo.fetch_one(&user.email).await?.is_none() {
            return Err(UserError::UserDoesNotExist);
        }
        self.repo.put(&user).await?;
        Ok(user)
    }
}

/// 400 with the constant "method not allowed" body.
pub fn unhandled_method() -> GatewayResponse {
    build_response(StatusCode::BAD_REQUEST, METHOD_NOT_ALLOWED).unwrap_or_else(|_| internal_error())
}

/// 400 `{"error":"invalid user data"}` for requests the transport could not
/// turn into a gateway request (undecodable body or query string).
pub fn rejected_input() -> GatewayResponse {
    build_response(StatusCode::BAD_REQUEST, &ErrorBody { error: INVALID_INPUT }).unwrap_or_else(|_| internal_error())
}

fn parse_user(body: &str) -> Result<User, UserError> {
    serde_json::from_str(body).map_err(UserError::InvalidInputData)
}

fn respond<T: Serialize>(operation: &'static str, result: Result<T, UserError>) -> GatewayResponse {
    let built = match &result {
        Ok(payload) => {
            info!(operation, "request succeeded");
            build_response(StatusCode::OK, payload)
        }
        Err(e) => {
            let cause = e.source().map(|s| s.to_string());
            warn!(operation, code = e.code(), error = %e, cause = cause.as_deref(), "request failed");
            build_response(e.status(), &ErrorBody { error: &e.to_string() })
        }
    };
    built.unwrap_or_else(|e| {
        error!(operation, error = %e, "could not serialize response");
        internal_error()
    })
}
