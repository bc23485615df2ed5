use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Inbound request as delivered by a proxy-style gateway trigger.
///
/// Field names follow the proxy event shape (`httpMethod`,
/// `queryStringParameters`, `body`); absent or `null` fields are empty.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GatewayRequest {
    #[serde(default)]
    pub http_method: String,
    #[serde(default)]
    pub query_string_parameters: Option<HashMap<String, String>>,
    #[serde(default)]
    pub body: Option<String>,
}

/// The operation a request asks for, decided by its method.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Intent {
    Get,
    Create,
    Update,
    Delete,
    Unhandled,
}

impl Intent {
    pub fn from_method(method: &str) -> Self {
        match method.to_ascii_uppercase().as_str() {
            "GET" => Intent::Get,
            "POST" => Intent::Create,
            "PUT" => Intent::Update,
            "DELETE" => Intent::Delete,
            _ => Intent::Unhandled,
        }
    }
}

impl GatewayRequest {
    pub fn new(method: impl Into<String>) -> Self {
        Self { http_method: method.into(), ..Self::default() }
    }

    pub fn with_query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query_string_parameters.get_or_insert_with(HashMap::new).insert(name.into(), value.into());
        self
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn intent(&self) -> Intent {
        Intent::from_method(&self.http_method)
    }

    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.query_string_parameters.as_ref()?.get(name).map(String::as_str)
    }

    pub fn body(&self) -> &str {
        self.body.as_deref().unwrap_or_default()
    }
}
