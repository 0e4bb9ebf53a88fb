//! Auth backend port and its HTTP implementation.
//!
//! ENDPOINTS
//! =========
//! - `POST /admin/admin-login` with the credentials as JSON; success body
//!   `{ role, username, token, msg }`, failure body `{ message | msg }`.
//! - `GET /admin/me` carrying the bearer header; success body
//!   `{ role, userId, msg }`. Any non-2xx means the token is no longer good.

#[cfg(test)]
#[path = "backend_test.rs"]
mod tests;

use reqwest::Method;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

use super::model::{Credentials, Role};
use crate::http::{ApiClient, ApiError, RawResponse};

pub const LOGIN_PATH: &str = "/admin/admin-login";
pub const WHOAMI_PATH: &str = "/admin/me";

// =============================================================================
// ERROR
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// The request never produced a response.
    #[error("auth request failed: {0}")]
    Transport(String),

    /// The backend answered with a non-success status.
    #[error("auth rejected with status {status}: {}", message.as_deref().unwrap_or("no message"))]
    Rejected { status: u16, message: Option<String> },

    /// A success response that does not have the expected shape.
    #[error("auth response invalid: {0}")]
    Invalid(String),
}

impl AuthError {
    /// The human-readable reason supplied by the server, if any.
    #[must_use]
    pub fn server_message(&self) -> Option<&str> {
        match self {
            Self::Rejected { message, .. } => message.as_deref(),
            Self::Transport(_) | Self::Invalid(_) => None,
        }
    }
}

impl From<ApiError> for AuthError {
    fn from(err: ApiError) -> Self {
        match err {
            ApiError::Status { status, body } => Self::Rejected { status, message: extract_error_message(&body) },
            ApiError::Json(e) => Self::Invalid(e.to_string()),
            other => Self::Transport(other.to_string()),
        }
    }
}

// =============================================================================
// WIRE TYPES
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct LoginResponse {
    #[serde(default)]
    pub role: Option<Role>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub token: Option<String>,
    #[serde(default)]
    pub msg: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WhoAmIResponse {
    #[serde(default)]
    pub role: Option<Role>,
    #[serde(default, deserialize_with = "deserialize_opt_id")]
    pub user_id: Option<String>,
    #[serde(default)]
    pub msg: Option<String>,
}

/// Ids arrive as strings from some deployments and numbers from others.
fn deserialize_opt_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(Value::Number(n)) => Ok(Some(n.to_string())),
        Some(other) => Err(serde::de::Error::custom(format!("expected string or number id, got {other}"))),
    }
}

/// Pull the server's reason out of an error body: `message` first, then `msg`.
#[must_use]
pub fn extract_error_message(body: &str) -> Option<String> {
    let json: Value = serde_json::from_str(body).ok()?;
    ["message", "msg"]
        .iter()
        .filter_map(|key| json.get(key).and_then(Value::as_str))
        .map(str::trim)
        .find(|m| !m.is_empty())
        .map(str::to_owned)
}

// =============================================================================
// PORT
// =============================================================================

/// Backend calls the session store depends on.
#[async_trait::async_trait]
pub trait AuthBackend: Send + Sync {
    /// Exchange credentials for a session token.
    async fn login(&self, credentials: &Credentials) -> Result<LoginResponse, AuthError>;

    /// Validate the current token and describe its owner.
    async fn whoami(&self) -> Result<WhoAmIResponse, AuthError>;
}

// =============================================================================
// HTTP IMPLEMENTATION
// =============================================================================

/// [`AuthBackend`] over an [`ApiClient`]. The client's bearer stage supplies
/// the token for `whoami`; this type never handles tokens itself.
#[derive(Debug, Clone)]
pub struct HttpAuthBackend {
    client: ApiClient,
}

impl HttpAuthBackend {
    #[must_use]
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }
}

#[async_trait::async_trait]
impl AuthBackend for HttpAuthBackend {
    async fn login(&self, credentials: &Credentials) -> Result<LoginResponse, AuthError> {
        let response = self
            .client
            .send_raw(Method::POST, LOGIN_PATH, Some(credentials))
            .await
            .map_err(AuthError::from)?;
        parse_success(response)
    }

    async fn whoami(&self) -> Result<WhoAmIResponse, AuthError> {
        let response = self
            .client
            .send_raw(Method::GET, WHOAMI_PATH, None::<&Value>)
            .await
            .map_err(AuthError::from)?;
        parse_success(response)
    }
}

fn parse_success<T: serde::de::DeserializeOwned>(response: RawResponse) -> Result<T, AuthError> {
    if !response.is_success() {
        return Err(AuthError::Rejected { status: response.status, message: extract_error_message(&response.body) });
    }
    serde_json::from_str(&response.body).map_err(|e| AuthError::Invalid(e.to_string()))
}
