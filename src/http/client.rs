//! Base-URL-bound backend client.
//!
//! ERROR HANDLING
//! ==============
//! `send_raw` only fails on transport errors and hands back status + body so
//! callers that interpret rejections themselves (the auth backend) can read
//! the server's message. The JSON helpers turn non-2xx into
//! [`ApiError::Status`].

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;

use std::sync::Arc;
use std::time::Duration;

use reqwest::{Method, RequestBuilder};
use serde::Serialize;
use serde_json::Value;

use super::stage::RequestStage;
use crate::config::{ConsoleConfig, HttpTimeouts, normalize_base_url};

// =============================================================================
// ERROR
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("invalid base URL: {0}")]
    InvalidBaseUrl(String),

    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),

    #[error("http request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The backend answered with a non-success status.
    #[error("server returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("invalid JSON payload: {0}")]
    Json(#[from] serde_json::Error),
}

// =============================================================================
// RESPONSE
// =============================================================================

/// Status and body of a settled request, success or not.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

impl RawResponse {
    #[must_use]
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Parse the body as JSON; an empty body is `Value::Null`.
    ///
    /// # Errors
    ///
    /// Returns an error if the body is non-empty and not valid JSON.
    pub fn json(&self) -> Result<Value, serde_json::Error> {
        if self.body.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&self.body)
    }
}

// =============================================================================
// CLIENT
// =============================================================================

#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    stages: Vec<Arc<dyn RequestStage>>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let stages: Vec<_> = self.stages.iter().map(|s| s.name()).collect();
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url)
            .field("stages", &stages)
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    /// Build a client for `base_url` with a cookie store and the given timeouts.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL is not http(s) or the HTTP client fails to build.
    pub fn new(base_url: &str, timeouts: HttpTimeouts) -> Result<Self, ApiError> {
        let base_url = normalize_base_url(base_url).map_err(|_| ApiError::InvalidBaseUrl(base_url.to_owned()))?;
        let http = reqwest::Client::builder()
            .cookie_store(true)
            .timeout(Duration::from_secs(timeouts.request_secs))
            .connect_timeout(Duration::from_secs(timeouts.connect_secs))
            .build()
            .map_err(|e| ApiError::HttpClientBuild(e.to_string()))?;
        Ok(Self { http, base_url, stages: Vec::new() })
    }

    /// Build a client from a parsed console config.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to build.
    pub fn from_config(config: &ConsoleConfig) -> Result<Self, ApiError> {
        Self::new(&config.api_base_url, config.timeouts)
    }

    /// Append a stage; stages run in the order they were added.
    #[must_use]
    pub fn with_stage(mut self, stage: impl RequestStage + 'static) -> Self {
        self.stages.push(Arc::new(stage));
        self
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Absolute URL for a backend path; a missing leading `/` is added.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    /// A request builder with every stage applied.
    #[must_use]
    pub fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let builder = self.http.request(method, self.url(path));
        self.stages
            .iter()
            .fold(builder, |builder, stage| stage.apply(builder))
    }

    /// Send a request with an optional JSON body and return status + body.
    ///
    /// # Errors
    ///
    /// Returns an error only when the request cannot be sent or the body
    /// cannot be read.
    pub async fn send_raw<B>(&self, method: Method, path: &str, body: Option<&B>) -> Result<RawResponse, ApiError>
    where
        B: Serialize + ?Sized,
    {
        let request = self.request(method.clone(), path);
        let request = if let Some(json) = body { request.json(json) } else { request };

        tracing::debug!(%method, path, "backend request");
        let response = request.send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;
        tracing::debug!(%method, path, status, "backend response");

        Ok(RawResponse { status, body })
    }

    /// `GET` a path and parse the JSON response.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure, non-2xx status, or bad JSON.
    pub async fn get(&self, path: &str) -> Result<Value, ApiError> {
        let response = self.send_raw(Method::GET, path, None::<&Value>).await?;
        into_json(response)
    }

    /// `POST` a JSON body and parse the JSON response.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure, non-2xx status, or bad JSON.
    pub async fn post_json<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<Value, ApiError> {
        let response = self.send_raw(Method::POST, path, Some(body)).await?;
        into_json(response)
    }

    /// `PATCH` a JSON body and parse the JSON response.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure, non-2xx status, or bad JSON.
    pub async fn patch_json<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<Value, ApiError> {
        let response = self.send_raw(Method::PATCH, path, Some(body)).await?;
        into_json(response)
    }

    /// `DELETE` a path and parse the JSON response (`Null` when empty).
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure, non-2xx status, or bad JSON.
    pub async fn delete(&self, path: &str) -> Result<Value, ApiError> {
        let response = self.send_raw(Method::DELETE, path, None::<&Value>).await?;
        into_json(response)
    }
}

fn into_json(response: RawResponse) -> Result<Value, ApiError> {
    if !response.is_success() {
        return Err(ApiError::Status { status: response.status, body: response.body });
    }
    Ok(response.json()?)
}
