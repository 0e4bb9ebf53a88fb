//! Composable request stages.

#[cfg(test)]
#[path = "stage_test.rs"]
mod tests;

use reqwest::RequestBuilder;
use reqwest::header::{HeaderName, HeaderValue, InvalidHeaderName, InvalidHeaderValue};

/// A transform applied to every outgoing request, in registration order.
///
/// Stages must not fail: a stage that cannot do its job returns the builder
/// unchanged.
pub trait RequestStage: Send + Sync {
    /// Short label used in logs.
    fn name(&self) -> &'static str;

    fn apply(&self, request: RequestBuilder) -> RequestBuilder;
}

/// Adds one fixed header to every request.
#[derive(Debug, Clone)]
pub struct HeaderStage {
    name: HeaderName,
    value: HeaderValue,
}

#[derive(Debug, thiserror::Error)]
pub enum HeaderStageError {
    #[error("invalid header name: {0}")]
    Name(#[from] InvalidHeaderName),
    #[error("invalid header value: {0}")]
    Value(#[from] InvalidHeaderValue),
    #[error("expected `name: value`, got {0:?}")]
    Format(String),
}

impl HeaderStage {
    #[must_use]
    pub fn new(name: HeaderName, value: HeaderValue) -> Self {
        Self { name, value }
    }

    /// Parse a `name: value` pair as given on a command line.
    ///
    /// # Errors
    ///
    /// Returns an error if the separator is missing or either half is not a
    /// legal header token.
    pub fn parse(raw: &str) -> Result<Self, HeaderStageError> {
        let (name, value) = raw
            .split_once(':')
            .ok_or_else(|| HeaderStageError::Format(raw.to_owned()))?;
        let name = HeaderName::from_bytes(name.trim().as_bytes())?;
        let value = HeaderValue::from_str(value.trim())?;
        Ok(Self { name, value })
    }

    #[must_use]
    pub fn header_name(&self) -> &HeaderName {
        &self.name
    }
}

impl RequestStage for HeaderStage {
    fn name(&self) -> &'static str {
        "header"
    }

    fn apply(&self, request: RequestBuilder) -> RequestBuilder {
        request.header(self.name.clone(), self.value.clone())
    }
}
