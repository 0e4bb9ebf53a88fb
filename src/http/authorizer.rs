//! Bearer-token request stage.
//!
//! Reads the session token at send time, so a login or logout that lands
//! between two requests is reflected immediately without rebuilding the
//! client. A missing token, a poisoned session lock, or a token that is not a
//! legal header value all degrade to sending the request without the header.

#[cfg(test)]
#[path = "authorizer_test.rs"]
mod tests;

use reqwest::RequestBuilder;
use reqwest::header::{AUTHORIZATION, HeaderValue};

use super::stage::RequestStage;
use crate::session::SessionHandle;

#[derive(Debug, Clone)]
pub struct BearerAuthorizer {
    session: SessionHandle,
}

impl BearerAuthorizer {
    #[must_use]
    pub fn new(session: SessionHandle) -> Self {
        Self { session }
    }

    /// The `Authorization` value for the current session, if any.
    #[must_use]
    pub fn header_value(&self) -> Option<HeaderValue> {
        let token = self.session.try_token()?;
        match HeaderValue::from_str(&format!("Bearer {token}")) {
            Ok(mut value) => {
                value.set_sensitive(true);
                Some(value)
            }
            Err(e) => {
                tracing::warn!(error = %e, "session token is not a valid header value; sending unauthenticated");
                None
            }
        }
    }
}

impl RequestStage for BearerAuthorizer {
    fn name(&self) -> &'static str {
        "bearer"
    }

    fn apply(&self, request: RequestBuilder) -> RequestBuilder {
        match self.header_value() {
            Some(value) => request.header(AUTHORIZATION, value),
            None => request,
        }
    }
}
