//! Session data types and the persisted subset.

#[cfg(test)]
#[path = "model_test.rs"]
mod tests;

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// =============================================================================
// ROLE
// =============================================================================

/// Backend-assigned role. Unknown role strings are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Role {
    Admin,
    User,
    Other(String),
}

impl Role {
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Admin => "admin",
            Self::User => "user",
            Self::Other(raw) => raw,
        }
    }
}

impl From<&str> for Role {
    /// Exact match only; any other spelling is an unknown role.
    fn from(raw: &str) -> Self {
        match raw {
            "admin" => Self::Admin,
            "user" => Self::User,
            _ => Self::Other(raw.to_owned()),
        }
    }
}

impl From<String> for Role {
    fn from(raw: String) -> Self {
        Self::from(raw.as_str())
    }
}

impl From<Role> for String {
    fn from(role: Role) -> Self {
        match role {
            Role::Other(raw) => raw,
            known => known.as_str().to_owned(),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// CREDENTIALS
// =============================================================================

/// Login form payload posted to the admin login endpoint.
///
/// `username` and `password` are always sent; `extra` fields are merged into
/// the same JSON object.
#[derive(Clone, PartialEq, Eq, Serialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self { username: username.into(), password: password.into(), extra: Map::new() }
    }

    /// Add one more form field to the login body.
    #[must_use]
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("extra", &self.extra.keys().collect::<Vec<_>>())
            .finish()
    }
}

// =============================================================================
// SESSION
// =============================================================================

/// Coarse lifecycle position derived from [`Session`] flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// Initial validation has not finished; routing must wait.
    Uninitialized,
    Anonymous,
    Authenticated,
}

/// Full in-memory session: durable fields plus transient status flags.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    pub is_logged_in: bool,
    pub role: Option<Role>,
    /// Username after login, user id after whoami validation.
    pub identity: Option<String>,
    pub token: Option<String>,
    /// Set once the first validation pass settles; never cleared.
    pub auth_checked: bool,
    /// An auth call is outstanding.
    pub loading: bool,
    pub error: Option<String>,
}

impl Session {
    /// Rebuild a session from its persisted subset. Transient flags start at
    /// their defaults, and a persisted login without a usable token is dropped.
    #[must_use]
    pub fn hydrate(persisted: PersistedSession) -> Self {
        let token = persisted.token.filter(|t| !t.is_empty());
        let is_logged_in = persisted.is_logged_in && token.is_some();
        Self {
            is_logged_in,
            role: persisted.role,
            identity: persisted.username,
            token,
            ..Self::default()
        }
    }

    /// The subset written to durable storage.
    #[must_use]
    pub fn persisted(&self) -> PersistedSession {
        PersistedSession {
            token: self.token.clone(),
            role: self.role.clone(),
            username: self.identity.clone(),
            is_logged_in: self.is_logged_in,
        }
    }

    #[must_use]
    pub fn phase(&self) -> SessionPhase {
        if !self.auth_checked {
            SessionPhase::Uninitialized
        } else if self.is_logged_in {
            SessionPhase::Authenticated
        } else {
            SessionPhase::Anonymous
        }
    }

    /// The bearer token, if present and non-empty.
    #[must_use]
    pub fn bearer_token(&self) -> Option<&str> {
        self.token.as_deref().filter(|t| !t.is_empty())
    }

    /// Drop every identity-bearing field. Status flags are left alone.
    pub(crate) fn clear_credentials(&mut self) {
        self.is_logged_in = false;
        self.role = None;
        self.identity = None;
        self.token = None;
        self.error = None;
    }
}

/// Durable `auth-storage` record: exactly `{ token, role, username, isLoggedIn }`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PersistedSession {
    pub token: Option<String>,
    pub role: Option<Role>,
    pub username: Option<String>,
    pub is_logged_in: bool,
}
