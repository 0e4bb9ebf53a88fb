//! Single-requirement evaluation.

#[cfg(test)]
#[path = "decision_test.rs"]
mod tests;

use std::collections::BTreeSet;

use crate::session::{Role, Session};

pub const LOGIN_PATH: &str = "/login";
pub const UNAUTHORIZED_PATH: &str = "/unauthorized";

/// Outcome of gating one navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Initial validation has not settled; show a neutral loading state.
    Loading,
    RedirectLogin,
    RedirectUnauthorized,
    Render,
}

impl Decision {
    /// Where a redirect decision sends the user.
    #[must_use]
    pub fn redirect_path(self) -> Option<&'static str> {
        match self {
            Self::RedirectLogin => Some(LOGIN_PATH),
            Self::RedirectUnauthorized => Some(UNAUTHORIZED_PATH),
            Self::Loading | Self::Render => None,
        }
    }
}

/// Role restriction attached to a protected route.
///
/// `allowed_roles: None` (or an empty set) admits any authenticated role.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteRequirement {
    pub allowed_roles: Option<BTreeSet<Role>>,
}

impl RouteRequirement {
    /// Protected, any role.
    #[must_use]
    pub fn authenticated() -> Self {
        Self::default()
    }

    /// Protected and limited to `roles`.
    pub fn roles(roles: impl IntoIterator<Item = Role>) -> Self {
        Self { allowed_roles: Some(roles.into_iter().collect()) }
    }

    /// Whether a session holding `role` satisfies the restriction.
    #[must_use]
    pub fn permits(&self, role: Option<&Role>) -> bool {
        match &self.allowed_roles {
            Some(allowed) if !allowed.is_empty() => role.is_some_and(|r| allowed.contains(r)),
            _ => true,
        }
    }
}

/// Gate one navigation: loading, then login, then role, then render.
#[must_use]
pub fn evaluate(session: &Session, requirement: &RouteRequirement) -> Decision {
    if !session.auth_checked {
        Decision::Loading
    } else if !session.is_logged_in {
        Decision::RedirectLogin
    } else if !requirement.permits(session.role.as_ref()) {
        Decision::RedirectUnauthorized
    } else {
        Decision::Render
    }
}
