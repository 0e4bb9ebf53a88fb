//! The session store: the only writer of session state.
//!
//! ERROR HANDLING
//! ==============
//! Nothing here returns a backend error. `login` folds every failure into a
//! `false` return plus the session's `error` field; `check_auth_on_load`
//! folds every failure into `logout`. Storage write failures are logged and
//! the in-memory transition still happens.
//!
//! CONCURRENCY
//! ===========
//! `login` and `check_auth_on_load` share one in-flight slot. A `login` that
//! arrives while either is outstanding is refused without touching state; a
//! second `check_auth_on_load` is a no-op. `logout` is never blocked, and a
//! response that lands after a `logout` is still applied.

#[cfg(test)]
#[path = "store_test.rs"]
mod tests;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use super::backend::{AuthBackend, AuthError, LoginResponse};
use super::handle::SessionHandle;
use super::model::{Credentials, Session, SessionPhase};
use super::storage::SessionStorage;
use crate::notify::{Notification, Notifier};

pub const LOGIN_SUCCESS_MESSAGE: &str = "Login successful";
pub const LOGIN_FAILED_MESSAGE: &str = "Login failed";
pub const LOGOUT_MESSAGE: &str = "Logged out successfully";
pub const SESSION_VALID_MESSAGE: &str = "Session is valid.";

pub struct SessionStore {
    handle: SessionHandle,
    backend: Arc<dyn AuthBackend>,
    storage: Arc<dyn SessionStorage>,
    notifier: Arc<dyn Notifier>,
    in_flight: AtomicBool,
}

/// Releases the in-flight slot on drop, so every exit path frees it.
struct InFlight<'a>(&'a AtomicBool);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl SessionStore {
    /// Create the store and hydrate `handle` from `storage`.
    ///
    /// An unreadable record is logged and treated as no record.
    pub fn new(
        handle: SessionHandle,
        backend: Arc<dyn AuthBackend>,
        storage: Arc<dyn SessionStorage>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let persisted = match storage.load() {
            Ok(record) => record.unwrap_or_default(),
            Err(e) => {
                tracing::warn!(error = %e, "persisted session unreadable; starting anonymous");
                Default::default()
            }
        };
        let session = Session::hydrate(persisted);
        tracing::debug!(has_token = session.bearer_token().is_some(), "session hydrated");
        handle.replace(session);

        Self { handle, backend, storage, notifier, in_flight: AtomicBool::new(false) }
    }

    /// Shared read handle for the authorizer, the guard, and views.
    #[must_use]
    pub fn handle(&self) -> SessionHandle {
        self.handle.clone()
    }

    #[must_use]
    pub fn snapshot(&self) -> Session {
        self.handle.snapshot()
    }

    #[must_use]
    pub fn phase(&self) -> SessionPhase {
        self.handle.snapshot().phase()
    }

    #[must_use]
    pub fn token(&self) -> Option<String> {
        self.handle.snapshot().bearer_token().map(str::to_owned)
    }

    /// Whether a `login` or `check_auth_on_load` call is outstanding.
    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    fn begin(&self) -> Option<InFlight<'_>> {
        self.in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| InFlight(&self.in_flight))
    }

    fn persist(&self) {
        let record = self.handle.snapshot().persisted();
        if let Err(e) = self.storage.save(&record) {
            tracing::warn!(error = %e, "failed to persist session");
        }
    }

    // =========================================================================
    // TRANSITIONS
    // =========================================================================

    /// Authenticate with the backend. Returns `true` on success.
    pub async fn login(&self, credentials: &Credentials) -> bool {
        let Some(_slot) = self.begin() else {
            tracing::warn!(username = %credentials.username, "login refused: another auth call is in flight");
            return false;
        };

        self.handle.update(|s| {
            s.loading = true;
            s.error = None;
        });

        let outcome = self.backend.login(credentials).await.and_then(require_token);
        match outcome {
            Ok(granted) => {
                let message = granted
                    .response
                    .msg
                    .clone()
                    .filter(|m| !m.trim().is_empty())
                    .unwrap_or_else(|| LOGIN_SUCCESS_MESSAGE.to_owned());
                self.handle.update(|s| {
                    s.is_logged_in = true;
                    s.role = granted.response.role;
                    s.identity = granted.response.username;
                    s.token = Some(granted.token);
                    s.loading = false;
                    s.error = None;
                    s.auth_checked = true;
                });
                self.persist();
                tracing::info!(username = %credentials.username, "login succeeded");
                self.notifier.notify(Notification::success(message));
                true
            }
            Err(err) => {
                let message = err
                    .server_message()
                    .map_or_else(|| LOGIN_FAILED_MESSAGE.to_owned(), str::to_owned);
                self.handle.update(|s| {
                    s.error = Some(message.clone());
                    s.loading = false;
                    s.auth_checked = true;
                });
                tracing::warn!(username = %credentials.username, error = %err, "login failed");
                self.notifier.notify(Notification::error(message));
                false
            }
        }
    }

    /// Forget the session locally. Contacts no endpoint.
    pub fn logout(&self) {
        self.handle.update(|s| {
            s.clear_credentials();
            s.auth_checked = true;
        });
        self.persist();
        tracing::info!("logged out");
        self.notifier.notify(Notification::success(LOGOUT_MESSAGE));
    }

    /// Validate a persisted token at startup.
    ///
    /// Without a token this settles to anonymous with no network call. With
    /// one, a successful whoami refreshes role and identity; any failure
    /// clears the session through [`Self::logout`].
    pub async fn check_auth_on_load(&self) {
        if self.handle.snapshot().bearer_token().is_none() {
            self.handle.update(|s| s.auth_checked = true);
            tracing::debug!("no persisted token; session is anonymous");
            return;
        }

        let Some(_slot) = self.begin() else {
            tracing::debug!("auth check skipped: another auth call is in flight");
            return;
        };

        self.handle.update(|s| s.loading = true);

        match self.backend.whoami().await {
            Ok(me) => {
                self.handle.update(|s| {
                    s.is_logged_in = true;
                    s.role = me.role;
                    s.identity = me.user_id;
                    s.loading = false;
                    s.auth_checked = true;
                });
                self.persist();
                let server_msg = me.msg.as_deref().unwrap_or(SESSION_VALID_MESSAGE);
                tracing::info!(server_msg, "persisted session validated");
            }
            Err(err) => {
                let reason = err.server_message().map_or_else(|| err.to_string(), str::to_owned);
                tracing::warn!(%reason, "auth check failed");
                self.handle.update(|s| s.loading = false);
                self.logout();
            }
        }
    }
}

/// A login response that carries a usable token.
struct Granted {
    token: String,
    response: LoginResponse,
}

fn require_token(mut response: LoginResponse) -> Result<Granted, AuthError> {
    match response.token.take().filter(|t| !t.is_empty()) {
        Some(token) => Ok(Granted { token, response }),
        None => Err(AuthError::Invalid("login response missing token".into())),
    }
}
