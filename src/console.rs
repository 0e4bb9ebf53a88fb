//! Console wiring: one session, one authorized client, one route table.
//!
//! STARTUP
//! =======
//! `AdminConsole::open` hydrates the persisted session, and `start` runs the
//! one-time token validation. Until `start` settles, protected routes
//! resolve to [`Decision::Loading`](crate::guard::Decision::Loading).

#[cfg(test)]
#[path = "console_test.rs"]
mod tests;

use std::sync::Arc;

use crate::config::ConsoleConfig;
use crate::guard::{Resolution, RouteTable, admin_console_routes};
use crate::http::{ApiClient, ApiError, BearerAuthorizer};
use crate::notify::Notifier;
use crate::session::{Credentials, FileStorage, HttpAuthBackend, SessionHandle, SessionStorage, SessionStore};

pub struct AdminConsole {
    store: SessionStore,
    client: ApiClient,
    routes: RouteTable,
}

impl AdminConsole {
    /// Wire a console around `client`.
    ///
    /// The bearer stage is appended after any stages `client` already has,
    /// and the auth backend shares the same pipeline.
    pub fn new(client: ApiClient, storage: Arc<dyn SessionStorage>, notifier: Arc<dyn Notifier>) -> Self {
        let handle = SessionHandle::default();
        let client = client.with_stage(BearerAuthorizer::new(handle.clone()));
        let backend = Arc::new(HttpAuthBackend::new(client.clone()));
        let store = SessionStore::new(handle, backend, storage, notifier);
        Self { store, client, routes: admin_console_routes() }
    }

    /// Console backed by the config's base URL and on-disk session file.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn open(config: &ConsoleConfig, notifier: Arc<dyn Notifier>) -> Result<Self, ApiError> {
        let client = ApiClient::from_config(config)?;
        let storage = Arc::new(FileStorage::in_dir(&config.session_dir));
        tracing::debug!(base_url = %client.base_url(), storage = %storage.path().display(), "opening console");
        Ok(Self::new(client, storage, notifier))
    }

    /// Replace the route table.
    #[must_use]
    pub fn with_routes(mut self, routes: RouteTable) -> Self {
        self.routes = routes;
        self
    }

    /// Validate the persisted token, if any.
    pub async fn start(&self) {
        self.store.check_auth_on_load().await;
    }

    pub async fn login(&self, username: &str, password: &str) -> bool {
        self.store.login(&Credentials::new(username, password)).await
    }

    pub fn logout(&self) {
        self.store.logout();
    }

    /// Resolve a navigation against the current session.
    #[must_use]
    pub fn navigate(&self, path: &str) -> Resolution {
        self.routes.resolve(&self.store.snapshot(), path)
    }

    #[must_use]
    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    /// The authorized client for data calls.
    #[must_use]
    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    #[must_use]
    pub fn routes(&self) -> &RouteTable {
        &self.routes
    }
}
