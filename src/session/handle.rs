//! Shared, cheaply clonable view of the live session.
//!
//! The lock is a std `RwLock` and is never held across an await point. Writers
//! recover from poisoning so the store keeps working; the token read used by
//! the request authorizer gives up instead.

use std::sync::{Arc, PoisonError, RwLock};

use super::model::Session;

#[derive(Debug, Clone, Default)]
pub struct SessionHandle {
    inner: Arc<RwLock<Session>>,
}

impl SessionHandle {
    #[must_use]
    pub fn new(session: Session) -> Self {
        Self { inner: Arc::new(RwLock::new(session)) }
    }

    /// Copy of the current session state.
    #[must_use]
    pub fn snapshot(&self) -> Session {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Current bearer token, or `None` when absent or the lock is poisoned.
    #[must_use]
    pub fn try_token(&self) -> Option<String> {
        let guard = self.inner.read().ok()?;
        guard.bearer_token().map(str::to_owned)
    }

    pub(crate) fn update<R>(&self, f: impl FnOnce(&mut Session) -> R) -> R {
        let mut guard = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        f(&mut guard)
    }

    pub(crate) fn replace(&self, session: Session) {
        self.update(|s| *s = session);
    }
}
