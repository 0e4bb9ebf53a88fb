//! Session state, persistence, and transitions.
//!
//! DESIGN
//! ======
//! `SessionStore` is the only writer. It owns the backend port (login and
//! whoami calls), the storage port (durable `auth-storage` record), and a
//! notifier for user-facing toasts. Everything else reads through a cloned
//! [`SessionHandle`].
//!
//! STATE MACHINE
//! =============
//! `Uninitialized` (nothing validated yet) settles into `Anonymous` or
//! `Authenticated` after `check_auth_on_load`, `login`, or `logout`, and never
//! returns to `Uninitialized` for the life of the process.

pub mod backend;
pub mod handle;
pub mod model;
pub mod storage;
pub mod store;

pub use backend::{AuthBackend, AuthError, HttpAuthBackend, LoginResponse, WhoAmIResponse};
pub use handle::SessionHandle;
pub use model::{Credentials, PersistedSession, Role, Session, SessionPhase};
pub use storage::{FileStorage, MemoryStorage, STORAGE_NAME, SessionStorage, StorageError};
pub use store::SessionStore;
