//! Admin console session core.
//!
//! ARCHITECTURE
//! ============
//! The console's CRUD screens all consume one contract: a session store that
//! owns authentication state, an HTTP client whose bearer stage stamps the
//! current token on every request, and a route guard that decides what a
//! navigation may show. This crate is that contract.
//!
//! ```text
//! SessionStore ──writes──▶ SessionHandle ◀──reads── BearerAuthorizer (ApiClient stage)
//!                                   ▲
//!                                   └──────reads── guard::RouteTable::resolve
//! ```

pub mod config;
pub mod console;
pub mod guard;
pub mod http;
pub mod notify;
pub mod session;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use config::{ConfigError, ConsoleConfig, HttpTimeouts};
pub use console::AdminConsole;
pub use guard::{Decision, Resolution, RouteEntry, RouteNode, RouteRequirement, RouteTable};
pub use http::{ApiClient, ApiError, BearerAuthorizer, HeaderStage, HeaderStageError, RequestStage};
pub use notify::{Notification, NotificationLevel, Notifier, TracingNotifier};
pub use session::{
    AuthBackend, AuthError, Credentials, FileStorage, HttpAuthBackend, MemoryStorage, PersistedSession, Role,
    Session, SessionHandle, SessionPhase, SessionStorage, SessionStore, StorageError,
};
