//! HTTP layer: the backend client and its request stages.
//!
//! DESIGN
//! ======
//! Every backend call goes through [`ApiClient`]. The client is bound to one
//! base URL, keeps a cookie store so credentials ride along, and runs an
//! ordered list of [`RequestStage`]s over each request right before it is
//! sent. [`BearerAuthorizer`] is the stage that reads the live session token.

pub mod authorizer;
pub mod client;
pub mod stage;

pub use authorizer::BearerAuthorizer;
pub use client::{ApiClient, ApiError, RawResponse};
pub use stage::{HeaderStage, HeaderStageError, RequestStage};
