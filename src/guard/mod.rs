//! Route guard: what a navigation is allowed to show.
//!
//! DESIGN
//! ======
//! Routes are plain data: a tree of [`RouteNode`]s, each optionally carrying
//! a [`RouteRequirement`]. [`RouteTable::resolve`] matches a path, collects
//! the requirements along the matched chain, and evaluates them top-down with
//! [`evaluate`]. The first non-render decision wins. The guard only reads the
//! session.

pub mod decision;
pub mod routes;
pub mod table;

pub use decision::{Decision, LOGIN_PATH, RouteRequirement, UNAUTHORIZED_PATH, evaluate};
pub use routes::admin_console_routes;
pub use table::{Resolution, RouteEntry, RouteNode, RouteTable};
