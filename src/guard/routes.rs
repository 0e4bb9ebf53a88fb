//! The admin console's route table.

#[cfg(test)]
#[path = "routes_test.rs"]
mod tests;

use super::decision::RouteRequirement;
use super::table::{RouteNode, RouteTable};
use crate::session::Role;

/// Screens any signed-in operator may open, in sidebar order.
const OPERATOR_VIEWS: &[&str] = &[
    "create_itinerary",
    "itinerary_list",
    "itinerary_list/itinerary_details/:id",
    "image_gallery",
    "view_image_gallery",
    "customer_gallery",
    "terms_and_conditions",
    "payment_mode",
    "cancellation_policy",
    "hero_video",
    "video_testimonials_upload",
    "create_blog",
    "create_blog/:id",
    "blogs_list",
    "users_list",
    "suggestions",
    "subscribe",
    "contact_list",
    "plan_journey_list",
    "create_city",
    "destination_list",
];

/// Screens restricted to admins.
const ADMIN_VIEWS: &[&str] = &["create_destination", "add_user"];

/// View name for a route path: its literal segments, params dropped.
fn view_name(path: &str) -> String {
    path.split('/')
        .filter(|s| !s.is_empty() && !s.starts_with(':'))
        .collect::<Vec<_>>()
        .join("/")
}

fn leaf(path: &str) -> RouteNode {
    RouteNode::path(path).view(view_name(path))
}

/// Public `login` and `unauthorized`, everything else behind authentication,
/// and destination/user creation additionally limited to admins.
#[must_use]
pub fn admin_console_routes() -> RouteTable {
    let admin_only = RouteNode::layout()
        .guarded(RouteRequirement::roles([Role::Admin]))
        .children(ADMIN_VIEWS.iter().copied().map(leaf));

    let shell = RouteNode::path("/")
        .view("layout")
        .child(RouteNode::index().view("dashboard"))
        .children(OPERATOR_VIEWS.iter().copied().map(leaf))
        .child(admin_only);

    RouteTable::new(vec![
        RouteNode::path("login").view("login"),
        RouteNode::path("unauthorized").view("unauthorized"),
        RouteNode::layout()
            .guarded(RouteRequirement::authenticated())
            .child(shell),
    ])
}
