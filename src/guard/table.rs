//! Route tree matching.
//!
//! Matching follows the console router's rules: pathless layout nodes only
//! contribute their requirement, index nodes match when nothing is left of
//! the path, `:name` segments capture one path segment, and siblings are
//! tried in declaration order.

#[cfg(test)]
#[path = "table_test.rs"]
mod tests;

use std::collections::BTreeMap;

use super::decision::{Decision, RouteRequirement, evaluate};
use crate::session::{Role, Session};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Param(String),
}

fn parse_segments(path: &str) -> Vec<Segment> {
    split_path(path)
        .into_iter()
        .map(|seg| match seg.strip_prefix(':') {
            Some(name) => Segment::Param(name.to_owned()),
            None => Segment::Literal(seg.to_owned()),
        })
        .collect()
}

/// Path segments with query, fragment, and empty segments dropped.
fn split_path(path: &str) -> Vec<&str> {
    let end = path.find(['?', '#']).unwrap_or(path.len());
    path[..end].split('/').filter(|s| !s.is_empty()).collect()
}

// =============================================================================
// ROUTE NODE
// =============================================================================

/// One entry in the route tree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteNode {
    segments: Vec<Segment>,
    pathless: bool,
    index: bool,
    view: Option<String>,
    requirement: Option<RouteRequirement>,
    children: Vec<RouteNode>,
}

impl RouteNode {
    /// A node matching `path` relative to its parent; `/` consumes no segments.
    #[must_use]
    pub fn path(path: &str) -> Self {
        Self { segments: parse_segments(path), ..Self::default() }
    }

    /// A node that consumes no path and never matches on its own.
    #[must_use]
    pub fn layout() -> Self {
        Self { pathless: true, ..Self::default() }
    }

    /// A node that matches when the parent consumed the whole path.
    #[must_use]
    pub fn index() -> Self {
        Self { index: true, ..Self::default() }
    }

    #[must_use]
    pub fn view(mut self, name: impl Into<String>) -> Self {
        self.view = Some(name.into());
        self
    }

    #[must_use]
    pub fn guarded(mut self, requirement: RouteRequirement) -> Self {
        self.requirement = Some(requirement);
        self
    }

    #[must_use]
    pub fn child(mut self, node: RouteNode) -> Self {
        self.children.push(node);
        self
    }

    #[must_use]
    pub fn children(mut self, nodes: impl IntoIterator<Item = RouteNode>) -> Self {
        self.children.extend(nodes);
        self
    }

    fn pattern(&self) -> String {
        self.segments
            .iter()
            .map(|s| match s {
                Segment::Literal(l) => l.clone(),
                Segment::Param(p) => format!(":{p}"),
            })
            .collect::<Vec<_>>()
            .join("/")
    }
}

// =============================================================================
// RESOLUTION
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    NotFound,
    Matched { view: String, params: BTreeMap<String, String>, decision: Decision },
}

impl Resolution {
    #[must_use]
    pub fn decision(&self) -> Option<Decision> {
        match self {
            Self::NotFound => None,
            Self::Matched { decision, .. } => Some(*decision),
        }
    }
}

/// A flattened leaf of the tree, for listings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteEntry {
    pub pattern: String,
    pub view: String,
    pub protected: bool,
    /// Union of non-empty role restrictions on the chain; empty means any role.
    pub roles: Vec<Role>,
}

struct Match<'a> {
    view: &'a str,
    requirements: Vec<&'a RouteRequirement>,
    params: BTreeMap<String, String>,
}

impl<'a> Match<'a> {
    fn gated_by(mut self, node: &'a RouteNode) -> Self {
        if let Some(req) = &node.requirement {
            self.requirements.insert(0, req);
        }
        self
    }
}

fn consume<'r, 's>(pattern: &[Segment], rest: &'r [&'s str]) -> Option<(&'r [&'s str], BTreeMap<String, String>)> {
    if rest.len() < pattern.len() {
        return None;
    }
    let mut params = BTreeMap::new();
    for (segment, actual) in pattern.iter().zip(rest) {
        match segment {
            Segment::Literal(lit) if lit == actual => {}
            Segment::Literal(_) => return None,
            Segment::Param(name) => {
                params.insert(name.clone(), (*actual).to_owned());
            }
        }
    }
    Some((&rest[pattern.len()..], params))
}

fn match_node<'a>(node: &'a RouteNode, rest: &[&str]) -> Option<Match<'a>> {
    let (remaining, params) = consume(&node.segments, rest)?;

    if node.index {
        if !remaining.is_empty() {
            return None;
        }
        let view = node.view.as_deref()?;
        return Some(Match { view, requirements: Vec::new(), params }.gated_by(node));
    }

    for child in &node.children {
        if let Some(mut found) = match_node(child, remaining) {
            found.params.extend(params);
            return Some(found.gated_by(node));
        }
    }

    if remaining.is_empty() && !node.pathless {
        if let Some(view) = node.view.as_deref() {
            return Some(Match { view, requirements: Vec::new(), params }.gated_by(node));
        }
    }
    None
}

// =============================================================================
// TABLE
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteTable {
    roots: Vec<RouteNode>,
}

impl RouteTable {
    #[must_use]
    pub fn new(roots: Vec<RouteNode>) -> Self {
        Self { roots }
    }

    /// Match `path` and gate it against `session`.
    #[must_use]
    pub fn resolve(&self, session: &Session, path: &str) -> Resolution {
        let segments = split_path(path);
        let Some(found) = self.roots.iter().find_map(|root| match_node(root, &segments)) else {
            return Resolution::NotFound;
        };

        let decision = found
            .requirements
            .iter()
            .map(|req| evaluate(session, req))
            .find(|d| *d != Decision::Render)
            .unwrap_or(Decision::Render);

        Resolution::Matched { view: found.view.to_owned(), params: found.params, decision }
    }

    /// Every routable view with its full pattern and gating summary.
    #[must_use]
    pub fn entries(&self) -> Vec<RouteEntry> {
        let mut out = Vec::new();
        for root in &self.roots {
            collect_entries(root, &[], &[], &mut out);
        }
        out
    }
}

fn collect_entries<'a>(node: &'a RouteNode, prefix: &[String], chain: &[&'a RouteRequirement], out: &mut Vec<RouteEntry>) {
    let mut prefix = prefix.to_vec();
    let own = node.pattern();
    if !own.is_empty() {
        prefix.push(own);
    }
    let mut chain = chain.to_vec();
    if let Some(req) = &node.requirement {
        chain.push(req);
    }

    let routable = node.index || (!node.pathless && node.children.iter().all(|c| !c.index));
    if let (true, Some(view)) = (routable, node.view.as_deref()) {
        let mut roles: Vec<Role> = chain
            .iter()
            .filter_map(|r| r.allowed_roles.as_ref())
            .flatten()
            .cloned()
            .collect();
        roles.sort();
        roles.dedup();
        out.push(RouteEntry {
            pattern: format!("/{}", prefix.join("/")),
            view: view.to_owned(),
            protected: !chain.is_empty(),
            roles,
        });
    }

    for child in &node.children {
        collect_entries(child, &prefix, &chain, out);
    }
}
