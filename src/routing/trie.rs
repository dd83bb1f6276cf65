//! Segment trie.
//!
//! # Responsibilities
//! - Store route entries keyed by path segments, then by method
//! - Reject duplicate and ambiguous registrations before touching the tree
//! - Resolve a split request path to a terminal node and its params
//!
//! # Design Decisions
//! - Precedence per level: static, then param, then wildcard
//! - A dead end under a static child backtracks into the param and
//!   wildcard children of the same level
//! - A node that matches the path but not the method is also a dead end
//!   while some other branch serves the method; it only decides a 405
//!   when no branch does
//! - Nodes are never removed

use std::collections::HashMap;
use std::sync::Arc;

use axum::http::Method;

use crate::http::handler::Handler;
use crate::http::middleware::MiddlewareChain;
use crate::routing::error::RouterError;
use crate::routing::params::Params;
use crate::routing::path::Segment;

/// A registered route: its pattern, the chain it was registered with and
/// the handler with that chain already composed around it.
#[derive(Debug, Clone)]
pub struct RouteEntry {
    pattern: Arc<str>,
    chain: MiddlewareChain,
    composed: Handler,
}

impl RouteEntry {
    pub fn new(pattern: impl Into<Arc<str>>, handler: Handler, chain: MiddlewareChain) -> Self {
        let composed = chain.then(handler);
        Self {
            pattern: pattern.into(),
            chain,
            composed,
        }
    }

    /// The full pattern the route was registered under.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Middleware wrapping this route, outermost first.
    pub fn chain(&self) -> &MiddlewareChain {
        &self.chain
    }

    /// The handler with its chain applied.
    pub fn handler(&self) -> &Handler {
        &self.composed
    }
}

#[derive(Debug, Clone, Default)]
pub(crate) struct Node {
    statics: HashMap<String, Node>,
    param: Option<(String, Box<Node>)>,
    wildcard: Option<(String, Box<Node>)>,
    routes: HashMap<Method, RouteEntry>,
}

impl Node {
    /// Walk `segments` without mutating, reporting what `insert` would reject.
    pub(crate) fn check(
        &self,
        method: &Method,
        path: &str,
        segments: &[Segment],
    ) -> Result<(), RouterError> {
        let Some((first, rest)) = segments.split_first() else {
            if self.routes.contains_key(method) {
                return Err(RouterError::DuplicateRoute {
                    method: method.clone(),
                    path: path.to_string(),
                });
            }
            return Ok(());
        };

        let (slot, name) = match first {
            Segment::Static(text) => {
                return match self.statics.get(text) {
                    Some(child) => child.check(method, path, rest),
                    None => Ok(()),
                };
            }
            Segment::Param(name) => (&self.param, name),
            Segment::Wildcard(name) => (&self.wildcard, name),
        };

        match slot {
            Some((existing, _)) if existing != name => Err(RouterError::AmbiguousSegment {
                path: path.to_string(),
                existing: existing_pattern(first, existing),
                conflicting: first.as_pattern(),
            }),
            Some((_, child)) => child.check(method, path, rest),
            None => Ok(()),
        }
    }

    /// Insert without checking. Callers run [`Node::check`] first.
    pub(crate) fn insert_unchecked(&mut self, method: Method, segments: &[Segment], entry: RouteEntry) {
        let Some((first, rest)) = segments.split_first() else {
            self.routes.insert(method, entry);
            return;
        };

        let child = match first {
            Segment::Static(text) => self.statics.entry(text.clone()).or_default(),
            Segment::Param(name) => {
                &mut *self
                    .param
                    .get_or_insert_with(|| (name.clone(), Box::default()))
                    .1
            }
            Segment::Wildcard(name) => {
                &mut *self
                    .wildcard
                    .get_or_insert_with(|| (name.clone(), Box::default()))
                    .1
            }
        };
        child.insert_unchecked(method, rest, entry);
    }

    /// Check every method of a batch against the tree and against each
    /// other. Nothing is inserted unless the whole batch passes.
    pub(crate) fn check_all<'m>(
        &self,
        methods: impl IntoIterator<Item = &'m Method>,
        path: &str,
        segments: &[Segment],
    ) -> Result<(), RouterError> {
        let mut seen: Vec<&Method> = Vec::new();
        for method in methods {
            if seen.contains(&method) {
                return Err(RouterError::DuplicateRoute {
                    method: method.clone(),
                    path: path.to_string(),
                });
            }
            self.check(method, path, segments)?;
            seen.push(method);
        }
        Ok(())
    }

    /// Insert one entry per method under the same pattern, all or nothing.
    pub(crate) fn insert(
        &mut self,
        path: &str,
        segments: &[Segment],
        routes: Vec<(Method, RouteEntry)>,
    ) -> Result<(), RouterError> {
        self.check_all(routes.iter().map(|(method, _)| method), path, segments)?;
        for (method, entry) in routes {
            self.insert_unchecked(method, segments, entry);
        }
        Ok(())
    }

    /// Find the terminal node for `segments` holding any route, binding
    /// params along the way.
    ///
    /// On `None`, `params` is left as it was on entry.
    pub(crate) fn find<'a>(&'a self, segments: &[&str], params: &mut Params) -> Option<&'a Node> {
        self.find_where(segments, params, &|node: &Node| !node.routes.is_empty())
    }

    /// Resolve `segments` for `method`.
    ///
    /// Branches are tried in precedence order until one serves the method.
    /// Only when none does is the first node matching the path reported,
    /// so its methods can go into an `Allow` header.
    pub(crate) fn lookup(&self, segments: &[&str], method: &Method, head_can_use_get: bool) -> Lookup<'_> {
        let mut params = Params::new();
        let serves = |node: &Node| node.entry_for(method, head_can_use_get).is_some();
        if let Some(node) = self.find_where(segments, &mut params, &serves) {
            if let Some(entry) = node.entry_for(method, head_can_use_get) {
                return Lookup::Matched(entry, params);
            }
        }

        match self.find(segments, &mut Params::new()) {
            Some(node) => Lookup::MethodNotAllowed(node),
            None => Lookup::NotFound,
        }
    }

    fn find_where<'a>(
        &'a self,
        segments: &[&str],
        params: &mut Params,
        accept: &dyn Fn(&Node) -> bool,
    ) -> Option<&'a Node> {
        let Some((first, rest)) = segments.split_first() else {
            return accept(self).then_some(self);
        };

        if let Some(child) = self.statics.get(*first) {
            if let Some(found) = child.find_where(rest, params, accept) {
                return Some(found);
            }
        }

        if !first.is_empty() {
            if let Some((name, child)) = &self.param {
                let mark = params.len();
                params.push(name.as_str(), *first);
                if let Some(found) = child.find_where(rest, params, accept) {
                    return Some(found);
                }
                params.truncate(mark);
            }
        }

        if let Some((name, child)) = &self.wildcard {
            if accept(child) {
                params.push(name.as_str(), segments.join("/"));
                return Some(child);
            }
        }

        None
    }

    /// Entry for `method`, falling back from HEAD to GET when allowed.
    pub(crate) fn entry_for(&self, method: &Method, head_can_use_get: bool) -> Option<&RouteEntry> {
        self.routes.get(method).or_else(|| {
            if head_can_use_get && *method == Method::HEAD {
                self.routes.get(&Method::GET)
            } else {
                None
            }
        })
    }

    pub(crate) fn methods(&self) -> impl Iterator<Item = &Method> {
        self.routes.keys()
    }
}

/// Result of [`Node::lookup`].
#[derive(Debug)]
pub(crate) enum Lookup<'a> {
    Matched(&'a RouteEntry, Params),
    MethodNotAllowed(&'a Node),
    NotFound,
}

fn existing_pattern(segment: &Segment, existing: &str) -> String {
    match segment {
        Segment::Wildcard(_) => format!("*{existing}"),
        _ => format!(":{existing}"),
    }
}

/// Methods registered for a path, in a stable order for the `Allow` header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllowedMethods {
    methods: Vec<Method>,
}

impl AllowedMethods {
    /// Normalize a method list: add HEAD when GET serves it, sort, dedup.
    pub fn new(mut methods: Vec<Method>, head_can_use_get: bool) -> Self {
        if head_can_use_get && methods.contains(&Method::GET) && !methods.contains(&Method::HEAD) {
            methods.push(Method::HEAD);
        }
        methods.sort_by(|a, b| {
            method_order(a)
                .cmp(&method_order(b))
                .then_with(|| a.as_str().cmp(b.as_str()))
        });
        methods.dedup();
        Self { methods }
    }

    pub fn methods(&self) -> &[Method] {
        &self.methods
    }

    pub fn contains(&self, method: &Method) -> bool {
        self.methods.contains(method)
    }

    /// Format as an HTTP `Allow` header value.
    pub fn header_value(&self) -> String {
        self.methods
            .iter()
            .map(Method::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

fn method_order(method: &Method) -> u8 {
    match *method {
        Method::GET => 0,
        Method::HEAD => 1,
        Method::POST => 2,
        Method::PUT => 3,
        Method::DELETE => 4,
        Method::PATCH => 5,
        Method::OPTIONS => 6,
        Method::CONNECT => 7,
        Method::TRACE => 8,
        _ => 9,
    }
}
