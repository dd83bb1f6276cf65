//! Matched path parameters.

use axum::http::Request;

/// Ordered `(name, value)` pairs captured while matching a path.
///
/// Names are unique within one match; pattern validation guarantees it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params {
    pairs: Vec<(String, String)>,
}

/// Request extension key. Private so nothing outside this module can
/// insert or overwrite the bound parameters.
#[derive(Debug, Clone)]
struct BoundParams(Params);

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.pairs.push((name.into(), value.into()));
    }

    pub(crate) fn truncate(&mut self, len: usize) {
        self.pairs.truncate(len);
    }

    /// Value bound to `name`, or the empty string when there is none.
    pub fn by_name(&self, name: &str) -> &str {
        self.get(name).unwrap_or("")
    }

    /// Value bound to `name`, if any.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Parameters bound to `req` by the dispatcher. Empty if none were bound.
    pub fn from_request<B>(req: &Request<B>) -> Params {
        req.extensions()
            .get::<BoundParams>()
            .map(|bound| bound.0.clone())
            .unwrap_or_default()
    }

    /// Attach these parameters to `req`, replacing any earlier binding.
    pub(crate) fn bind<B>(self, req: &mut Request<B>) {
        req.extensions_mut().insert(BoundParams(self));
    }
}

/// Convenience accessor for handlers and middleware.
pub trait RequestParamsExt {
    /// Borrow the parameters bound by the dispatcher, if any.
    fn params(&self) -> Option<&Params>;

    /// Shorthand for `params().by_name(name)`.
    fn param(&self, name: &str) -> &str {
        self.params().map(|p| p.by_name(name)).unwrap_or("")
    }
}

impl<B> RequestParamsExt for Request<B> {
    fn params(&self) -> Option<&Params> {
        self.extensions().get::<BoundParams>().map(|bound| &bound.0)
    }
}
