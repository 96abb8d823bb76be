//! Inbound request as seen by the dispatcher.
//!
//! The host turns whatever its transport hands it into a [`Request`]:
//! method, path, decoded query parameters, decoded form body parameters and
//! headers. Nothing here performs I/O.

use std::sync::Arc;

use http::Method;
use tracing::debug;

use crate::response::HeaderVec;

/// Body parameter that carries a method override.
pub const METHOD_OVERRIDE_PARAM: &str = "_method";

/// Ordered list of decoded `name=value` pairs.
///
/// Keeps duplicates in arrival order; [`Params::get`] uses last-write-wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params(Vec<(String, String)>);

impl Params {
    /// Empty parameter list
    #[must_use]
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Decode an `application/x-www-form-urlencoded` string
    #[must_use]
    pub fn parse(encoded: &str) -> Self {
        Self(
            url::form_urlencoded::parse(encoded.trim_start_matches('?').as_bytes())
                .map(|(k, v)| (k.into_owned(), v.into_owned()))
                .collect(),
        )
    }

    /// Append a pair
    pub fn push(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.0.push((name.into(), value.into()));
    }

    /// Last value recorded for `name` (exact match)
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .rfind(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Whether `name` is present (exact match)
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.0.iter().any(|(k, _)| k == name)
    }

    /// Remove every pair whose name equals `name` ignoring ASCII case and
    /// return the last removed value.
    pub fn remove_ignore_case(&mut self, name: &str) -> Option<String> {
        let mut removed = None;
        self.0.retain(|(k, v)| {
            if k.eq_ignore_ascii_case(name) {
                removed = Some(v.clone());
                false
            } else {
                true
            }
        });
        removed
    }

    /// Iterate pairs in arrival order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Number of pairs
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// `true` when there are no pairs
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Params {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

/// Request handed to [`Dispatcher::dispatch`](crate::dispatcher::Dispatcher::dispatch).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    /// Transport-level HTTP method. Never rewritten by a method override.
    pub method: Method,
    /// Request path without the query string
    pub path: String,
    /// Decoded query string parameters
    pub query: Params,
    /// Decoded form body parameters
    pub body: Params,
    /// Request headers
    pub headers: HeaderVec,
}

impl Request {
    /// Create a request from a method and a request target (`/path?query`).
    #[must_use]
    pub fn new(method: Method, target: &str) -> Self {
        let (path, query) = match target.split_once('?') {
            Some((path, query)) => (path, Params::parse(query)),
            None => (target, Params::new()),
        };
        let path = if path.is_empty() { "/" } else { path };
        Self {
            method,
            path: path.to_string(),
            query,
            body: Params::new(),
            headers: HeaderVec::new(),
        }
    }

    /// Shorthand for a `GET` request
    #[must_use]
    pub fn get(target: &str) -> Self {
        Self::new(Method::GET, target)
    }

    /// Shorthand for a `POST` request with a form-encoded body
    #[must_use]
    pub fn post_form(target: &str, form: &str) -> Self {
        Self::new(Method::POST, target).with_form_body(form)
    }

    /// Replace the body parameters with a decoded form body
    #[must_use]
    pub fn with_form_body(mut self, form: &str) -> Self {
        self.body = Params::parse(form);
        debug!(param_count = self.body.len(), "Form body parsed");
        self
    }

    /// Append a single body parameter
    #[must_use]
    pub fn with_body_param(mut self, name: &str, value: &str) -> Self {
        self.body.push(name, value);
        self
    }

    /// Append a header
    #[must_use]
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((Arc::from(name), value.to_string()));
        self
    }

    /// Get a header by name (case-insensitive per RFC 7230)
    #[inline]
    #[must_use]
    pub fn get_header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// `Host` header without a port
    #[must_use]
    pub fn host(&self) -> Option<&str> {
        self.get_header("host")
            .map(|h| h.split(':').next().unwrap_or(h))
    }

    /// Remove the method override body parameter, returning its raw value.
    ///
    /// Only body parameters are consulted; a `_method` query parameter is
    /// left alone.
    pub fn take_method_override(&mut self) -> Option<String> {
        self.body.remove_ignore_case(METHOD_OVERRIDE_PARAM)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_splits_query() {
        let req = Request::get("/blog/list?page=2&tag=rust");
        assert_eq!(req.path, "/blog/list");
        assert_eq!(req.query.get("page"), Some("2"));
        assert_eq!(req.query.get("tag"), Some("rust"));
        assert!(req.body.is_empty());
    }

    #[test]
    fn test_empty_target_is_root() {
        let req = Request::get("?x=1");
        assert_eq!(req.path, "/");
        assert_eq!(req.query.get("x"), Some("1"));
    }

    #[test]
    fn test_form_body_decoding() {
        let req = Request::post_form("/blog", "title=Hello+World&body=a%26b");
        assert_eq!(req.body.get("title"), Some("Hello World"));
        assert_eq!(req.body.get("body"), Some("a&b"));
    }

    #[test]
    fn test_take_method_override_is_case_insensitive() {
        let mut req = Request::post_form("/blog/1", "_METHOD=delete&title=x");
        assert_eq!(req.take_method_override().as_deref(), Some("delete"));
        assert!(!req.body.contains("_METHOD"));
        assert_eq!(req.body.get("title"), Some("x"));
        assert_eq!(req.take_method_override(), None);
    }

    #[test]
    fn test_override_ignores_query_string() {
        let mut req = Request::new(Method::POST, "/blog/1?_method=DELETE");
        assert_eq!(req.take_method_override(), None);
        assert_eq!(req.query.get("_method"), Some("DELETE"));
    }

    #[test]
    fn test_params_last_write_wins() {
        let params = Params::parse("a=1&a=2");
        assert_eq!(params.get("a"), Some("2"));
        assert_eq!(params.len(), 2);
    }

    #[test]
    fn test_host_strips_port() {
        let req = Request::get("/").with_header("Host", "example.com:8080");
        assert_eq!(req.host(), Some("example.com"));
    }
}
