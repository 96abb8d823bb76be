//! Response type returned by controller actions and by the dispatcher's own
//! `404` handling.

use std::sync::Arc;

use http::StatusCode;
use smallvec::SmallVec;

/// Maximum inline headers before heap allocation
pub const MAX_INLINE_HEADERS: usize = 16;

/// Stack-allocated header storage.
///
/// Header names use `Arc<str>` because the same few names are set on nearly
/// every response; values are per-response data.
pub type HeaderVec = SmallVec<[(Arc<str>, String); MAX_INLINE_HEADERS]>;

/// HTTP-style response produced by an action.
///
/// The dispatcher never looks inside a response an action returns; it is
/// handed to the host as-is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HandlerResponse {
    /// HTTP status code (200, 302, 404, ...)
    pub status: u16,
    /// Response headers
    pub headers: HeaderVec,
    /// Response body
    pub body: String,
}

impl HandlerResponse {
    /// Create a response with the given status, headers and body
    #[must_use]
    pub fn new(status: StatusCode, headers: HeaderVec, body: impl Into<String>) -> Self {
        Self {
            status: status.as_u16(),
            headers,
            body: body.into(),
        }
    }

    fn with_content_type(status: StatusCode, content_type: &str, body: String) -> Self {
        let mut headers = HeaderVec::new();
        headers.push((Arc::from("content-type"), content_type.to_string()));
        Self {
            status: status.as_u16(),
            headers,
            body,
        }
    }

    /// `200 OK` with an HTML body
    #[must_use]
    pub fn html(body: impl Into<String>) -> Self {
        Self::with_content_type(StatusCode::OK, "text/html; charset=utf-8", body.into())
    }

    /// `text/plain` response with the given status
    #[must_use]
    pub fn text(status: StatusCode, body: impl Into<String>) -> Self {
        Self::with_content_type(status, "text/plain; charset=utf-8", body.into())
    }

    /// JSON response with the given status
    #[must_use]
    pub fn json(status: StatusCode, body: &serde_json::Value) -> Self {
        Self::with_content_type(status, "application/json", body.to_string())
    }

    /// Error response carrying a short plain-text message
    #[must_use]
    pub fn error(status: StatusCode, message: &str) -> Self {
        Self::text(status, message)
    }

    /// `302 Found` pointing at `location`
    #[must_use]
    pub fn redirect(location: &str) -> Self {
        let mut headers = HeaderVec::new();
        headers.push((Arc::from("location"), location.to_string()));
        Self {
            status: StatusCode::FOUND.as_u16(),
            headers,
            body: String::new(),
        }
    }

    /// Get a header by name (case-insensitive)
    #[inline]
    #[must_use]
    pub fn get_header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Add or replace a header
    pub fn set_header(&mut self, name: &str, value: String) {
        self.headers.retain(|(k, _)| !k.eq_ignore_ascii_case(name));
        self.headers.push((Arc::from(name), value));
    }

    /// Body as a string slice
    #[must_use]
    pub fn body_str(&self) -> &str {
        &self.body
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redirect_sets_location() {
        let resp = HandlerResponse::redirect("/blog/show/1");
        assert_eq!(resp.status, 302);
        assert_eq!(resp.get_header("Location"), Some("/blog/show/1"));
    }

    #[test]
    fn test_set_header_replaces_case_insensitively() {
        let mut resp = HandlerResponse::html("<p>hi</p>");
        resp.set_header("Content-Type", "text/plain".to_string());
        assert_eq!(resp.headers.len(), 1);
        assert_eq!(resp.get_header("content-type"), Some("text/plain"));
    }
}
