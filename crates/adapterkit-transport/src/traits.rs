//! Transport trait and request/response types
//!
//! Defines the generic Transport trait that the adapter execution path
//! sends requests through, plus the plain data types it exchanges.

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

/// HTTP protocol version requested for a call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum HttpVersion {
    /// HTTP/1.0
    #[serde(rename = "HTTP/1.0", alias = "1.0")]
    Http10,
    /// HTTP/1.1
    #[default]
    #[serde(rename = "HTTP/1.1", alias = "1.1")]
    Http11,
    /// HTTP/2
    #[serde(rename = "HTTP/2", alias = "2", alias = "2.0")]
    Http2,
}

/// HTTP request specification
///
/// Represents one fully resolved HTTP request to be sent via the Transport.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    /// HTTP method (GET, POST, etc.)
    pub method: String,

    /// Request URL
    pub url: String,

    /// Request headers
    pub headers: HashMap<String, String>,

    /// Cookies, sent as a single `Cookie` header
    pub cookies: HashMap<String, String>,

    /// Request body (optional)
    pub body: Option<Vec<u8>>,

    /// Per-request timeout; the transport default applies when unset
    pub timeout: Option<Duration>,

    /// Maximum number of redirects to follow; the transport default applies when unset
    pub redirect_limit: Option<usize>,

    /// Protocol version
    pub version: HttpVersion,
}

impl HttpRequest {
    /// Create a new HTTP request
    pub fn new(method: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            url: url.into(),
            headers: HashMap::new(),
            cookies: HashMap::new(),
            body: None,
            timeout: None,
            redirect_limit: None,
            version: HttpVersion::default(),
        }
    }

    /// Add a header to the request
    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    /// Add a cookie to the request
    pub fn with_cookie(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.cookies.insert(name.into(), value.into());
        self
    }

    /// Set the request body
    pub fn with_body(mut self, body: Vec<u8>) -> Self {
        self.body = Some(body);
        self
    }

    /// Set the request body from string
    pub fn with_text_body(mut self, text: impl Into<String>) -> Self {
        self.body = Some(text.into().into_bytes());
        self
    }

    /// Set the per-request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set the redirect limit
    pub fn with_redirect_limit(mut self, limit: usize) -> Self {
        self.redirect_limit = Some(limit);
        self
    }

    /// Set the protocol version
    pub fn with_version(mut self, version: HttpVersion) -> Self {
        self.version = version;
        self
    }

    /// Render the cookie map as a `Cookie` header value, sorted by name.
    pub fn cookie_header(&self) -> Option<String> {
        if self.cookies.is_empty() {
            return None;
        }
        let mut pairs: Vec<_> = self.cookies.iter().collect();
        pairs.sort();
        Some(
            pairs
                .into_iter()
                .map(|(name, value)| format!("{name}={value}"))
                .collect::<Vec<_>>()
                .join("; "),
        )
    }
}

/// HTTP response
///
/// Represents an HTTP response received from the server, whatever its status.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    /// HTTP status code
    pub status: u16,

    /// Response headers
    pub headers: HashMap<String, String>,

    /// Response body
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// Create a new HTTP response
    pub fn new(status: u16, headers: HashMap<String, String>, body: Vec<u8>) -> Self {
        Self {
            status,
            headers,
            body,
        }
    }

    /// Check if response is successful (2xx)
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Check if response is an error (4xx or 5xx)
    pub fn is_error(&self) -> bool {
        self.status >= 400
    }

    /// Get the response body as a string
    pub fn text(&self) -> std::result::Result<String, std::string::FromUtf8Error> {
        String::from_utf8(self.body.clone())
    }

    /// Get the response body as a string, replacing invalid UTF-8
    pub fn text_lossy(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// First `max_chars` characters of the body
    pub fn body_preview(&self, max_chars: usize) -> String {
        self.text_lossy().chars().take(max_chars).collect()
    }

    /// Parse response body as JSON
    ///
    /// # Errors
    ///
    /// Returns an error if the response body cannot be parsed as valid JSON
    pub fn json<T: serde::de::DeserializeOwned>(&self) -> serde_json::Result<T> {
        serde_json::from_slice(&self.body)
    }

    /// Get a header value by name (case-insensitive)
    pub fn get_header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Generic transport trait
///
/// Implementations send exactly one request per call. Retrying is the
/// caller's business; a transport reports what happened on this attempt.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send an HTTP request and receive a response.
    ///
    /// Returns `Ok` for any response that carries a status code, including
    /// 4xx and 5xx. Returns `Err` only when no status could be obtained.
    async fn send_http(&self, request: HttpRequest) -> Result<HttpResponse>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_deserializes_from_protocol_strings() {
        let v: HttpVersion = serde_json::from_str("\"HTTP/1.1\"").unwrap();
        assert_eq!(v, HttpVersion::Http11);
        let v: HttpVersion = serde_json::from_str("\"1.0\"").unwrap();
        assert_eq!(v, HttpVersion::Http10);
        let v: HttpVersion = serde_json::from_str("\"HTTP/2\"").unwrap();
        assert_eq!(v, HttpVersion::Http2);
    }

    #[test]
    fn test_cookie_header_is_sorted() {
        let request = HttpRequest::new("GET", "https://example.com")
            .with_cookie("session", "abc")
            .with_cookie("locale", "en");
        assert_eq!(
            request.cookie_header().as_deref(),
            Some("locale=en; session=abc")
        );
        assert!(HttpRequest::new("GET", "/").cookie_header().is_none());
    }

    #[test]
    fn test_body_preview_counts_characters() {
        let response = HttpResponse::new(500, HashMap::new(), "héllo wörld".as_bytes().to_vec());
        assert_eq!(response.body_preview(4), "héll");
        assert_eq!(response.body_preview(200), "héllo wörld");
    }

    #[test]
    fn test_status_helpers() {
        let ok = HttpResponse::new(204, HashMap::new(), Vec::new());
        assert!(ok.is_success());
        assert!(!ok.is_error());

        let redirect = HttpResponse::new(302, HashMap::new(), Vec::new());
        assert!(!redirect.is_success());
        assert!(!redirect.is_error());

        let err = HttpResponse::new(404, HashMap::new(), Vec::new());
        assert!(err.is_error());
    }

    #[test]
    fn test_get_header_case_insensitive() {
        let mut headers = HashMap::new();
        headers.insert("X-RateLimit-Remaining".to_string(), "9".to_string());
        let response = HttpResponse::new(200, headers, Vec::new());
        assert_eq!(response.get_header("x-ratelimit-remaining"), Some("9"));
        assert_eq!(response.get_header("missing"), None);
    }
}
