//! Per-call request options

use crate::error::{AdapterResult, ErrorRecord, codes};
use adapterkit_transport::{HttpRequest, HttpVersion};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::time::Duration;

const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Request body carried by [`RequestOptions`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RequestBody {
    /// UTF-8 text, sent as-is
    Text(String),
    /// Raw bytes
    Bytes(Vec<u8>),
    /// JSON document, serialized on send
    Json(Value),
}

impl RequestBody {
    /// Encoded body bytes.
    pub fn to_bytes(&self) -> Vec<u8> {
        match self {
            Self::Text(text) => text.clone().into_bytes(),
            Self::Bytes(bytes) => bytes.clone(),
            Self::Json(value) => value.to_string().into_bytes(),
        }
    }
}

/// Options for one call through [`HttpExecutor`](super::HttpExecutor).
///
/// Deserializing from a partial JSON object fills every absent field with
/// its default, so caller options merge over the defaults:
/// `GET`, no headers or cookies, 30 second timeout, 1 attempt,
/// 5 redirects, HTTP/1.1.
///
/// Numeric fields take numbers or numeric strings, the forms the config
/// sanitizer produces. `timeout` may be fractional. `retries` below 1
/// means a single attempt and a negative `redirection` means none.
///
/// # Example
///
/// ```rust
/// use adapterkit::http::RequestOptions;
/// use serde_json::json;
///
/// let options = RequestOptions::from_value(&json!({"retries": 3, "method": "post"})).unwrap();
/// assert_eq!(options.retries, 3);
/// assert_eq!(options.timeout, 30.0);
/// assert_eq!(options.redirection, 5);
///
/// let options = RequestOptions::from_value(&json!({"retries": -1, "timeout": "2.5"})).unwrap();
/// assert_eq!(options.retries, 1);
/// assert_eq!(options.timeout, 2.5);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RequestOptions {
    /// HTTP method
    pub method: String,
    /// Request headers
    pub headers: BTreeMap<String, String>,
    /// Cookies
    pub cookies: BTreeMap<String, String>,
    /// Optional body
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<RequestBody>,
    /// Timeout in seconds
    #[serde(deserialize_with = "lenient::seconds")]
    pub timeout: f64,
    /// Total attempts; values below 1 mean 1
    #[serde(deserialize_with = "lenient::attempts")]
    pub retries: u32,
    /// Maximum redirects to follow
    #[serde(deserialize_with = "lenient::count")]
    pub redirection: usize,
    /// Protocol version
    pub httpversion: HttpVersion,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self {
            method: "GET".to_string(),
            headers: BTreeMap::new(),
            cookies: BTreeMap::new(),
            body: None,
            timeout: DEFAULT_TIMEOUT_SECS as f64,
            retries: 1,
            redirection: 5,
            httpversion: HttpVersion::default(),
        }
    }
}

impl RequestOptions {
    /// Default GET options.
    pub fn get() -> Self {
        Self::default()
    }

    /// POST with a JSON body.
    pub fn post_json(body: Value) -> Self {
        Self::default().method("POST").json_body(body)
    }

    /// Parse caller options, merging them over the defaults.
    ///
    /// `null` yields the defaults. Any other non-object, or a field of the
    /// wrong type, is an `invalid_options` error.
    pub fn from_value(value: &Value) -> AdapterResult<Self> {
        if value.is_null() {
            return Ok(Self::default());
        }
        Self::deserialize(value).map_err(|e| {
            ErrorRecord::new(codes::INVALID_OPTIONS, format!("Invalid request options: {e}"))
        })
    }

    /// Set the method.
    pub fn method(mut self, method: impl Into<String>) -> Self {
        self.method = method.into();
        self
    }

    /// Add a header.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Add a cookie.
    pub fn cookie(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.cookies.insert(name.into(), value.into());
        self
    }

    /// Set a text body.
    pub fn body_text(mut self, text: impl Into<String>) -> Self {
        self.body = Some(RequestBody::Text(text.into()));
        self
    }

    /// Set a raw byte body.
    pub fn body_bytes(mut self, bytes: Vec<u8>) -> Self {
        self.body = Some(RequestBody::Bytes(bytes));
        self
    }

    /// Set a JSON body and a JSON content type unless one is already set.
    pub fn json_body(mut self, body: Value) -> Self {
        if !self
            .headers
            .keys()
            .any(|k| k.eq_ignore_ascii_case("content-type"))
        {
            self.headers
                .insert("Content-Type".to_string(), "application/json".to_string());
        }
        self.body = Some(RequestBody::Json(body));
        self
    }

    /// Set the timeout in seconds.
    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.timeout = secs as f64;
        self
    }

    /// Set the total attempt count.
    pub fn retries(mut self, retries: u32) -> Self {
        self.retries = retries;
        self
    }

    /// Set the redirect limit.
    pub fn redirection(mut self, limit: usize) -> Self {
        self.redirection = limit;
        self
    }

    /// Set the protocol version.
    pub fn version(mut self, version: HttpVersion) -> Self {
        self.httpversion = version;
        self
    }

    /// Resolve into a transport request for `url`.
    pub fn to_request(&self, url: &str) -> HttpRequest {
        let mut request = HttpRequest::new(self.method.to_uppercase(), url)
            .with_timeout(self.timeout_duration())
            .with_redirect_limit(self.redirection)
            .with_version(self.httpversion);

        for (name, value) in &self.headers {
            request = request.with_header(name, value);
        }
        for (name, value) in &self.cookies {
            request = request.with_cookie(name, value);
        }
        if let Some(body) = &self.body {
            request = request.with_body(body.to_bytes());
        }
        request
    }

    /// Timeout as a [`Duration`]; an out-of-range value falls back to 30s.
    pub fn timeout_duration(&self) -> Duration {
        Duration::try_from_secs_f64(self.timeout)
            .unwrap_or(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
    }
}

/// Deserializers for numeric option fields given as numbers or strings.
mod lenient {
    use serde::Deserialize;
    use serde::de::{Deserializer, Error};
    use serde_json::Value;

    fn number<'de, D: Deserializer<'de>>(deserializer: D, field: &str) -> Result<f64, D::Error> {
        let value = Value::deserialize(deserializer)?;
        let parsed = match &value {
            Value::Number(number) => number.as_f64(),
            Value::String(text) => text.trim().parse::<f64>().ok(),
            _ => None,
        };
        parsed
            .filter(|number| number.is_finite())
            .ok_or_else(|| D::Error::custom(format!("{field} must be a number, got {value}")))
    }

    pub(super) fn seconds<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        let secs = number(deserializer, "timeout")?;
        if secs < 0.0 {
            return Err(D::Error::custom(format!("timeout must not be negative, got {secs}")));
        }
        Ok(secs)
    }

    pub(super) fn attempts<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
        // Float to int casts saturate.
        Ok(number(deserializer, "retries")?.max(1.0) as u32)
    }

    pub(super) fn count<'de, D: Deserializer<'de>>(deserializer: D) -> Result<usize, D::Error> {
        Ok(number(deserializer, "redirection")?.max(0.0) as usize)
    }
}
