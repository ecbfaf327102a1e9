//! Structured error records
//!
//! Adapters never surface failures as panics or opaque error chains. Every
//! failure becomes an [`ErrorRecord`]: a machine-readable code, a human
//! message, a context map and a severity. The same value is returned to the
//! caller and stored in the adapter's last-error slot.

use adapterkit_transport::TransportError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Result type alias for adapter operations.
pub type AdapterResult<T> = std::result::Result<T, ErrorRecord>;

/// Well-known error codes.
///
/// HTTP status failures use `http_<status>`, built by [`ErrorRecord::http_status`].
pub mod codes {
    /// One or more required configuration fields are absent or empty.
    pub const MISSING_CONFIG: &str = "missing_config";
    /// Transport failure after the retry budget was spent.
    pub const HTTP_ERROR: &str = "http_error";
    /// The HTTP client could not be constructed.
    pub const TRANSPORT_INIT: &str = "transport_init";
    /// Caller-supplied request options could not be understood.
    pub const INVALID_OPTIONS: &str = "invalid_options";
    /// A URL could not be built from configuration.
    pub const INVALID_URL: &str = "invalid_url";
    /// The remote service answered with something unusable.
    pub const INVALID_RESPONSE: &str = "invalid_response";
    /// A CSS selector could not be parsed.
    pub const INVALID_SELECTOR: &str = "invalid_selector";
    /// A schedule time is not in the future.
    pub const INVALID_SCHEDULE: &str = "invalid_schedule";
    /// A workflow step list is malformed.
    pub const INVALID_STEPS: &str = "invalid_steps";
    /// The local request budget for the current window is spent.
    pub const RATE_LIMITED: &str = "rate_limited";
    /// An optional integration is needed but not configured.
    pub const NOT_CONFIGURED: &str = "not_configured";
    /// A workflow execution id is not known.
    pub const UNKNOWN_EXECUTION: &str = "unknown_execution";
}

/// How bad a recorded failure is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Degraded but recoverable
    Warning,
    /// The operation failed
    #[default]
    Error,
}

/// Structured failure value returned and stored in place of an exception.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Error)]
#[error("{code}: {message}")]
pub struct ErrorRecord {
    /// Machine-readable code, e.g. `missing_config` or `http_404`
    pub code: String,
    /// Human-readable description
    pub message: String,
    /// Structured details (url, status, missing fields, ...)
    #[serde(default)]
    pub context: Map<String, Value>,
    /// Severity
    #[serde(default)]
    pub severity: Severity,
}

impl ErrorRecord {
    /// Create an error-severity record with an empty context.
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            context: Map::new(),
            severity: Severity::Error,
        }
    }

    /// Create a warning-severity record.
    pub fn warning(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            ..Self::new(code, message)
        }
    }

    /// Add one context entry.
    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }

    /// Merge a whole context map, overwriting existing keys.
    pub fn with_context_map(mut self, context: Map<String, Value>) -> Self {
        self.context.extend(context);
        self
    }

    /// `missing_config` listing every missing field.
    pub fn missing_config(fields: &[String]) -> Self {
        Self::new(
            codes::MISSING_CONFIG,
            format!("Missing required configuration: {}", fields.join(", ")),
        )
        .with_context("missing", fields.to_vec())
    }

    /// `http_error` for a transport failure that survived every retry.
    pub fn http_error(url: &str, error: &TransportError) -> Self {
        Self::new(codes::HTTP_ERROR, format!("HTTP request failed: {error}"))
            .with_context("url", url)
    }

    /// `http_<status>` for a response with an error status.
    ///
    /// `body_preview` should already be truncated by the caller.
    pub fn http_status(url: &str, status: u16, body_preview: &str) -> Self {
        Self::new(
            format!("http_{status}"),
            format!("HTTP {status} error: {body_preview}"),
        )
        .with_context("url", url)
        .with_context("status", status)
    }

    /// Whether this record carries `code`.
    pub fn is(&self, code: &str) -> bool {
        self.code == code
    }

    /// Whether this record is only a warning.
    pub fn is_warning(&self) -> bool {
        self.severity == Severity::Warning
    }
}

/// Build a context map from key/value pairs.
///
/// ```rust
/// use adapterkit::error::context;
///
/// let ctx = context([("url", "https://example.com".into()), ("attempt", 2.into())]);
/// assert_eq!(ctx["attempt"], 2);
/// ```
pub fn context<const N: usize>(pairs: [(&str, Value); N]) -> Map<String, Value> {
    pairs
        .into_iter()
        .map(|(key, value)| (key.to_string(), value))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_missing_config_lists_all_fields() {
        let err = ErrorRecord::missing_config(&["b".to_string(), "c".to_string()]);
        assert!(err.is(codes::MISSING_CONFIG));
        assert_eq!(err.message, "Missing required configuration: b, c");
        assert_eq!(err.context["missing"], json!(["b", "c"]));
        assert_eq!(err.severity, Severity::Error);
    }

    #[test]
    fn test_http_status_code_and_context() {
        let err = ErrorRecord::http_status("https://api.example.com", 503, "down");
        assert_eq!(err.code, "http_503");
        assert!(err.message.contains("503"));
        assert!(err.message.contains("down"));
        assert_eq!(err.context["url"], json!("https://api.example.com"));
        assert_eq!(err.context["status"], json!(503));
    }

    #[test]
    fn test_http_error_includes_transport_text() {
        let err = ErrorRecord::http_error(
            "https://x.test",
            &TransportError::Connection("dns failure".to_string()),
        );
        assert_eq!(err.code, "http_error");
        assert!(err.message.contains("dns failure"));
        assert_eq!(err.context, context([("url", json!("https://x.test"))]));
    }

    #[test]
    fn test_display_and_warning() {
        let err = ErrorRecord::warning("rate_limited", "slow down");
        assert!(err.is_warning());
        assert_eq!(err.to_string(), "rate_limited: slow down");
    }

    #[test]
    fn test_serde_shape() {
        let err = ErrorRecord::new("custom", "boom").with_context("id", 7);
        let value = serde_json::to_value(&err).unwrap();
        assert_eq!(
            value,
            json!({"code": "custom", "message": "boom", "context": {"id": 7}, "severity": "error"})
        );

        let back: ErrorRecord =
            serde_json::from_value(json!({"code": "x", "message": "y"})).unwrap();
        assert_eq!(back.severity, Severity::Error);
        assert!(back.context.is_empty());
    }
}
