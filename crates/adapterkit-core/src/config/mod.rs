//! Sanitized configuration snapshots.
//!
//! Adapters receive their configuration from the host as an arbitrary,
//! possibly nested JSON mapping. [`Config`] is the immutable snapshot an
//! adapter keeps after running that mapping through [`sanitize`]: keys are
//! canonical, text is filtered, numeric strings are numbers, and credentials
//! are left exactly as supplied apart from surrounding whitespace.

mod sanitize;

pub use sanitize::{canonicalize_key, is_credential_key, sanitize};

use serde_json::{Map, Value};

/// Immutable, sanitized adapter configuration.
///
/// # Examples
///
/// ```rust
/// use adapterkit_core::config::Config;
/// use serde_json::json;
///
/// let config = Config::from_value(&json!({
///     "Base-URL": "https://example.com",
///     "max_tokens": "512",
///     "enabled": false,
/// }));
///
/// assert_eq!(config.get_str("base-url"), Some("https://example.com"));
/// assert_eq!(config.get_u64("max_tokens"), Some(512));
/// assert_eq!(config.missing(&["base-url", "enabled", "model"]), vec!["enabled", "model"]);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Config {
    values: Map<String, Value>,
}

impl Config {
    /// Sanitize a raw mapping into a snapshot.
    pub fn new(raw: &Map<String, Value>) -> Self {
        Self {
            values: sanitize(raw),
        }
    }

    /// Sanitize a raw JSON value. Anything other than an object yields an
    /// empty configuration.
    pub fn from_value(raw: &Value) -> Self {
        match raw {
            Value::Object(map) => Self::new(map),
            _ => Self::default(),
        }
    }

    /// Look up a value. The lookup key is canonicalized the same way stored
    /// keys are, so `"API_KEY"` finds `"api_key"`.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(&canonicalize_key(key))
    }

    /// Look up a value, falling back to `default` when the key is absent.
    pub fn get_or(&self, key: &str, default: Value) -> Value {
        self.get(key).cloned().unwrap_or(default)
    }

    /// String value for `key`, if present and a string.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    /// Unsigned integer value for `key`.
    pub fn get_u64(&self, key: &str) -> Option<u64> {
        self.get(key).and_then(Value::as_u64)
    }

    /// Floating point value for `key`. Integers are widened.
    pub fn get_f64(&self, key: &str) -> Option<f64> {
        self.get(key).and_then(Value::as_f64)
    }

    /// Boolean value for `key`.
    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.get(key).and_then(Value::as_bool)
    }

    /// Whether `key` is absent or holds an empty value (see [`is_blank`]).
    pub fn is_blank(&self, key: &str) -> bool {
        self.get(key).is_none_or(is_blank)
    }

    /// Every name in `required` that is absent or blank, in the order given.
    pub fn missing<S: AsRef<str>>(&self, required: &[S]) -> Vec<String> {
        required
            .iter()
            .map(AsRef::as_ref)
            .filter(|name| self.is_blank(name))
            .map(str::to_string)
            .collect()
    }

    /// Borrow the underlying map.
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.values
    }

    /// Consume the snapshot and return the underlying map.
    pub fn into_map(self) -> Map<String, Value> {
        self.values
    }

    /// Number of top-level keys.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether the snapshot holds no keys.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// "Empty" in the configuration sense: null, an empty string, an empty
/// sequence or mapping, `false`, or numeric zero.
pub fn is_blank(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
    }
}
