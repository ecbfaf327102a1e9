//! Recursive configuration sanitizing.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Map, Number, Value};

static TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").expect("valid tag pattern"));
static OCTET: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"%[0-9a-fA-F]{2}").expect("valid octet pattern"));
static NUMERIC: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[+-]?(\d+(\.\d*)?|\.\d+)$").expect("valid numeric pattern"));

const CREDENTIAL_MARKERS: [&str; 4] = ["key", "password", "secret", "token"];

/// Canonicalize a configuration key: lowercase, keeping only `a-z`, `0-9`,
/// `_` and `-`.
///
/// ```rust
/// use adapterkit_core::config::canonicalize_key;
///
/// assert_eq!(canonicalize_key("API_Key"), "api_key");
/// assert_eq!(canonicalize_key("Site URL!"), "siteurl");
/// ```
pub fn canonicalize_key(key: &str) -> String {
    key.chars()
        .flat_map(char::to_lowercase)
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '_' || *c == '-')
        .collect()
}

/// Whether values under `key` are credentials and must not be text-filtered.
pub fn is_credential_key(key: &str) -> bool {
    let key = key.to_lowercase();
    CREDENTIAL_MARKERS.iter().any(|marker| key.contains(marker))
}

/// Sanitize a raw configuration mapping.
///
/// Pure and idempotent: `sanitize(&sanitize(x)) == sanitize(x)`.
///
/// - keys are canonicalized; keys that canonicalize to nothing are dropped
/// - credential strings (key contains `key`, `password`, `secret` or `token`) are trimmed only
/// - other strings are text-filtered, then turned into numbers if numeric
/// - booleans, numbers and nulls pass through
/// - mappings recurse, sequences are sanitized element by element
///
/// ```rust
/// use adapterkit_core::config::sanitize;
/// use serde_json::json;
///
/// let raw = json!({"api_key": "  secret<script>", "Count": "12", "bio": "<i>hi</i>\nthere"});
/// let clean = sanitize(raw.as_object().unwrap());
///
/// assert_eq!(clean["api_key"], json!("secret<script>"));
/// assert_eq!(clean["count"], json!(12));
/// assert_eq!(clean["bio"], json!("hi there"));
/// ```
pub fn sanitize(raw: &Map<String, Value>) -> Map<String, Value> {
    let mut clean = Map::with_capacity(raw.len());
    for (key, value) in raw {
        let key = canonicalize_key(key);
        if key.is_empty() {
            continue;
        }
        let credential = is_credential_key(&key);
        clean.insert(key, sanitize_value(value, credential));
    }
    clean
}

fn sanitize_value(value: &Value, credential: bool) -> Value {
    match value {
        Value::String(text) if credential => Value::String(text.trim().to_string()),
        Value::String(text) => {
            let filtered = filter_text(text);
            coerce_number(&filtered).unwrap_or(Value::String(filtered))
        }
        Value::Object(map) => Value::Object(sanitize(map)),
        Value::Array(items) => Value::Array(
            items
                .iter()
                .map(|item| sanitize_value(item, credential))
                .collect(),
        ),
        Value::Bool(_) | Value::Number(_) | Value::Null => value.clone(),
    }
}

/// Text-safety filter for values that may later land in HTML or SQL.
///
/// Strips tags, stray angle brackets and percent-encoded octets until
/// nothing changes, turns control characters into spaces, then collapses
/// whitespace.
fn filter_text(input: &str) -> String {
    let mut text = input.to_string();
    loop {
        let stripped = TAG.replace_all(&text, "");
        let stripped = OCTET.replace_all(&stripped, "");
        let stripped: String = stripped.chars().filter(|c| !matches!(c, '<' | '>')).collect();
        if stripped == text {
            break;
        }
        text = stripped;
    }

    let spaced: String = text
        .chars()
        .map(|c| if c.is_control() { ' ' } else { c })
        .collect();
    spaced.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn coerce_number(text: &str) -> Option<Value> {
    if !NUMERIC.is_match(text) {
        return None;
    }
    if text.contains('.') {
        return text
            .parse::<f64>()
            .ok()
            .and_then(Number::from_f64)
            .map(Value::Number);
    }
    text.parse::<i64>()
        .map(Value::from)
        .or_else(|_| text.parse::<u64>().map(Value::from))
        .ok()
}
