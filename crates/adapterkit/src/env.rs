//! Raw configuration from the environment
//!
//! Collects `PREFIX_*` variables (after loading a `.env` file when one
//! exists) into the raw mapping adapters are built from.

use serde_json::{Map, Value};

/// Collect every `{prefix}_*` environment variable into a raw config map.
///
/// The prefix and separator are stripped and the rest is lowercased, so
/// `OPENAI_API_KEY` with prefix `OPENAI` becomes `api_key`. `true` and
/// `false` (any case) become booleans. Everything else stays a string for
/// the sanitizer to classify. Variables whose name or value is not valid
/// UTF-8 are skipped.
pub fn raw_config_from_env(prefix: &str) -> Map<String, Value> {
    // A missing .env file is normal.
    let _ = dotenvy::dotenv();

    let prefix = format!("{}_", prefix.trim_end_matches('_').to_ascii_uppercase());
    std::env::vars_os()
        .filter_map(|(name, value)| {
            let (name, value) = (name.into_string().ok()?, value.into_string().ok()?);
            let key = name.strip_prefix(&prefix)?.to_ascii_lowercase();
            if key.is_empty() {
                return None;
            }
            let value = match value.trim().to_ascii_lowercase().as_str() {
                "true" => Value::Bool(true),
                "false" => Value::Bool(false),
                _ => Value::String(value),
            };
            Some((key, value))
        })
        .collect()
}
