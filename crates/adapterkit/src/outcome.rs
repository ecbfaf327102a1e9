//! Host-boundary rendering of operation results
//!
//! Hosts that speak loosely typed maps (admin panels, action dispatchers)
//! receive every result in one tagged shape:
//! `{"success": true, ...fields}` or
//! `{"success": false, "code", "message", "context", "severity"}`.

use crate::error::AdapterResult;
use serde::Serialize;
use serde_json::{Map, Value};

/// Render a result as a tagged map.
///
/// A success value that serializes to an object contributes its fields;
/// any other success value is placed under `data`.
///
/// ```rust
/// use adapterkit::{ErrorRecord, outcome::to_outcome};
/// use serde_json::json;
///
/// let ok: Result<_, ErrorRecord> = Ok(json!({"id": "7"}));
/// assert_eq!(to_outcome(&ok), json!({"success": true, "id": "7"}));
///
/// let err: Result<(), _> = Err(ErrorRecord::new("http_404", "HTTP 404 error: nope"));
/// assert_eq!(to_outcome(&err)["success"], false);
/// assert_eq!(to_outcome(&err)["code"], "http_404");
/// ```
pub fn to_outcome<T: Serialize>(result: &AdapterResult<T>) -> Value {
    let (success, payload) = match result {
        Ok(value) => (true, serde_json::to_value(value)),
        Err(error) => (false, serde_json::to_value(error)),
    };

    let mut outcome = Map::new();
    outcome.insert("success".to_string(), Value::Bool(success));
    match payload {
        Ok(Value::Object(fields)) => outcome.extend(fields),
        Ok(Value::Null) => {}
        Ok(other) => {
            outcome.insert("data".to_string(), other);
        }
        Err(e) => {
            outcome.insert("success".to_string(), Value::Bool(false));
            outcome.insert("code".to_string(), Value::from("serialization_error"));
            outcome.insert("message".to_string(), Value::from(e.to_string()));
        }
    }
    Value::Object(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ErrorRecord;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_error_shape() {
        let result: AdapterResult<()> =
            Err(ErrorRecord::new("missing_config", "Missing required configuration: a")
                .with_context("missing", vec!["a"]));
        assert_eq!(
            to_outcome(&result),
            json!({
                "success": false,
                "code": "missing_config",
                "message": "Missing required configuration: a",
                "context": {"missing": ["a"]},
                "severity": "error",
            })
        );
    }

    #[test]
    fn test_scalar_and_unit_success() {
        let result: AdapterResult<bool> = Ok(true);
        assert_eq!(to_outcome(&result), json!({"success": true, "data": true}));

        let result: AdapterResult<()> = Ok(());
        assert_eq!(to_outcome(&result), json!({"success": true}));
    }
}
