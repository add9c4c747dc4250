//! Wire protocol definitions for the linecmd daemon.
//!
//! The protocol is newline-delimited JSON over TCP: one request object per
//! line from the client, one response object per line from the server.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Canonical error strings that appear on the wire.
pub mod error_messages {
    /// Sent when a decoded line is not a usable request envelope.
    pub const INVALID_ENVELOPE: &str = "Not valid package from client";
    /// Substituted when a failing handler produced an empty message.
    pub const EMPTY_ERROR: &str = "empty error";
}

/// Shallow envelope check: the value must be an object carrying non-null
/// `command` and `data` keys. Field-level typing is deliberately left to the
/// command handler so the framing stays schema-agnostic.
pub fn is_valid_envelope(value: &Value) -> bool {
    let Some(map) = value.as_object() else {
        return false;
    };
    matches!(map.get("command"), Some(v) if !v.is_null())
        && matches!(map.get("data"), Some(v) if !v.is_null())
}

/// A decoded request envelope.
#[derive(Debug, Clone)]
pub struct Request {
    /// Command name, used for registry lookup (exact, case-sensitive).
    pub command: String,
    /// Command payload, passed to the handler untouched.
    pub data: Value,
}

impl Request {
    /// Split a decoded line into command name and payload.
    ///
    /// Returns `None` when the value fails the shallow envelope check. A
    /// non-string `command` is rendered to its compact JSON text so that an
    /// unknown-command error echoes it verbatim.
    pub fn from_envelope(mut value: Value) -> Option<Self> {
        if !is_valid_envelope(&value) {
            return None;
        }
        let map = value.as_object_mut()?;
        let command = match map.remove("command")? {
            Value::String(name) => name,
            other => other.to_string(),
        };
        let data = map.remove("data")?;
        Some(Self { command, data })
    }
}

/// A response envelope: exactly one of `result` or `error` is present.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Response {
    /// Whether the request succeeded.
    pub ok: bool,
    /// Result data (if successful).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    /// Error message (if failed).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl Response {
    /// Create a successful response.
    pub fn success(result: Value) -> Self {
        Self {
            ok: true,
            result: Some(result),
            error: None,
        }
    }

    /// Create an error response.
    pub fn failure(message: &str) -> Self {
        Self {
            ok: false,
            result: None,
            error: Some(message.to_string()),
        }
    }

    /// Serialize to JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserialize from JSON string.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Check if the response is successful.
    pub fn is_success(&self) -> bool {
        self.ok
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_valid_envelope() {
        assert!(is_valid_envelope(&json!({"command": "SUM2", "data": {}})));
    }

    #[test]
    fn test_envelope_missing_command() {
        assert!(!is_valid_envelope(&json!({"data": {}})));
    }

    #[test]
    fn test_envelope_missing_data() {
        assert!(!is_valid_envelope(&json!({"command": "SUM2"})));
    }

    #[test]
    fn test_envelope_null_fields() {
        assert!(!is_valid_envelope(&json!({"command": null, "data": {}})));
        assert!(!is_valid_envelope(&json!({"command": "SUM2", "data": null})));
    }

    #[test]
    fn test_envelope_not_an_object() {
        assert!(!is_valid_envelope(&json!("SUM2")));
        assert!(!is_valid_envelope(&json!([1, 2, 3])));
        assert!(!is_valid_envelope(&json!(42)));
    }

    #[test]
    fn test_envelope_shallow_typing() {
        // The validator checks key presence only; a scalar `data` or a
        // non-string `command` still passes at this layer.
        assert!(is_valid_envelope(&json!({"command": "SUM2", "data": 5})));
        assert!(is_valid_envelope(&json!({"command": 7, "data": {}})));
    }

    #[test]
    fn test_request_from_envelope() {
        let request =
            Request::from_envelope(json!({"command": "SUM2", "data": {"arg1": 1}})).unwrap();
        assert_eq!(request.command, "SUM2");
        assert_eq!(request.data, json!({"arg1": 1}));
    }

    #[test]
    fn test_request_from_invalid_envelope() {
        assert!(Request::from_envelope(json!({"data": {}})).is_none());
        assert!(Request::from_envelope(json!("nope")).is_none());
    }

    #[test]
    fn test_request_renders_non_string_command() {
        let request = Request::from_envelope(json!({"command": 7, "data": {}})).unwrap();
        assert_eq!(request.command, "7");

        let request =
            Request::from_envelope(json!({"command": {"k": 1}, "data": {}})).unwrap();
        assert_eq!(request.command, r#"{"k":1}"#);
    }

    #[test]
    fn test_response_success_shape() {
        let response = Response::success(json!(5.5));
        let json = response.to_json().unwrap();

        assert!(json.contains("\"ok\":true"));
        assert!(json.contains("\"result\":5.5"));
        assert!(!json.contains("\"error\""));
    }

    #[test]
    fn test_response_failure_shape() {
        let response = Response::failure("arg1 is not number");
        let json = response.to_json().unwrap();

        assert!(json.contains("\"ok\":false"));
        assert!(json.contains("\"error\":\"arg1 is not number\""));
        assert!(!json.contains("\"result\""));
    }

    #[test]
    fn test_response_round_trip() {
        let response = Response::success(json!({"key": "value"}));
        let parsed = Response::from_json(&response.to_json().unwrap()).unwrap();

        assert!(parsed.is_success());
        assert_eq!(parsed.result, Some(json!({"key": "value"})));
        assert!(parsed.error.is_none());
    }

    #[test]
    fn test_response_is_success() {
        assert!(Response::success(json!(null)).is_success());
        assert!(!Response::failure("boom").is_success());
    }
}
