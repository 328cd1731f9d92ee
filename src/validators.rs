//! Named validators for the auth endpoint.
//!
//! Each validator returns `None` when the event passes, or a JSON object of
//! field messages describing what failed.

use authgate_core::{ConfigError, Serializable, Validator};
use serde_json::{Value, json};

use crate::types::AuthRequest;

pub const ALLOWED_METHOD: &str = "GET";

/// Names accepted by [`by_name`], in the order they are documented.
pub const KNOWN: &[&str] = &["request", "method"];

/// Checks the event against the `AuthRequest` schema.
pub fn validate_request(event: &Value) -> Option<Value> {
    AuthRequest::validate(event)
}

/// Rejects any method other than GET. An event without a method passes.
pub fn validate_method(event: &Value) -> Option<Value> {
    match event.get("httpMethod") {
        None | Some(Value::Null) => None,
        Some(Value::String(method)) if method.eq_ignore_ascii_case(ALLOWED_METHOD) => None,
        Some(other) => Some(json!({
            "httpMethod": [format!("Method {other} not allowed, expected {ALLOWED_METHOD}.")]
        })),
    }
}

pub fn by_name(name: &str) -> Result<Box<dyn Validator>, ConfigError> {
    match name {
        "request" => Ok(Box::new(validate_request)),
        "method" => Ok(Box::new(validate_method)),
        other => Err(ConfigError::UnknownValidator(other.to_string())),
    }
}

/// Resolves configured names in order. Blank entries are skipped.
pub fn resolve<S: AsRef<str>>(names: &[S]) -> Result<Vec<Box<dyn Validator>>, ConfigError> {
    names
        .iter()
        .map(|name| name.as_ref().trim())
        .filter(|name| !name.is_empty())
        .map(by_name)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn method_check() {
        assert!(validate_method(&json!({"httpMethod": "GET"})).is_none());
        assert!(validate_method(&json!({"httpMethod": "get"})).is_none());
        assert!(validate_method(&json!({})).is_none());

        let messages = validate_method(&json!({"httpMethod": "POST"})).unwrap();
        assert_eq!(
            messages["httpMethod"][0],
            "Method \"POST\" not allowed, expected GET."
        );
    }

    #[test]
    fn resolve_keeps_order_and_skips_blanks() {
        let validators = resolve(&["method", " ", "request"]).unwrap();
        assert_eq!(validators.len(), 2);

        let event = json!({"httpMethod": "POST"});
        assert!(validators[0].validate(&event).is_some());
    }

    #[test]
    fn unknown_name() {
        let err = resolve(&["request", "cors"]).err().unwrap();
        assert!(matches!(err, ConfigError::UnknownValidator(name) if name == "cors"));
    }

    #[test]
    fn every_known_name_resolves() {
        assert_eq!(resolve(KNOWN).unwrap().len(), KNOWN.len());
    }
}
