//! Schemas for the auth endpoint records.
//!
//! The definitions are compiled once, on first use. `AuthRequest` also
//! requires the `queryStringParameters` key before the schema check runs
//! and treats a falsy value there as an empty query.

use std::sync::LazyLock;

use authgate_core::encode::is_truthy;
use authgate_core::{InvalidSchema, Schema, SchemaError, Serializable};
use serde_json::{Map, Value, json};

use crate::types::{AuthQuery, AuthRequest};

pub const AUTH_REQUEST: &str = "AuthRequest";
pub const AUTH_QUERY: &str = "AuthQuery";

/// Key holding the nested query document in the raw event.
pub const QUERY_KEY: &str = "queryStringParameters";

/// UUID spellings accepted for `customer_id`: hyphenated, simple (32 hex
/// digits), braced, and `urn:uuid:`.
pub const UUID_PATTERN: &str = concat!(
    "^(?:[0-9a-fA-F]{32}",
    "|\\{?[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}\\}?",
    "|urn:uuid:[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12})$",
);

/// Absolute http(s)/ftp(s) URL whose host is a dotted domain with a TLD,
/// an IPv4 address, or a bracketed IPv6 address. Bare hosts such as
/// `localhost` are rejected.
pub const URL_PATTERN: &str = concat!(
    "^(?:https?|ftps?)://",
    "(?:[^\\s/?#@]+@)?",
    "(?:(?:[A-Za-z0-9](?:[A-Za-z0-9-]{0,61}[A-Za-z0-9])?\\.)+[A-Za-z0-9-]{2,}\\.?",
    "|\\d{1,3}(?:\\.\\d{1,3}){3}",
    "|\\[[0-9A-Fa-f:.]+\\])",
    "(?::\\d+)?",
    "(?:[/?#]\\S*)?$",
);

fn auth_query_definition() -> Value {
    json!({
        "title": AUTH_QUERY,
        "type": "object",
        "required": ["customer_id", "provider", "role", "return_url"],
        "properties": {
            "customer_id": {"type": "string", "pattern": UUID_PATTERN},
            "provider": {"type": "string", "enum": ["a", "b"]},
            "role": {"type": "string"},
            "return_url": {"type": "string", "pattern": URL_PATTERN}
        }
    })
}

fn auth_request_definition() -> Value {
    json!({
        "title": AUTH_REQUEST,
        "type": "object",
        "required": [QUERY_KEY],
        "properties": {
            "httpMethod": {"type": "string"},
            "path": {"type": "string"},
            QUERY_KEY: {"$ref": "#/$defs/AuthQuery"}
        },
        "$defs": {
            AUTH_QUERY: auth_query_definition()
        }
    })
}

static AUTH_QUERY_SCHEMA: LazyLock<Result<Schema, InvalidSchema>> =
    LazyLock::new(|| Schema::compile(AUTH_QUERY, &auth_query_definition()));

static AUTH_REQUEST_SCHEMA: LazyLock<Result<Schema, InvalidSchema>> =
    LazyLock::new(|| Schema::compile(AUTH_REQUEST, &auth_request_definition()));

impl Serializable for AuthQuery {
    fn schema() -> Result<&'static Schema, &'static InvalidSchema> {
        AUTH_QUERY_SCHEMA.as_ref()
    }
}

impl Serializable for AuthRequest {
    fn schema() -> Result<&'static Schema, &'static InvalidSchema> {
        AUTH_REQUEST_SCHEMA.as_ref()
    }

    fn pre_load(mut raw: Value) -> Result<Value, SchemaError> {
        // Non-objects fall through to the schema check, which reports the type.
        if let Some(doc) = raw.as_object_mut() {
            let Some(query) = doc.get_mut(QUERY_KEY) else {
                return Err(SchemaError::root(
                    AUTH_REQUEST,
                    format!("missing key '{QUERY_KEY}'"),
                ));
            };
            if !is_truthy(query) {
                *query = Value::Object(Map::new());
            }
        }
        Ok(raw)
    }
}
