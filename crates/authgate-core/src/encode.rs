//! Final encoding: `Response` -> transport envelope.
//!
//! Bodies are rendered with `serde_json`. Records keep their declaration
//! order (`preserve_order`), UUIDs serialize in canonical hyphenated form,
//! and timestamps go through [`Timestamp`] or the [`millis`] helper.

use std::fmt;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

use crate::response::{Headers, Response};

/// Transport-ready envelope handed back to the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope {
    pub status_code: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub headers: Option<Headers>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
}

impl Envelope {
    /// The wire object: `{"statusCode", "headers"?, "body"?}`.
    pub fn to_json(&self) -> Value {
        let mut out = Map::new();
        out.insert("statusCode".into(), Value::from(self.status_code));
        if let Some(headers) = &self.headers {
            let headers = headers
                .iter()
                .map(|(k, v)| (k.clone(), Value::String(v.clone())))
                .collect();
            out.insert("headers".into(), Value::Object(headers));
        }
        if let Some(body) = &self.body {
            out.insert("body".into(), Value::String(body.clone()));
        }
        Value::Object(out)
    }
}

impl fmt::Display for Envelope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_json())
    }
}

/// Encodes `response` for the host.
///
/// Headers are emitted only when non-empty, the body only when truthy.
/// A sequence body is wrapped as `{"data": [...]}`.
pub fn jsonify(response: &Response) -> Envelope {
    let headers = (!response.headers.is_empty()).then(|| response.headers.clone());
    let body = response
        .body
        .as_ref()
        .filter(|b| is_truthy(b))
        .map(|b| match b {
            Value::Array(items) => {
                let mut wrapped = Map::new();
                wrapped.insert("data".into(), Value::Array(items.clone()));
                Value::Object(wrapped).to_string()
            }
            other => other.to_string(),
        });

    Envelope {
        status_code: response.code.as_u16(),
        headers,
        body,
    }
}

/// Truthiness of a body value: null, false, zero, and empty strings,
/// arrays, or objects are falsy.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

/// A UTC instant serialized as RFC 3339 with millisecond precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(pub DateTime<Utc>);

impl Timestamp {
    pub fn now() -> Self {
        Self(Utc::now())
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.to_rfc3339_opts(SecondsFormat::Millis, false))
    }
}

impl Serialize for Timestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        millis::serialize(&self.0, serializer)
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        millis::deserialize(deserializer).map(Self)
    }
}

/// `#[serde(with = "authgate_core::encode::millis")]` for `DateTime<Utc>` fields.
pub mod millis {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(dt: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&dt.to_rfc3339_opts(SecondsFormat::Millis, false))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }
}
