//! Serialization adapter for domain records.
//!
//! A record names its [`Schema`]; `load`/`loads` then run the same steps
//! through [`wrap_error`]: pre-load hook, schema check, typed decode. Any
//! failure leaves as a `ValidationError` carrying the field messages.

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::error::ServiceError;
use crate::schema::{InvalidSchema, SCHEMA_KEY, Schema, SchemaError};

/// Failures inside the load path. Never returned to callers directly.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("{0}")]
    Schema(#[from] SchemaError),

    #[error("invalid JSON: {0}")]
    Syntax(#[source] serde_json::Error),

    #[error("cannot decode document: {0}")]
    Decode(#[source] serde_json::Error),

    #[error("{0}")]
    Unavailable(#[source] InvalidSchema),
}

impl LoadError {
    /// Field messages for this failure. Non-schema failures are reported on
    /// the document root.
    pub fn normalized_messages(&self) -> Value {
        match self {
            Self::Schema(err) => err.normalized_messages(),
            other => {
                let mut root = Map::new();
                root.insert(
                    SCHEMA_KEY.to_string(),
                    Value::Array(vec![Value::String(other.to_string())]),
                );
                Value::Object(root)
            }
        }
    }
}

/// Runs a load step, translating every failure into the taxonomy.
///
/// Schema, syntax, or decode failures become `ValidationError` carrying
/// the same messages [`Serializable::validate`] reports. A schema that
/// could not be compiled is an internal error.
pub fn wrap_error<T>(load: impl FnOnce() -> Result<T, LoadError>) -> Result<T, ServiceError> {
    load().map_err(|err| match err {
        LoadError::Unavailable(invalid) => ServiceError::internal_from(invalid),
        other => {
            tracing::debug!(error = %other, "document rejected at load boundary");
            ServiceError::validation(Some(vec![other.normalized_messages()]))
        }
    })
}

/// A domain record that can be parsed, validated, and serialized.
pub trait Serializable: Serialize + DeserializeOwned {
    /// The schema raw documents are checked against before decoding.
    fn schema() -> Result<&'static Schema, &'static InvalidSchema>;

    /// Adjusts the raw document before the schema check. May reject it.
    fn pre_load(raw: Value) -> Result<Value, SchemaError> {
        Ok(raw)
    }

    /// Field messages describing why `raw` would not load, or `None`.
    fn validate(raw: &Value) -> Option<Value> {
        decode::<Self>(raw.clone())
            .err()
            .map(|err| err.normalized_messages())
    }

    fn load(raw: &Value) -> Result<Self, ServiceError> {
        wrap_error(|| decode(raw.clone()))
    }

    fn loads(json: &str) -> Result<Self, ServiceError> {
        wrap_error(|| {
            let raw = serde_json::from_str(json).map_err(LoadError::Syntax)?;
            decode(raw)
        })
    }

    fn dump(&self) -> Result<Value, ServiceError> {
        serde_json::to_value(self).map_err(ServiceError::internal_from)
    }

    fn dumps(&self) -> Result<String, ServiceError> {
        serde_json::to_string(self).map_err(ServiceError::internal_from)
    }
}

fn decode<T: Serializable>(raw: Value) -> Result<T, LoadError> {
    let schema = T::schema().map_err(|e| LoadError::Unavailable(e.clone()))?;
    let prepared = T::pre_load(raw)?;
    schema.check(&prepared)?;
    serde_json::from_value(prepared).map_err(LoadError::Decode)
}
