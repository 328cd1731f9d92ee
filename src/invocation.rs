//! Simulated cloud function invocation: context, event input, and a
//! single run of the configured handler.

use std::io::Read;

use authgate_core::{Envelope, Timestamp};
use serde::Serialize;
use serde_json::{Value, json};
use uuid::Uuid;

use crate::config::Config;
use crate::error::CliError;
use crate::service;
use crate::validators;

/// Host context handed to the business function alongside the event.
#[derive(Debug, Clone, Serialize)]
pub struct InvocationContext {
    pub request_id: Uuid,
    pub function_name: String,
    pub invoked_at: Timestamp,
}

impl InvocationContext {
    pub fn new(function_name: impl Into<String>) -> Self {
        Self {
            request_id: Uuid::new_v4(),
            function_name: function_name.into(),
            invoked_at: Timestamp::now(),
        }
    }

    /// Span that every log line of this invocation is recorded under.
    pub fn span(&self) -> tracing::Span {
        tracing::info_span!(
            "invoke",
            request_id = %self.request_id,
            function = %self.function_name,
        )
    }
}

/// A well-formed `GET /v1/oauth2/auth` event.
pub fn sample_event() -> Value {
    json!({
        "httpMethod": "GET",
        "path": "/v1/oauth2/auth",
        "queryStringParameters": {
            "customer_id": "2a170066-62fa-4a6e-afee-965ec3615fd2",
            "provider": "a",
            "role": "admin",
            "return_url": "https://example.com"
        }
    })
}

/// Reads the event from a file, from stdin for `-`, or falls back to
/// [`sample_event`].
pub fn read_event(source: Option<&str>) -> Result<Value, CliError> {
    let text = match source {
        None => return Ok(sample_event()),
        Some("-") => {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .map_err(|source| CliError::ReadEvent {
                    path: "-".to_string(),
                    source,
                })?;
            text
        }
        Some(path) => std::fs::read_to_string(path).map_err(|source| CliError::ReadEvent {
            path: path.to_string(),
            source,
        })?,
    };
    Ok(serde_json::from_str(&text)?)
}

/// Builds the handler from `config`, reads the event, and invokes once.
///
/// Errors are setup failures only. A rejected event still yields an
/// envelope.
pub fn run(config: &Config) -> Result<Envelope, CliError> {
    let handler = service::build_handler(validators::resolve(&config.validators)?)?;
    let event = read_event(config.event.as_deref())?;

    let context = InvocationContext::new(&config.function_name);
    let _guard = context.span().entered();
    tracing::info!(validators = handler.validator_count(), "invoking handler");

    let envelope = handler.invoke(&event, &context);
    tracing::info!(status = envelope.status_code, "invocation complete");
    Ok(envelope)
}
