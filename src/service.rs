//! The auth endpoint: business logic and its wrapped handler.

use authgate_core::{ConfigError, Handler, Response, Serializable, ServiceError, Validator, ok};
use serde_json::Value;

use crate::invocation::InvocationContext;
use crate::types::AuthRequest;
use crate::validators;

/// Placeholder computation behind the auth endpoint.
pub fn service() -> &'static str {
    "awesome result after calculation"
}

/// Business function for `GET /v1/oauth2/auth`.
///
/// The event has already passed the configured validators, but it is
/// loaded again here so the call works on a typed record.
pub fn main_handler(event: &Value, context: &InvocationContext) -> Result<Response, ServiceError> {
    let request = AuthRequest::load(event)?;
    tracing::info!(
        customer_id = %request.query.customer_id,
        provider = %request.query.provider,
        role = %request.query.role,
        function = %context.function_name,
        "auth request accepted",
    );
    ok(service(), None)
}

/// Wraps [`main_handler`] with the given validators.
pub fn build_handler(
    validators: Vec<Box<dyn Validator>>,
) -> Result<Handler<InvocationContext>, ConfigError> {
    Handler::builder().validators(validators).build(main_handler)
}

/// The handler as deployed: a single `AuthRequest` validator.
pub fn default_handler() -> Result<Handler<InvocationContext>, ConfigError> {
    Handler::builder()
        .validate(validators::validate_request)
        .build(main_handler)
}
