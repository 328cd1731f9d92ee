//! Error taxonomy for authgate handlers.
//!
//! `ServiceError` is the only error shape the response layer knows about.
//! Foreign errors (schema violations, JSON syntax, anything a business
//! function returns) are translated here, at one boundary, and nowhere else.

use std::any::Any;
use std::error::Error as StdError;
use std::fmt;

use http::StatusCode;
use serde_json::{Map, Value};

use crate::schema::SchemaError;

type BoxError = Box<dyn StdError + Send + Sync + 'static>;

/// The closed set of service error kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Base kind produced by [`ServiceError::wrap`].
    Service,
    /// Malformed request, generic.
    BadRequest,
    /// Schema or validator rejection. Part of the bad-request family.
    Validation,
    /// Requested resource absent.
    NotFound,
    /// Unexpected failure. The original error stays internal.
    Internal,
}

impl ErrorKind {
    pub fn default_code(self) -> StatusCode {
        match self {
            Self::Service | Self::Internal => StatusCode::INTERNAL_SERVER_ERROR,
            Self::BadRequest | Self::Validation => StatusCode::BAD_REQUEST,
            Self::NotFound => StatusCode::NOT_FOUND,
        }
    }

    pub fn default_description(self) -> &'static str {
        match self {
            Self::Service => "The service was unable to complete your request.",
            Self::BadRequest => "The client sent a request that this server could not understand.",
            Self::Validation => "One or more parameters are invalid.",
            Self::NotFound => "The requested URL was not found on the server.",
            Self::Internal => {
                "The server encountered an internal error and was unable to complete your request."
            }
        }
    }

    /// Name emitted as `error.type` in response bodies.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Service => "ServiceError",
            Self::BadRequest => "BadRequest",
            Self::Validation => "ValidationError",
            Self::NotFound => "NotFound",
            Self::Internal => "InternalServerError",
        }
    }

    /// Whether this kind carries a `context` entry in its body.
    pub fn is_bad_request(self) -> bool {
        matches!(self, Self::BadRequest | Self::Validation)
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A classified service failure.
///
/// Construct through the per-kind helpers, then optionally override the code
/// or description. Bodies are produced by [`ServiceError::to_body`], which
/// cannot fail.
#[derive(Debug, thiserror::Error)]
#[error("{description}")]
pub struct ServiceError {
    kind: ErrorKind,
    code: StatusCode,
    description: String,
    context: Option<Vec<Value>>,
    #[source]
    source: Option<BoxError>,
}

impl ServiceError {
    /// Creates an error of `kind` with its default code and description.
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            code: kind.default_code(),
            description: kind.default_description().to_string(),
            context: None,
            source: None,
        }
    }

    pub fn bad_request(context: Option<Vec<Value>>) -> Self {
        Self::new(ErrorKind::BadRequest).with_context(context)
    }

    pub fn validation(context: Option<Vec<Value>>) -> Self {
        Self::new(ErrorKind::Validation).with_context(context)
    }

    pub fn not_found() -> Self {
        Self::new(ErrorKind::NotFound)
    }

    pub fn internal() -> Self {
        Self::new(ErrorKind::Internal)
    }

    // --- Overrides ---

    pub fn with_code(mut self, code: StatusCode) -> Self {
        self.code = code;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Replaces the field-level context. Ignored on the wire for kinds
    /// outside the bad-request family.
    pub fn with_context(mut self, context: Option<Vec<Value>>) -> Self {
        self.context = context;
        self
    }

    // --- Wrapping foreign errors ---

    /// Generic wrap: base kind, status 500, description taken from `err`.
    pub fn wrap<E: StdError + ?Sized>(err: &E) -> Self {
        Self::new(ErrorKind::Service)
            .with_code(StatusCode::INTERNAL_SERVER_ERROR)
            .with_description(err.to_string())
    }

    /// Bad-request wrap: keeps the normalized field messages of `err` as
    /// context when it has any, otherwise the context is null.
    pub fn bad_request_from<E: StdError + 'static>(err: &E) -> Self {
        Self::bad_request(field_context(err))
    }

    /// Same as [`ServiceError::bad_request_from`] but of the validation kind.
    pub fn validation_from<E: StdError + 'static>(err: &E) -> Self {
        Self::validation(field_context(err))
    }

    /// Internal wrap: the public description is `err`'s message and `err`
    /// itself is retained as the error source for diagnostics.
    pub fn internal_from<E>(err: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        let description = err.to_string();
        Self {
            source: Some(Box::new(err)),
            ..Self::internal().with_description(description)
        }
    }

    // --- Accessors ---

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn code(&self) -> StatusCode {
        self.code
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn context(&self) -> Option<&[Value]> {
        self.context.as_deref()
    }

    /// JSON-safe body: `{"error": {"message", "type", "context"?}}`.
    pub fn to_body(&self) -> Value {
        let mut detail = Map::new();
        detail.insert("message".into(), Value::String(self.description.clone()));
        detail.insert("type".into(), Value::String(self.kind.as_str().into()));
        if self.kind.is_bad_request() {
            let context = self
                .context
                .as_ref()
                .map_or(Value::Null, |items| Value::Array(items.clone()));
            detail.insert("context".into(), context);
        }
        let mut body = Map::new();
        body.insert("error".into(), Value::Object(detail));
        Value::Object(body)
    }
}

/// Looks for schema violations in `err` or anywhere in its source chain.
fn field_context<E: StdError + 'static>(err: &E) -> Option<Vec<Value>> {
    let mut current: Option<&(dyn StdError + 'static)> = Some(err);
    while let Some(e) = current {
        if let Some(schema) = e.downcast_ref::<SchemaError>() {
            return Some(vec![schema.normalized_messages()]);
        }
        current = e.source();
    }
    None
}

/// Everything that can reach the response builder.
///
/// `Service` covers the taxonomy; `Unclassified` is the catch-all for
/// errors and panics that were never translated.
#[derive(Debug)]
pub enum Failure {
    Service(ServiceError),
    Unclassified { type_name: String, message: String },
}

impl Failure {
    /// Captures an untranslated error together with its concrete type name.
    ///
    /// Pass the error by its concrete type. Smart pointers around it are
    /// looked through, but the name of a type-erased error is not
    /// recoverable.
    pub fn unclassified<E: StdError + 'static>(err: E) -> Self {
        Self::Unclassified {
            type_name: short_type_name(std::any::type_name::<E>()).to_string(),
            message: err.to_string(),
        }
    }

    /// Converts a caught panic payload.
    pub fn panic(payload: Box<dyn Any + Send>) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "handler panicked".to_string()
        };
        Self::Unclassified {
            type_name: "Panic".to_string(),
            message,
        }
    }
}

impl From<ServiceError> for Failure {
    fn from(err: ServiceError) -> Self {
        Self::Service(err)
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Service(err) => write!(f, "{}: {err}", err.kind()),
            Self::Unclassified { type_name, message } => write!(f, "{type_name}: {message}"),
        }
    }
}

/// Last path segment with generics stripped: `serde_json::error::Error` ->
/// `Error`. `Box`, `Arc` and `Rc` are looked through, so
/// `alloc::boxed::Box<my::DiskFull>` -> `DiskFull`. A trait object has no
/// concrete name left, so `Box<dyn Error>` stays `Box`.
fn short_type_name(full: &str) -> &str {
    let (base, args) = match full.split_once('<') {
        Some((base, rest)) => (base, rest.strip_suffix('>')),
        None => (full, None),
    };
    let name = base.rsplit("::").next().unwrap_or(base);
    match args {
        Some(inner) if matches!(name, "Box" | "Arc" | "Rc") && !inner.starts_with("dyn ") => {
            short_type_name(inner)
        }
        _ => name,
    }
}

/// Setup-time configuration errors. Fatal, never produced per request.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("the 'validate' option must be a validator or a list of validators")]
    MissingValidators,

    #[error("unknown validator '{0}'")]
    UnknownValidator(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, thiserror::Error)]
    #[error("disk on fire")]
    struct DiskOnFire;

    #[test]
    fn defaults_per_kind() {
        let err = ServiceError::not_found();
        assert_eq!(err.code(), StatusCode::NOT_FOUND);
        assert_eq!(
            err.description(),
            "The requested URL was not found on the server."
        );

        let err = ServiceError::validation(None);
        assert_eq!(err.code(), StatusCode::BAD_REQUEST);
        assert!(err.kind().is_bad_request());
    }

    #[test]
    fn overrides_replace_defaults() {
        let err = ServiceError::bad_request(None)
            .with_code(StatusCode::UNPROCESSABLE_ENTITY)
            .with_description("nope");
        assert_eq!(err.code(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(err.to_string(), "nope");
        assert_eq!(err.kind(), ErrorKind::BadRequest);
    }

    #[test]
    fn body_without_context_for_non_bad_request() {
        let body = ServiceError::not_found().to_body();
        assert_eq!(body["error"]["type"], "NotFound");
        assert!(body["error"].get("context").is_none());
    }

    #[test]
    fn body_with_null_context() {
        let body = ServiceError::bad_request(None).to_body();
        assert_eq!(body["error"]["type"], "BadRequest");
        assert!(body["error"]["context"].is_null());
    }

    #[test]
    fn generic_wrap_is_500_with_message() {
        let err = ServiceError::wrap(&DiskOnFire);
        assert_eq!(err.kind(), ErrorKind::Service);
        assert_eq!(err.code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.to_body()["error"]["message"], "disk on fire");
        assert_eq!(err.to_body()["error"]["type"], "ServiceError");
    }

    #[test]
    fn bad_request_wrap_degrades_to_null_context() {
        let err = ServiceError::bad_request_from(&DiskOnFire);
        assert!(err.context().is_none());
        assert_eq!(err.code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn bad_request_wrap_extracts_schema_messages() {
        let schema_err = SchemaError::root("Thing", "missing key 'x'");
        let err = ServiceError::validation_from(&schema_err);
        let context = err.context().unwrap();
        assert_eq!(context.len(), 1);
        assert_eq!(context[0]["_schema"][0], "missing key 'x'");
    }

    #[test]
    fn internal_wrap_keeps_source_out_of_body() {
        let err = ServiceError::internal_from(DiskOnFire);
        assert_eq!(err.kind(), ErrorKind::Internal);
        assert_eq!(err.description(), "disk on fire");
        let source = StdError::source(&err).unwrap();
        assert!(source.downcast_ref::<DiskOnFire>().is_some());

        let body = err.to_body();
        assert_eq!(body["error"].as_object().unwrap().len(), 2);
    }

    #[test]
    fn unclassified_records_type_name() {
        match Failure::unclassified(DiskOnFire) {
            Failure::Unclassified { type_name, message } => {
                assert_eq!(type_name, "DiskOnFire");
                assert_eq!(message, "disk on fire");
            }
            Failure::Service(_) => panic!("expected unclassified"),
        }
    }

    #[test]
    fn panic_payloads() {
        let failure = Failure::panic(Box::new("boom"));
        assert_eq!(failure.to_string(), "Panic: boom");
        let failure = Failure::panic(Box::new(String::from("bang")));
        assert_eq!(failure.to_string(), "Panic: bang");
        let failure = Failure::panic(Box::new(7_u8));
        assert_eq!(failure.to_string(), "Panic: handler panicked");
    }

    #[test]
    fn short_type_names() {
        assert_eq!(short_type_name("serde_json::error::Error"), "Error");
        assert_eq!(short_type_name("alloc::boxed::Box<dyn core::error::Error>"), "Box");
        assert_eq!(short_type_name("alloc::sync::Arc<io::Error>"), "Error");
        assert_eq!(short_type_name("my::Wrapper<u8>"), "Wrapper");
        assert_eq!(short_type_name("Plain"), "Plain");
    }

    #[test]
    fn unclassified_looks_through_box() {
        match Failure::unclassified(Box::new(DiskOnFire)) {
            Failure::Unclassified { type_name, message } => {
                assert_eq!(type_name, "DiskOnFire");
                assert_eq!(message, "disk on fire");
            }
            Failure::Service(_) => panic!("expected unclassified"),
        }
    }
}
