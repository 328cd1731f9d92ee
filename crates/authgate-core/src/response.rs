//! Response builder.
//!
//! Every handler outcome becomes a [`Response`]: status, headers, optional
//! JSON body. [`error`] is the single place failures turn into bodies.

use std::collections::BTreeMap;
use std::error::Error as StdError;

use http::StatusCode;
use serde::Serialize;
use serde_json::{Value, json};

use crate::error::{ErrorKind, Failure, ServiceError};

pub type Headers = BTreeMap<String, String>;

const CONTENT_TYPE: &str = "content-type";
const LOCATION: &str = "Location";
const APPLICATION_JSON: &str = "application/json";

/// The default header set: a single JSON content type.
pub fn json_headers() -> Headers {
    Headers::from([(CONTENT_TYPE.to_string(), APPLICATION_JSON.to_string())])
}

/// A handler result before encoding.
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    pub headers: Headers,
    pub code: StatusCode,
    pub body: Option<Value>,
}

impl Response {
    /// `None` headers means the default JSON header set.
    pub fn new(code: StatusCode, headers: Option<Headers>, body: Option<Value>) -> Self {
        Self {
            headers: headers.unwrap_or_else(json_headers),
            code,
            body,
        }
    }
}

/// 200 with `body` serialized. Serialization failures are internal errors.
pub fn ok<T: Serialize + ?Sized>(body: &T, headers: Option<Headers>) -> Result<Response, ServiceError> {
    let body = serde_json::to_value(body).map_err(ServiceError::internal_from)?;
    Ok(ok_value(body, headers))
}

/// 200 with an already-built JSON body.
pub fn ok_value(body: Value, headers: Option<Headers>) -> Response {
    Response::new(StatusCode::OK, headers, Some(body))
}

/// 204, no body.
pub fn no_content(headers: Option<Headers>) -> Response {
    Response::new(StatusCode::NO_CONTENT, headers, None)
}

/// 302 with `url` as the only header.
pub fn redirect(url: &str) -> Response {
    let headers = Headers::from([(LOCATION.to_string(), url.to_string())]);
    Response::new(StatusCode::FOUND, Some(headers), None)
}

/// Builds the error response for `failure`. Never fails.
pub fn error(failure: Failure) -> Response {
    match failure {
        Failure::Service(err) => {
            log_service_error(&err);
            Response::new(err.code(), None, Some(err.to_body()))
        }
        Failure::Unclassified { type_name, message } => {
            tracing::error!(%type_name, %message, "unclassified failure");
            let body = json!({ "error": { "message": message, "type": type_name } });
            Response::new(StatusCode::INTERNAL_SERVER_ERROR, None, Some(body))
        }
    }
}

fn log_service_error(err: &ServiceError) {
    match err.kind() {
        ErrorKind::Internal | ErrorKind::Service => match err.source() {
            Some(source) => tracing::error!(error = %err, %source, "internal server error"),
            None => tracing::error!(error = %err, "internal server error"),
        },
        kind => tracing::debug!(%kind, code = err.code().as_u16(), error = %err, "request failed"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, thiserror::Error)]
    #[error("socket closed")]
    struct SocketClosed;

    #[test]
    fn ok_uses_default_headers() {
        let resp = ok(&vec![1, 2], None).unwrap();
        assert_eq!(resp.code, StatusCode::OK);
        assert_eq!(resp.headers, json_headers());
        assert_eq!(resp.body, Some(json!([1, 2])));
    }

    #[test]
    fn ok_keeps_explicit_headers() {
        let headers = Headers::from([("x-trace".to_string(), "1".to_string())]);
        let resp = ok("fine", Some(headers.clone())).unwrap();
        assert_eq!(resp.headers, headers);
    }

    #[test]
    fn ok_surfaces_serialization_failure_as_internal() {
        let mut bad = BTreeMap::new();
        bad.insert(vec![1_u8], 1);
        let err = ok(&bad, None).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Internal);
    }

    #[test]
    fn no_content_has_no_body() {
        let resp = no_content(None);
        assert_eq!(resp.code, StatusCode::NO_CONTENT);
        assert!(resp.body.is_none());
    }

    #[test]
    fn redirect_sets_location_only() {
        let resp = redirect("https://example.com/cb");
        assert_eq!(resp.code, StatusCode::FOUND);
        assert_eq!(resp.headers.len(), 1);
        assert_eq!(resp.headers["Location"], "https://example.com/cb");
    }

    #[test]
    fn error_from_service_error() {
        let err = ServiceError::validation(Some(vec![json!({"f": ["bad"]})]));
        let expected = err.to_body();
        let resp = error(err.into());
        assert_eq!(resp.code, StatusCode::BAD_REQUEST);
        assert_eq!(resp.body, Some(expected));
    }

    #[test]
    fn error_keeps_overridden_code() {
        let err = ServiceError::not_found().with_code(StatusCode::GONE);
        let resp = error(err.into());
        assert_eq!(resp.code, StatusCode::GONE);
    }

    #[test]
    fn error_from_unclassified() {
        let resp = error(Failure::unclassified(SocketClosed));
        assert_eq!(resp.code, StatusCode::INTERNAL_SERVER_ERROR);
        let body = resp.body.unwrap();
        assert_eq!(body["error"]["message"], "socket closed");
        assert_eq!(body["error"]["type"], "SocketClosed");
        assert!(body["error"].get("context").is_none());
    }

    #[test]
    fn internal_source_never_reaches_body() {
        let err = ServiceError::internal_from(SocketClosed).with_description("upstream failed");
        let body = error(err.into()).body.unwrap();
        assert_eq!(body["error"]["message"], "upstream failed");
        assert!(!body.to_string().contains("socket closed"));
    }
}
