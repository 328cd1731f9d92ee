//! authgate core: the in-process contract between a raw event and the
//! wire response of a single request/response handler.
//!
//! - `error`: the error taxonomy and the boundary that translates foreign
//!   errors into it
//! - `schema` / `serializable`: JSON Schema checks and the load/dump
//!   adapter for domain records
//! - `response` / `encode`: response builder and the final envelope
//! - `handler`: validators, business call, catch-all, final encode
//!
//! **No transport dependencies.** Hosts hand in an event and receive an
//! [`Envelope`].

pub mod encode;
pub mod error;
pub mod handler;
pub mod response;
pub mod schema;
pub mod serializable;

pub use encode::{Envelope, Timestamp, jsonify};
pub use error::{ConfigError, ErrorKind, Failure, ServiceError};
pub use handler::{Handler, HandlerBuilder, Validator};
pub use response::{Headers, Response, error, no_content, ok, ok_value, redirect};
pub use schema::{InvalidSchema, Schema, SchemaError};
pub use serializable::{LoadError, Serializable, wrap_error};
