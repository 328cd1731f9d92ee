//! authgate - the OAuth2 auth endpoint built on `authgate-core`.
//!
//! - `types` / `schema`: the `AuthRequest` record and its schema
//! - `validators`: the named validator registry
//! - `service`: business logic and the wrapped handler
//! - `invocation`: context, event input, and a single simulated run

pub mod config;
pub mod error;
pub mod invocation;
pub mod schema;
pub mod service;
pub mod types;
pub mod validators;

pub use error::CliError;
pub use invocation::{InvocationContext, run};
pub use service::{build_handler, default_handler, main_handler};
