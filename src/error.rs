//! Setup errors for the `authgate` binary.
//!
//! Request-level failures never reach here; they are encoded into the
//! envelope by the handler.

use authgate_core::ConfigError;

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// The event file (or stdin) could not be read.
    #[error("failed to read event from '{path}': {source}")]
    ReadEvent {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The event is not valid JSON.
    #[error("event is not valid JSON: {0}")]
    ParseEvent(#[from] serde_json::Error),

    #[error(transparent)]
    Config(#[from] ConfigError),
}
