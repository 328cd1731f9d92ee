//! Invocation configuration via CLI args and environment variables.

use clap::Parser;

/// Invokes the authgate OAuth2 auth handler once, the way a cloud function
/// host would, and prints the response envelope.
#[derive(Parser, Debug, Clone)]
#[command(name = "authgate", version, about)]
pub struct Config {
    /// Event document: a file path, or `-` for stdin. Omit for the built-in sample event.
    #[arg(long, env = "AUTHGATE_EVENT")]
    pub event: Option<String>,

    /// Validators to run, in order (comma-separated). Known: request, method.
    #[arg(
        long,
        default_value = "request",
        env = "AUTHGATE_VALIDATORS",
        value_delimiter = ','
    )]
    pub validators: Vec<String>,

    /// Function name reported in the invocation context.
    #[arg(long, default_value = "authgate", env = "AUTHGATE_FUNCTION_NAME")]
    pub function_name: String,

    /// Pretty-print the envelope.
    #[arg(long)]
    pub pretty: bool,

    /// Log level.
    #[arg(long, default_value = "info", env = "AUTHGATE_LOG_LEVEL")]
    pub log_level: String,

    /// Log format: "text" or "json".
    #[arg(long, default_value = "text", env = "AUTHGATE_LOG_FORMAT")]
    pub log_format: String,
}

impl Config {
    /// Parses configuration from CLI args and env vars.
    pub fn parse() -> Self {
        <Self as Parser>::parse()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            event: None,
            validators: vec!["request".to_string()],
            function_name: "authgate".to_string(),
            pretty: false,
            log_level: "info".to_string(),
            log_format: "text".to_string(),
        }
    }
}
