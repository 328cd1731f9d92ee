//! authgate entry point: invokes the handler once and prints the envelope.

use std::process::ExitCode;

use tracing_subscriber::EnvFilter;

use authgate::config::Config;

fn main() -> ExitCode {
    let config = Config::parse();

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    // stdout carries the envelope, so logs go to stderr.
    if config.log_format == "json" {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .init();
    }

    tracing::debug!(
        version = env!("CARGO_PKG_VERSION"),
        validators = ?config.validators,
        "authgate starting",
    );

    let envelope = match authgate::run(&config) {
        Ok(envelope) => envelope,
        Err(e) => {
            tracing::error!("{e}");
            return ExitCode::FAILURE;
        }
    };

    let json = envelope.to_json();
    let printed = if config.pretty {
        serde_json::to_string_pretty(&json)
    } else {
        serde_json::to_string(&json)
    };
    match printed {
        Ok(text) => {
            println!("{text}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!("failed to print envelope: {e}");
            ExitCode::FAILURE
        }
    }
}
