// src/logging.rs

//! Installs the global tracing subscriber.
//!
//! Events go to stderr so reports on stdout stay machine-readable. The level
//! defaults to `warn`, or `debug` when requested; `RUST_LOG` takes precedence.

use tracing_subscriber::EnvFilter;

const DEFAULT_LEVEL: &str = "warn";
const DEBUG_LEVEL: &str = "debug";

#[derive(Debug, thiserror::Error)]
pub enum LoggingError {
    #[error("failed to install global tracing subscriber: {0}")]
    SetGlobal(Box<dyn std::error::Error + Send + Sync>),
}

/// Directive used when `RUST_LOG` is unset or unparsable.
pub fn default_directive(debug: bool) -> &'static str {
    if debug {
        DEBUG_LEVEL
    } else {
        DEFAULT_LEVEL
    }
}

pub fn init(debug: bool) -> Result<(), LoggingError> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive(debug)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .map_err(LoggingError::SetGlobal)
}
