//! Logging setup using `tracing`.
//!
//! The library only emits events; the host app decides whether to install a
//! subscriber by calling [`init_logging`] once at startup.

use thiserror::Error;
use tracing::Level;
use tracing_subscriber::EnvFilter;

#[derive(Error, Debug)]
pub enum LoggingError {
    #[error("Invalid log level: {0}. Must be one of: trace, debug, info, warn, error")]
    InvalidLevel(String),

    #[error("Logging already initialized: {0}")]
    AlreadyInitialized(String),
}

/// Install a console subscriber filtered at `level`.
///
/// `RUST_LOG` takes precedence when set.
pub fn init_logging(level: &str) -> Result<(), LoggingError> {
    let level = parse_log_level(level)?;

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("vet_patients_core={}", level)));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .try_init()
        .map_err(|e| LoggingError::AlreadyInitialized(e.to_string()))?;

    tracing::info!(level = %level, "Logging initialized");
    Ok(())
}

fn parse_log_level(level_str: &str) -> Result<Level, LoggingError> {
    match level_str.to_lowercase().as_str() {
        "trace" => Ok(Level::TRACE),
        "debug" => Ok(Level::DEBUG),
        "info" => Ok(Level::INFO),
        "warn" => Ok(Level::WARN),
        "error" => Ok(Level::ERROR),
        _ => Err(LoggingError::InvalidLevel(level_str.to_string())),
    }
}
