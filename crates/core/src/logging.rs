//! Logging infrastructure for vecsearch.
//!
//! Initializes the tracing subscriber. All logs go to stderr so that
//! query results and embeddings printed on stdout stay machine-readable.

use std::io::IsTerminal;

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::error::{AppError, AppResult};

/// Default filter when neither `RUST_LOG` nor an override is given.
const DEFAULT_FILTER: &str = "info";

/// Initialize the tracing subscriber with stderr output.
///
/// # Arguments
/// * `log_level` - Optional filter override (e.g., "debug", "vecsearch_index=trace")
/// * `no_color` - Disable colored output
///
/// # Example
/// ```no_run
/// use vecsearch_core::logging::init_logging;
///
/// init_logging(None, false).expect("Failed to initialize logging");
/// ```
pub fn init_logging(log_level: Option<&str>, no_color: bool) -> AppResult<()> {
    let default_level = std::env::var("RUST_LOG").unwrap_or_else(|_| DEFAULT_FILTER.to_string());
    let filter_str = log_level.unwrap_or(&default_level);

    let env_filter = build_filter(filter_str)?;

    let fmt_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_level(true)
        .with_ansi(!no_color && supports_color());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()
        .map_err(|e| AppError::Config(format!("Failed to init logging: {}", e)))?;

    Ok(())
}

/// Parse a filter directive string.
fn build_filter(filter_str: &str) -> AppResult<EnvFilter> {
    EnvFilter::try_new(filter_str)
        .map_err(|e| AppError::Config(format!("Invalid log filter '{}': {}", filter_str, e)))
}

/// Check if stderr can render ANSI colors.
fn supports_color() -> bool {
    if std::env::var("NO_COLOR").is_ok() {
        return false;
    }

    std::io::stderr().is_terminal()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_filter_accepts_directives() {
        assert!(build_filter("debug").is_ok());
        assert!(build_filter("vecsearch_index=trace,reqwest=warn").is_ok());
    }

    #[test]
    fn test_build_filter_rejects_garbage() {
        let err = build_filter("vecsearch=notalevel").unwrap_err();
        assert!(err.to_string().contains("Invalid log filter"));
    }
}
