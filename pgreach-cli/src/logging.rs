//! Structured logging for the CLI, controlled by environment variables.
//!
//! # Environment Variables
//!
//! - `PGREACH_DEBUG=true|1|yes` - Enable debug logging
//! - `PGREACH_LOG_LEVEL=trace|debug|info|warn|error` - Set a specific level
//! - `PGREACH_LOG_FORMAT=json|pretty|compact` - Output format (default: json)
//!
//! Logs are written to stderr; stdout carries the report.

use std::env;
use std::sync::Once;

static INIT: Once = Once::new();

/// Check if debug logging is enabled via `PGREACH_DEBUG`.
#[inline]
pub fn is_debug_enabled() -> bool {
    env::var("PGREACH_DEBUG")
        .map(|v| matches!(v.to_lowercase().as_str(), "true" | "1" | "yes"))
        .unwrap_or(false)
}

/// Normalize a level name, falling back to `fallback` for unknown values.
fn parse_level(level: &str, fallback: &'static str) -> &'static str {
    match level.to_lowercase().as_str() {
        "trace" => "trace",
        "debug" => "debug",
        "info" => "info",
        "warn" => "warn",
        "error" => "error",
        _ => fallback,
    }
}

/// Get the configured log level from `PGREACH_LOG_LEVEL`.
///
/// Defaults to "debug" if `PGREACH_DEBUG` is enabled, otherwise "warn".
pub fn get_log_level() -> &'static str {
    let fallback = if is_debug_enabled() { "debug" } else { "warn" };
    env::var("PGREACH_LOG_LEVEL")
        .map(|level| parse_level(&level, fallback))
        .unwrap_or(fallback)
}

/// Get the configured log format from `PGREACH_LOG_FORMAT`.
pub fn get_log_format() -> &'static str {
    env::var("PGREACH_LOG_FORMAT")
        .map(|f| match f.to_lowercase().as_str() {
            "pretty" => "pretty",
            "compact" => "compact",
            _ => "json",
        })
        .unwrap_or("json")
}

/// Initialize logging from the environment.
///
/// Does nothing unless `PGREACH_DEBUG` or `PGREACH_LOG_LEVEL` is set.
/// Subsequent calls are no-ops.
pub fn init() {
    if !is_debug_enabled() && env::var("PGREACH_LOG_LEVEL").is_err() {
        return;
    }
    install(get_log_level());
}

/// Initialize logging at `level`, regardless of the environment.
pub fn init_with_level(level: &str) {
    install(parse_level(level, "debug"));
}

fn install(level: &'static str) {
    INIT.call_once(|| {
        use tracing_subscriber::{EnvFilter, fmt, prelude::*};

        let filter = EnvFilter::try_new(format!(
            "pgreach={level},pgreach_postgres={level},pgreach_cli={level}"
        ))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

        let format = get_log_format();
        match format {
            "json" => {
                tracing_subscriber::registry()
                    .with(filter)
                    .with(fmt::layer().json().with_writer(std::io::stderr))
                    .init();
            }
            "compact" => {
                tracing_subscriber::registry()
                    .with(filter)
                    .with(fmt::layer().compact().with_writer(std::io::stderr))
                    .init();
            }
            _ => {
                tracing_subscriber::registry()
                    .with(filter)
                    .with(fmt::layer().pretty().with_writer(std::io::stderr))
                    .init();
            }
        }

        tracing::info!(level, format, "pgreach logging initialized");
    });
}
