//! CLI error types and result alias.

use miette::Diagnostic;
use pgreach_postgres::PgError;
use thiserror::Error;

/// Result type alias for CLI operations
pub type CliResult<T> = Result<T, CliError>;

/// CLI error types
#[derive(Error, Debug, Diagnostic)]
pub enum CliError {
    /// IO error
    #[error("IO error: {0}")]
    #[diagnostic(code(pgreach::io))]
    Io(#[from] std::io::Error),

    /// Configuration error
    #[error("Configuration error: {0}")]
    #[diagnostic(code(pgreach::config))]
    Config(String),

    /// Database error
    #[error("Database error: {0}")]
    #[diagnostic(code(pgreach::database))]
    Database(String),

    /// Every connection strategy failed
    #[error("All {attempts} connection strategies failed")]
    #[diagnostic(
        code(pgreach::exhausted),
        help("work through the troubleshooting tips above")
    )]
    Exhausted {
        /// Number of candidates attempted
        attempts: usize,
    },
}

impl From<toml::de::Error> for CliError {
    fn from(err: toml::de::Error) -> Self {
        CliError::Config(format!("Failed to parse TOML: {}", err))
    }
}

impl From<dotenvy::Error> for CliError {
    fn from(err: dotenvy::Error) -> Self {
        CliError::Config(format!("Failed to load environment file: {}", err))
    }
}

impl From<PgError> for CliError {
    fn from(err: PgError) -> Self {
        match err {
            PgError::Config(msg) => CliError::Config(msg),
            PgError::Exhausted { attempts } => CliError::Exhausted { attempts },
            other => CliError::Database(other.to_string()),
        }
    }
}
