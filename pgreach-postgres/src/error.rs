//! Error types for endpoint resolution and database routines.

use std::fmt;

use thiserror::Error;

/// Result type for PostgreSQL operations.
pub type PgResult<T> = Result<T, PgError>;

/// Errors that can occur while resolving endpoints or running routines.
#[derive(Error, Debug)]
pub enum PgError {
    /// PostgreSQL error.
    #[error("postgres error: {0}")]
    Postgres(#[from] tokio_postgres::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// Connection error.
    #[error("connection error: {0}")]
    Connection(#[from] ConnectError),

    /// Query execution error.
    #[error("query error: {0}")]
    Query(String),

    /// Row deserialization error.
    #[error("deserialization error: {0}")]
    Deserialization(String),

    /// Every candidate endpoint was tried and none accepted a connection.
    #[error("all {attempts} connection strategies failed")]
    Exhausted {
        /// Number of candidates attempted.
        attempts: usize,
    },
}

impl PgError {
    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a query error.
    pub fn query(message: impl Into<String>) -> Self {
        Self::Query(message.into())
    }

    /// Create a deserialization error.
    pub fn deserialization(message: impl Into<String>) -> Self {
        Self::Deserialization(message.into())
    }

    /// Check if this is a connection error.
    pub fn is_connection_error(&self) -> bool {
        matches!(self, Self::Connection(_) | Self::Exhausted { .. })
    }

    /// Check if this is a timeout error.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Connection(e) if e.kind == FailureKind::Timeout)
    }
}

/// Classification of a failed connection attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    /// The attempt did not complete within its timeout.
    Timeout,
    /// The server rejected the supplied credentials.
    Authentication,
    /// The endpoint host name did not resolve.
    HostUnresolvable,
    /// Anything else: refused connections, protocol errors, bad URIs.
    Generic,
}

impl FailureKind {
    /// Short operator-facing hint for this failure, if there is one.
    pub fn hint(self) -> Option<&'static str> {
        match self {
            Self::Authentication => Some("authentication issue detected"),
            Self::HostUnresolvable => Some("host name could not be resolved"),
            Self::Timeout => Some("endpoint did not answer in time"),
            Self::Generic => None,
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Timeout => "timeout",
            Self::Authentication => "authentication",
            Self::HostUnresolvable => "unresolvable host",
            Self::Generic => "connection failure",
        };
        f.write_str(name)
    }
}

/// A single failed connection attempt, classified by the driver.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{kind}: {message}")]
pub struct ConnectError {
    /// Failure classification.
    pub kind: FailureKind,
    /// Driver-provided message.
    pub message: String,
}

impl ConnectError {
    /// Create a new connect error.
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Create a timeout error.
    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(FailureKind::Timeout, message)
    }

    /// Create an authentication error.
    pub fn authentication(message: impl Into<String>) -> Self {
        Self::new(FailureKind::Authentication, message)
    }

    /// Create an unresolvable-host error.
    pub fn unresolvable(message: impl Into<String>) -> Self {
        Self::new(FailureKind::HostUnresolvable, message)
    }

    /// Create a generic connection error.
    pub fn generic(message: impl Into<String>) -> Self {
        Self::new(FailureKind::Generic, message)
    }

    /// The message cut down to at most `limit` characters.
    pub fn truncated(&self, limit: usize) -> String {
        truncate(&self.message, limit)
    }
}

/// Cut `text` to at most `limit` characters on a char boundary.
pub fn truncate(text: &str, limit: usize) -> String {
    match text.char_indices().nth(limit) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}
