//! Driver seam: connectors, sessions, and the tokio-postgres implementation.

use std::error::Error as StdError;
use std::io;
use std::net::IpAddr;
use std::time::Duration;

use async_trait::async_trait;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_postgres::config::Host;
use tokio_postgres::error::SqlState;
use tokio_postgres::types::ToSql;
use tokio_postgres::{Client, NoTls};
use tracing::{debug, warn};

use crate::error::{ConnectError, FailureKind, PgError, PgResult};
use crate::row::PgRecord;

/// An open database session, exclusively owned by whoever opened it.
#[async_trait]
pub trait Session: Send {
    /// Execute a query with text parameters and return all rows.
    async fn query(&mut self, sql: &str, params: &[&str]) -> PgResult<Vec<PgRecord>>;

    /// Execute a query and return exactly one row.
    async fn query_one(&mut self, sql: &str, params: &[&str]) -> PgResult<PgRecord> {
        let mut rows = self.query(sql, params).await?;
        match rows.len() {
            1 => Ok(rows.remove(0)),
            n => Err(PgError::query(format!("expected one row, got {}", n))),
        }
    }

    /// Execute one or more statements without results.
    async fn execute(&mut self, sql: &str) -> PgResult<()>;

    /// Close the session.
    async fn close(self) -> PgResult<()>
    where
        Self: Sized;
}

/// Opens sessions. One call per candidate endpoint.
#[async_trait]
pub trait Connector: Send + Sync {
    /// Session type produced by this connector.
    type Session: Session + 'static;

    /// Open a session to `uri`, giving up after `timeout`.
    async fn connect(&self, uri: &str, timeout: Duration) -> Result<Self::Session, ConnectError>;
}

/// Connector backed by `tokio-postgres` without TLS.
#[derive(Debug, Clone)]
pub struct PgConnector {
    application_name: String,
}

impl Default for PgConnector {
    fn default() -> Self {
        Self::new()
    }
}

impl PgConnector {
    /// Create a connector that reports itself as `pgreach`.
    pub fn new() -> Self {
        Self {
            application_name: "pgreach".to_string(),
        }
    }

    /// Set the application name shown in `pg_stat_activity`.
    pub fn application_name(mut self, name: impl Into<String>) -> Self {
        self.application_name = name.into();
        self
    }
}

#[async_trait]
impl Connector for PgConnector {
    type Session = PgSession;

    async fn connect(&self, uri: &str, timeout: Duration) -> Result<PgSession, ConnectError> {
        let mut config: tokio_postgres::Config = uri
            .parse()
            .map_err(|e| ConnectError::generic(format!("invalid connection string: {}", e)))?;
        config.connect_timeout(timeout);
        if config.get_application_name().is_none() {
            config.application_name(&self.application_name);
        }

        let deadline = Instant::now() + timeout;
        resolve_hosts(&config, deadline).await?;

        debug!(timeout_ms = timeout.as_millis() as u64, "Opening connection");
        let (client, connection) =
            match tokio::time::timeout_at(deadline, config.connect(NoTls)).await {
                Err(_) => {
                    return Err(ConnectError::timeout(format!(
                        "no response within {}ms",
                        timeout.as_millis()
                    )));
                }
                Ok(Err(e)) => return Err(classify(&e)),
                Ok(Ok(pair)) => pair,
            };

        let connection = tokio::spawn(async move {
            if let Err(e) = connection.await {
                warn!(error = %e, "PostgreSQL connection terminated with error");
            }
        });

        Ok(PgSession { client, connection })
    }
}

/// Resolve every TCP host up front so DNS failures are reported as such.
///
/// Shares `deadline` with the connect that follows.
async fn resolve_hosts(
    config: &tokio_postgres::Config,
    deadline: Instant,
) -> Result<(), ConnectError> {
    let ports = config.get_ports();
    let mut last_error = None;
    let mut resolved_any = false;

    for (idx, host) in config.get_hosts().iter().enumerate() {
        let name = match host {
            Host::Tcp(name) => name,
            #[allow(unreachable_patterns)]
            _ => {
                resolved_any = true;
                continue;
            }
        };
        if name.parse::<IpAddr>().is_ok() {
            resolved_any = true;
            continue;
        }

        let port = ports.get(idx).or_else(|| ports.first()).copied().unwrap_or(5432);
        match tokio::time::timeout_at(deadline, tokio::net::lookup_host((name.as_str(), port))).await
        {
            Err(_) => {
                return Err(ConnectError::timeout(format!(
                    "lookup of {} did not finish in time",
                    name
                )));
            }
            Ok(Ok(mut addrs)) => {
                if addrs.next().is_some() {
                    resolved_any = true;
                } else {
                    last_error = Some(format!("{} has no addresses", name));
                }
            }
            Ok(Err(e)) => last_error = Some(format!("could not resolve {}: {}", name, e)),
        }
    }

    match (resolved_any, last_error) {
        (false, Some(message)) => Err(ConnectError::unresolvable(message)),
        _ => Ok(()),
    }
}

/// Classify a driver error by SQLSTATE and I/O error kind.
pub fn classify(err: &tokio_postgres::Error) -> ConnectError {
    let mut io_kind = None;
    let mut source = err.source();
    while let Some(cause) = source {
        if let Some(io_err) = cause.downcast_ref::<io::Error>() {
            io_kind = Some(io_err.kind());
            break;
        }
        source = cause.source();
    }

    ConnectError::new(failure_kind(err.code(), io_kind), error_chain(err))
}

/// Map a SQLSTATE and the underlying I/O error kind to a failure kind.
pub fn failure_kind(code: Option<&SqlState>, io_kind: Option<io::ErrorKind>) -> FailureKind {
    match (code, io_kind) {
        (Some(code), _)
            if *code == SqlState::INVALID_PASSWORD
                || *code == SqlState::INVALID_AUTHORIZATION_SPECIFICATION =>
        {
            FailureKind::Authentication
        }
        (_, Some(io::ErrorKind::TimedOut)) => FailureKind::Timeout,
        _ => FailureKind::Generic,
    }
}

fn error_chain(err: &tokio_postgres::Error) -> String {
    if let Some(db) = err.as_db_error() {
        return db.message().to_string();
    }
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

/// A tokio-postgres client plus the task driving its connection.
pub struct PgSession {
    client: Client,
    connection: JoinHandle<()>,
}

#[async_trait]
impl Session for PgSession {
    async fn query(&mut self, sql: &str, params: &[&str]) -> PgResult<Vec<PgRecord>> {
        debug!(sql = %sql, "Executing query");
        let params: Vec<&(dyn ToSql + Sync)> =
            params.iter().map(|p| p as &(dyn ToSql + Sync)).collect();
        let rows = self.client.query(sql, &params).await?;
        rows.iter().map(PgRecord::from_pg_row).collect()
    }

    async fn execute(&mut self, sql: &str) -> PgResult<()> {
        debug!(sql = %sql, "Executing batch");
        self.client.batch_execute(sql).await?;
        Ok(())
    }

    async fn close(self) -> PgResult<()> {
        debug!("Closing connection");
        let Self { client, connection } = self;
        drop(client);
        connection
            .await
            .map_err(|e| PgError::query(format!("connection task failed: {}", e)))
    }
}
