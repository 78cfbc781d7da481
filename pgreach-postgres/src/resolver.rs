//! Ordered multi-strategy connection resolution.
//!
//! The resolver expands its candidate sources into an attempt plan and walks
//! it strictly in order: pooled regions, then the direct URI, then the IPv6
//! variant of the direct URI (with the default sources). The first candidate
//! that accepts a connection wins; every failure is recorded and the walk
//! continues. Only running out of candidates is an error.

use thiserror::Error;
use tracing::{info, warn};

use crate::candidate::{CandidateSource, EndpointCandidate, default_sources, plan};
use crate::config::ResolverConfig;
use crate::connection::Connector;
use crate::error::{ConnectError, FailureKind, PgError, PgResult};
use crate::routine::{Routine, run_scoped};

/// Guidance printed when every strategy has failed.
pub const TROUBLESHOOTING_TIPS: [&str; 5] = [
    "Check the project settings for the correct database host and region",
    "Verify the database credentials in the connection string",
    "Check firewall and network settings for outbound PostgreSQL traffic",
    "Direct hosts may be IPv6-only; prefer a pooled endpoint on IPv4-only networks",
    "Open the platform dashboard to confirm the project is active and not paused",
];

/// Progress callbacks. All methods default to doing nothing.
pub trait ProbeListener: Send + Sync {
    /// About to try `candidate`.
    fn attempting(&self, _candidate: &EndpointCandidate) {}

    /// `candidate` failed with `error`.
    fn failed(&self, _candidate: &EndpointCandidate, _error: &ConnectError) {}

    /// `candidate` accepted the connection.
    fn connected(&self, _candidate: &EndpointCandidate) {}
}

/// A listener that ignores every event.
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentListener;

impl ProbeListener for SilentListener {}

/// A failed attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttemptRecord {
    /// Candidate tried.
    pub candidate: EndpointCandidate,
    /// Why it failed.
    pub error: ConnectError,
}

/// Every candidate failed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("all {} connection strategies failed", .failures.len())]
pub struct Exhausted {
    /// Failures, in attempt order.
    pub failures: Vec<AttemptRecord>,
}

impl Exhausted {
    /// Number of failures of the given kind.
    pub fn count(&self, kind: FailureKind) -> usize {
        self.failures.iter().filter(|f| f.error.kind == kind).count()
    }
}

impl From<Exhausted> for PgError {
    fn from(err: Exhausted) -> Self {
        PgError::Exhausted {
            attempts: err.failures.len(),
        }
    }
}

/// An open session and the candidate that produced it.
pub struct Resolved<S> {
    /// Winning candidate.
    pub candidate: EndpointCandidate,
    /// Open session.
    pub session: S,
    /// Candidates that failed before the winner.
    pub failures: Vec<AttemptRecord>,
}

/// Result of resolving and then running a routine.
#[derive(Debug)]
pub struct Outcome<T> {
    /// Winning candidate.
    pub candidate: EndpointCandidate,
    /// Candidates that failed before the winner.
    pub failures: Vec<AttemptRecord>,
    /// The routine's result. The session is already closed.
    pub result: PgResult<T>,
}

/// Walks candidate endpoints in order until one connects.
pub struct Resolver<C> {
    config: ResolverConfig,
    connector: C,
    sources: Vec<Box<dyn CandidateSource>>,
}

impl<C: Connector> Resolver<C> {
    /// Resolver with the default sources.
    pub fn new(config: ResolverConfig, connector: C) -> Self {
        Self {
            config,
            connector,
            sources: default_sources(),
        }
    }

    /// Replace the candidate sources.
    pub fn with_sources(mut self, sources: Vec<Box<dyn CandidateSource>>) -> Self {
        self.sources = sources;
        self
    }

    /// Append a candidate source after the existing ones.
    pub fn push_source(mut self, source: impl CandidateSource + 'static) -> Self {
        self.sources.push(Box::new(source));
        self
    }

    /// Configuration in use.
    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// The ordered attempt plan.
    pub fn plan(&self) -> Vec<EndpointCandidate> {
        plan(&self.config, &self.sources)
    }

    /// Try each candidate in order and return the first open session.
    pub async fn resolve(
        &self,
        listener: &dyn ProbeListener,
    ) -> Result<Resolved<C::Session>, Exhausted> {
        let mut failures = Vec::new();

        if self.config.descriptor().is_none() {
            warn!("Connection URI has no project reference; pooled endpoints skipped");
        }

        for candidate in self.plan() {
            listener.attempting(&candidate);

            match self.connector.connect(&candidate.uri, candidate.timeout).await {
                Ok(session) => {
                    info!(
                        candidate = %candidate.label(),
                        failed_before = failures.len(),
                        "Connection established"
                    );
                    listener.connected(&candidate);
                    return Ok(Resolved {
                        candidate,
                        session,
                        failures,
                    });
                }
                Err(error) => {
                    warn!(
                        candidate = %candidate.label(),
                        kind = %error.kind,
                        error = %error.truncated(self.config.message_limit),
                        "Connection attempt failed"
                    );
                    listener.failed(&candidate, &error);
                    failures.push(AttemptRecord { candidate, error });
                }
            }
        }

        warn!(attempts = failures.len(), "All connection strategies exhausted");
        Err(Exhausted { failures })
    }

    /// Resolve, run `routine` over the session, and close it.
    pub async fn run<R>(
        &self,
        routine: &R,
        listener: &dyn ProbeListener,
    ) -> Result<Outcome<R::Output>, Exhausted>
    where
        R: Routine + ?Sized,
    {
        let Resolved {
            candidate,
            session,
            failures,
        } = self.resolve(listener).await?;

        let result = run_scoped(session, routine).await;
        Ok(Outcome {
            candidate,
            failures,
            result,
        })
    }
}
