//! # pgreach-postgres
//!
//! Endpoint resolution and database routines for a hosted PostgreSQL
//! database that sits behind regional connection poolers.
//!
//! This crate provides:
//! - Parsing of the platform's direct-host connection URI
//! - Ordered candidate generation (pooled regions, direct, IPv6)
//! - A resolver that tries candidates in order until one connects
//! - Verification, provisioning and statistics routines run over the session
//!
//! ## Example
//!
//! ```rust,ignore
//! use pgreach_postgres::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ResolverConfig::builder()
//!         .uri("postgresql://postgres:pw@db.abcd1234.supabase.co:5432/postgres")
//!         .build()?;
//!
//!     let resolver = Resolver::new(config, PgConnector::new());
//!     let outcome = resolver.run(&Verification::default(), &SilentListener).await?;
//!     println!("connected via {}", outcome.candidate.label());
//!
//!     Ok(())
//! }
//! ```

pub mod candidate;
pub mod config;
pub mod connection;
pub mod descriptor;
pub mod error;
pub mod provision;
pub mod resolver;
pub mod routine;
pub mod row;
pub mod schema;
pub mod stats;
pub mod verify;

pub use candidate::{CandidateKind, CandidateSource, EndpointCandidate};
pub use config::{PoolerRule, ResolverConfig, ResolverConfigBuilder};
pub use connection::{Connector, PgConnector, PgSession, Session};
pub use descriptor::ConnectionDescriptor;
pub use error::{ConnectError, FailureKind, PgError, PgResult};
pub use provision::{ProvisionReport, Provisioning};
pub use resolver::{Exhausted, Outcome, ProbeListener, Resolved, Resolver, SilentListener};
pub use routine::{Routine, run_scoped};
pub use row::{PgRecord, SqlValue};
pub use stats::{Statistics, TableStats};
pub use verify::{TargetState, Verification, VerificationReport, VerifyOptions};

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::candidate::{CandidateKind, EndpointCandidate};
    pub use crate::config::{PoolerRule, ResolverConfig};
    pub use crate::connection::{Connector, PgConnector, Session};
    pub use crate::error::{ConnectError, FailureKind, PgError, PgResult};
    pub use crate::provision::Provisioning;
    pub use crate::resolver::{ProbeListener, Resolver, SilentListener};
    pub use crate::routine::Routine;
    pub use crate::stats::Statistics;
    pub use crate::verify::{Verification, VerifyOptions};
}
