//! # pgreach
//!
//! Connectivity probing and provisioning for a hosted PostgreSQL database
//! reachable through regional connection poolers or a direct host.
//!
//! pgreach provides:
//! - Parsing of the platform's direct-host connection URI
//! - An ordered fallback across pooled, direct and IPv6 endpoints
//! - Read-only verification, table provisioning and table statistics
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use pgreach::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ResolverConfig::new(std::env::var("SUPABASE_CONNECTION_STRING")?);
//!     let resolver = Resolver::new(config, PgConnector::new());
//!
//!     let outcome = resolver.run(&Verification::default(), &SilentListener).await?;
//!     let report = outcome.result?;
//!     println!("{}", report.server_version);
//!
//!     Ok(())
//! }
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

/// Driver seam, resolver and routines.
pub mod postgres {
    pub use pgreach_postgres::*;
}

/// Prelude module for convenient imports.
pub mod prelude {
    pub use pgreach_postgres::prelude::*;
}

// Re-export key types at the crate root
pub use pgreach_postgres::{
    ConnectionDescriptor, EndpointCandidate, PgError, PgResult, Resolver, ResolverConfig,
};
