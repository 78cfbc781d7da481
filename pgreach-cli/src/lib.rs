//! pgreach CLI - Command-line interface for reaching a hosted PostgreSQL
//! database through its regional poolers or its direct host.
//!
//! This crate provides the `pgreach` binary: probing connectivity, listing
//! the endpoint candidates, provisioning the target table and reporting
//! table statistics.

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod logging;
pub mod output;
pub mod progress;
