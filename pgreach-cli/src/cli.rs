//! CLI argument definitions using clap.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// pgreach - Reach a hosted PostgreSQL database through its poolers or direct host
#[derive(Parser, Debug)]
#[command(name = "pgreach")]
#[command(version)]
#[command(
    about = "pgreach - Reach a hosted PostgreSQL database through its poolers or direct host",
    long_about = None
)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to the configuration file (defaults to ./pgreach.toml when present)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Environment file to load before reading the connection URL
    #[arg(long, global = true)]
    pub env_file: Option<PathBuf>,

    /// Enable debug logging on stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Find a working endpoint and verify the database
    Probe(ProbeArgs),

    /// List the endpoint candidates without connecting
    Candidates(ConnectionArgs),

    /// Create the target table and its row level security policies
    Provision(ProvisionArgs),

    /// Show row counts, recent rows and per-user counts
    Stats(StatsArgs),

    /// Display version information
    Version,
}

/// Connection URL override shared by every connecting command
#[derive(Args, Debug, Clone, Default)]
pub struct ConnectionArgs {
    /// Connection URL (overrides the environment and the config file)
    #[arg(short, long)]
    pub url: Option<String>,
}

/// Arguments for the `probe` command
#[derive(Args, Debug)]
pub struct ProbeArgs {
    #[command(flatten)]
    pub connection: ConnectionArgs,

    /// Table to verify
    #[arg(short, long)]
    pub table: Option<String>,
}

/// Arguments for the `provision` command
#[derive(Args, Debug)]
pub struct ProvisionArgs {
    #[command(flatten)]
    pub connection: ConnectionArgs,

    /// Table to create
    #[arg(short, long)]
    pub table: Option<String>,

    /// Skip the confirmation prompt
    #[arg(short = 'y', long)]
    pub yes: bool,
}

/// Arguments for the `stats` command
#[derive(Args, Debug)]
pub struct StatsArgs {
    #[command(flatten)]
    pub connection: ConnectionArgs,

    /// Table to inspect
    #[arg(short, long)]
    pub table: Option<String>,

    /// Number of recent rows to show
    #[arg(long, default_value_t = 5)]
    pub recent: usize,
}
