//! pgreach CLI - Reach a hosted PostgreSQL database.

use clap::Parser;

use pgreach_cli::cli::{Cli, Command};
use pgreach_cli::commands;
use pgreach_cli::config::{self, Config};
use pgreach_cli::error::CliResult;
use pgreach_cli::{logging, output};

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        output::newline();
        output::error(&e.to_string());
        std::process::exit(1);
    }
}

async fn run() -> CliResult<()> {
    let cli = Cli::parse();

    if cli.verbose {
        logging::init_with_level("debug");
    } else {
        logging::init();
    }

    if let Command::Version = cli.command {
        return commands::version::run().await;
    }

    let cwd = std::env::current_dir()?;
    let config = Config::discover(&cwd, cli.config.as_deref())?;
    let env_file = cli.env_file.as_deref().unwrap_or(&config.connection.env_file);
    if let Some(path) = config::load_env_file(&cwd, env_file)? {
        tracing::debug!(path = %path.display(), "Loaded environment file");
    }

    match cli.command {
        Command::Probe(args) => commands::probe::run(args, &config).await,
        Command::Candidates(args) => commands::candidates::run(args, &config).await,
        Command::Provision(args) => commands::provision::run(args, &config).await,
        Command::Stats(args) => commands::stats::run(args, &config).await,
        Command::Version => commands::version::run().await,
    }
}
