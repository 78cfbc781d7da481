//! CLI command implementations.

pub mod candidates;
pub mod probe;
pub mod provision;
pub mod stats;
pub mod version;

use pgreach_postgres::{PgConnector, Resolver};

use crate::cli::ConnectionArgs;
use crate::config::Config;
use crate::error::CliResult;
use crate::output;

/// Build a resolver for the URL picked from `args` and `config`.
pub(crate) fn resolver(args: &ConnectionArgs, config: &Config) -> CliResult<Resolver<PgConnector>> {
    let url = config.connection_url(args.url.as_deref())?;
    let resolver_config = config.resolver_config(&url)?;

    match resolver_config.descriptor() {
        Some(descriptor) => {
            output::kv("Project", &descriptor.project_ref);
            output::kv("Direct host", &descriptor.direct_host());
        }
        None => output::warn("Connection URL has no project reference; pooled endpoints are skipped"),
    }
    output::newline();

    Ok(Resolver::new(resolver_config, PgConnector::new()))
}
