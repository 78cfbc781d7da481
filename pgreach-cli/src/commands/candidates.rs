//! `pgreach candidates` command - List the attempt plan without connecting.

use crate::cli::ConnectionArgs;
use crate::config::Config;
use crate::error::CliResult;
use crate::output;

/// Run the candidates command
pub async fn run(args: ConnectionArgs, config: &Config) -> CliResult<()> {
    output::header("Connection Candidates");

    let resolver = super::resolver(&args, config)?;
    let plan = resolver.plan();

    for (i, candidate) in plan.iter().enumerate() {
        output::numbered_item(
            i + 1,
            &format!(
                "{} {} (timeout {}s)",
                candidate.label(),
                candidate.masked_uri(),
                candidate.timeout.as_secs()
            ),
        );
    }

    output::newline();
    output::dim(&format!("{} candidates, tried in this order", plan.len()));
    Ok(())
}
