//! `pgreach provision` command - Create the target table and its policies.

use pgreach_postgres::Provisioning;
use pgreach_postgres::schema::TableSchema;

use crate::cli::ProvisionArgs;
use crate::config::Config;
use crate::error::{CliError, CliResult};
use crate::output::{self, kv};
use crate::progress::{ConsoleListener, report_exhausted};

/// Run the provision command
pub async fn run(args: ProvisionArgs, config: &Config) -> CliResult<()> {
    output::header("Provision Table");

    let table = config.table(args.table.as_deref());
    if !args.yes
        && !output::confirm(&format!(
            "Create {table} and replace its row level security policies?"
        ))
    {
        output::warn("Cancelled");
        return Ok(());
    }

    let resolver = super::resolver(&args.connection, config)?;
    let provisioning = Provisioning::new(TableSchema::new(&table));
    let listener = ConsoleListener::new(resolver.config().message_limit);

    let outcome = resolver
        .run(&provisioning, &listener)
        .await
        .map_err(report_exhausted)?;
    let report = outcome.result.map_err(|e| CliError::Database(e.to_string()))?;

    output::newline();
    output::step(1, 3, "Table, index and row level security");
    kv(
        "Elapsed",
        &format!("{:.2}s", report.table_elapsed.as_secs_f64()),
    );

    output::step(2, 3, "Policies");
    for policy in &report.policies {
        output::list_item(policy);
    }

    output::step(3, 3, "Structure");
    for column in &report.columns {
        output::list_item(&format!("{}: {}", column.column_name, column.data_type));
    }
    kv("Rows", &report.row_count.to_string());

    output::newline();
    output::success(&format!("{} is ready", report.table));
    Ok(())
}
