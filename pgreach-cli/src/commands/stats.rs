//! `pgreach stats` command - Row counts and recent activity.

use pgreach_postgres::Statistics;

use crate::cli::StatsArgs;
use crate::config::Config;
use crate::error::{CliError, CliResult};
use crate::output::{self, kv};
use crate::progress::{ConsoleListener, report_exhausted};

/// Run the stats command
pub async fn run(args: StatsArgs, config: &Config) -> CliResult<()> {
    output::header("Table Statistics");

    let resolver = super::resolver(&args.connection, config)?;
    let statistics = Statistics::new(config.table(args.table.as_deref()))
        .order_by(config.target.timestamp_column.clone())
        .recent_limit(args.recent);
    let listener = ConsoleListener::new(resolver.config().message_limit);

    let outcome = resolver
        .run(&statistics, &listener)
        .await
        .map_err(report_exhausted)?;
    let stats = outcome.result.map_err(|e| CliError::Database(e.to_string()))?;

    output::newline();
    kv(&stats.table, &format!("{} rows", stats.total_rows));

    if stats.total_rows == 0 {
        output::dim("  (No rows yet)");
        return Ok(());
    }

    output::newline();
    output::section("Recent entries");
    for task in &stats.recent {
        let updated = task
            .updated_at
            .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_else(|| "-".to_string());
        output::list_item(&format!(
            "ID {}: {} | {}... | updated {}",
            task.id, task.user_id, task.content_preview, updated
        ));
    }

    output::newline();
    output::section("Tasks per user");
    for entry in &stats.per_user {
        output::list_item(&format!("{}: {}", entry.user_id, entry.task_count));
    }

    Ok(())
}
