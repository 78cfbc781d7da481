//! `pgreach probe` command - Find a working endpoint and verify the database.

use pgreach_postgres::error::truncate;
use pgreach_postgres::{CandidateKind, TargetState, Verification, VerificationReport};

use crate::cli::ProbeArgs;
use crate::config::Config;
use crate::error::CliResult;
use crate::output::{self, kv};
use crate::progress::{ConsoleListener, report_exhausted};

/// Run the probe command
pub async fn run(args: ProbeArgs, config: &Config) -> CliResult<()> {
    output::header("Connection Probe");

    let resolver = super::resolver(&args.connection, config)?;
    let verification = Verification::new(config.verify_options(args.table.as_deref()));
    let listener = ConsoleListener::new(resolver.config().message_limit);

    let outcome = resolver
        .run(&verification, &listener)
        .await
        .map_err(report_exhausted)?;

    if matches!(outcome.candidate.kind, CandidateKind::Pooled { .. }) {
        output::newline();
        output::section("Working connection string");
        output::dim(&format!("  {}", outcome.candidate.masked_uri()));
    }

    output::newline();
    match outcome.result {
        Ok(report) => print_report(&report),
        // A reachable database with a failing query still counts as reached.
        Err(e) => output::failure(&format!("Query execution failed: {e}")),
    }

    Ok(())
}

fn print_report(report: &VerificationReport) {
    output::section("Database Information");
    kv("PostgreSQL Version", &truncate(&report.server_version, 80));
    output::newline();

    output::section("Tables in public schema");
    if report.tables.is_empty() {
        output::dim("  (No tables found)");
    }
    for table in &report.tables {
        output::list_item(&format!("{} ({} columns)", table.table_name, table.column_count));
    }
    output::newline();

    match &report.target {
        TargetState::Present { row_count, recent } => {
            kv(&report.target_table, &format!("{row_count} rows"));
            if !recent.is_empty() {
                output::section("Recent entries");
                for row in recent {
                    let created = row
                        .created_at
                        .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
                        .unwrap_or_else(|| "-".to_string());
                    output::list_item(&format!(
                        "ID {}: {} | {}... | {}",
                        row.id, row.user_id, row.content_preview, created
                    ));
                }
            }
        }
        TargetState::Missing => output::warn(&format!(
            "{} table not found. Run `pgreach provision` to create it",
            report.target_table
        )),
    }

    output::newline();
    output::success("Connection test completed successfully!");
}
