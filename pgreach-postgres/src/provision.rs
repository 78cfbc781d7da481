//! Create the task table, its unique index and its row-level security policies.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use tracing::info;

use crate::connection::Session;
use crate::error::PgResult;
use crate::impl_from_row;
use crate::routine::Routine;
use crate::row::FromPgRow;
use crate::schema::{POLICIES, TableSchema, quote_ident};

const COLUMNS_SQL: &str = "SELECT column_name::text AS column_name, data_type::text AS data_type \
     FROM information_schema.columns \
     WHERE table_schema = 'public' AND table_name::text = $1 \
     ORDER BY ordinal_position";

/// A column of the provisioned table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnInfo {
    /// Column name.
    pub column_name: String,
    /// SQL data type.
    pub data_type: String,
}

impl_from_row!(ColumnInfo {
    column_name: String,
    data_type: String,
});

/// Result of provisioning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisionReport {
    /// Table name.
    pub table: String,
    /// Time spent creating the table, index and enabling RLS.
    pub table_elapsed: Duration,
    /// Names of the policies now in place.
    pub policies: Vec<String>,
    /// Columns, in ordinal order.
    pub columns: Vec<ColumnInfo>,
    /// Rows currently in the table.
    pub row_count: i64,
}

/// The provisioning routine. Every statement is idempotent.
#[derive(Debug, Clone, Default)]
pub struct Provisioning {
    schema: TableSchema,
}

impl Provisioning {
    /// Provision the given schema.
    pub fn new(schema: TableSchema) -> Self {
        Self { schema }
    }

    /// Schema being provisioned.
    pub fn schema(&self) -> &TableSchema {
        &self.schema
    }
}

#[async_trait]
impl Routine for Provisioning {
    type Output = ProvisionReport;

    fn name(&self) -> &'static str {
        "provision"
    }

    async fn run(&self, session: &mut dyn Session) -> PgResult<ProvisionReport> {
        let table = self.schema.table();

        let started = Instant::now();
        for stmt in self.schema.table_statements() {
            session.execute(&stmt).await?;
        }
        let table_elapsed = started.elapsed();
        info!(table = %table, elapsed_ms = table_elapsed.as_millis() as u64, "Table ready");

        for stmt in self.schema.policy_statements() {
            session.execute(&stmt).await?;
        }
        info!(table = %table, policies = POLICIES.len(), "Policies replaced");

        let columns = session
            .query(COLUMNS_SQL, &[table])
            .await?
            .iter()
            .map(ColumnInfo::from_row)
            .collect::<PgResult<Vec<_>>>()?;

        let row_count: i64 = session
            .query_one(
                &format!("SELECT COUNT(*) AS row_count FROM {}", quote_ident(table)),
                &[],
            )
            .await?
            .first()?;

        Ok(ProvisionReport {
            table: table.to_string(),
            table_elapsed,
            policies: POLICIES.iter().map(|p| p.name.to_string()).collect(),
            columns,
            row_count,
        })
    }
}
