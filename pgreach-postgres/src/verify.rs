//! Read-only verification queries run once a connection is open.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::info;

use crate::connection::Session;
use crate::error::PgResult;
use crate::impl_from_row;
use crate::routine::Routine;
use crate::row::FromPgRow;
use crate::schema::{DEFAULT_TABLE, quote_ident};

const VERSION_SQL: &str = "SELECT version() AS version";

const TABLES_SQL: &str = "SELECT t.table_name::text AS table_name, \
     (SELECT COUNT(*) FROM information_schema.columns c \
      WHERE c.table_schema = 'public' AND c.table_name = t.table_name) AS column_count \
     FROM information_schema.tables t \
     WHERE t.table_schema = 'public' \
     ORDER BY t.table_name";

const EXISTS_SQL: &str = "SELECT EXISTS (\
     SELECT FROM information_schema.tables \
     WHERE table_schema = 'public' AND table_name::text = $1) AS present";

/// Which table to inspect and how much of it to show.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifyOptions {
    /// Table whose presence and contents are reported.
    pub table: String,
    /// Column used to order the sample, newest first.
    pub timestamp_column: String,
    /// Maximum sample rows.
    pub sample_limit: usize,
}

impl Default for VerifyOptions {
    fn default() -> Self {
        Self {
            table: DEFAULT_TABLE.to_string(),
            timestamp_column: "created_at".to_string(),
            sample_limit: 3,
        }
    }
}

/// A public table and its column count.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSummary {
    /// Table name.
    pub table_name: String,
    /// Number of columns.
    pub column_count: i64,
}

impl_from_row!(TableSummary {
    table_name: String,
    column_count: i64,
});

/// A recent row of the target table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SampleRow {
    /// Row id.
    pub id: i64,
    /// Owner.
    pub user_id: String,
    /// First 50 characters of the content.
    pub content_preview: String,
    /// Creation time.
    pub created_at: Option<DateTime<Utc>>,
}

impl_from_row!(SampleRow {
    id: i64,
    user_id: String,
    content_preview: String,
    created_at: Option<DateTime<Utc>>,
});

/// What was found for the target table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetState {
    /// The table does not exist in the public schema.
    Missing,
    /// The table exists.
    Present {
        /// Total rows.
        row_count: i64,
        /// Newest rows, empty when the table is empty.
        recent: Vec<SampleRow>,
    },
}

/// Result of a verification run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationReport {
    /// `version()` output.
    pub server_version: String,
    /// Tables in the public schema.
    pub tables: Vec<TableSummary>,
    /// Inspected table name.
    pub target_table: String,
    /// Inspected table state.
    pub target: TargetState,
}

/// The verification routine.
#[derive(Debug, Clone, Default)]
pub struct Verification {
    options: VerifyOptions,
}

impl Verification {
    /// Create a verification routine.
    pub fn new(options: VerifyOptions) -> Self {
        Self { options }
    }

    /// Options in use.
    pub fn options(&self) -> &VerifyOptions {
        &self.options
    }

    fn count_sql(&self) -> String {
        format!(
            "SELECT COUNT(*) AS row_count FROM {}",
            quote_ident(&self.options.table)
        )
    }

    fn sample_sql(&self) -> String {
        format!(
            "SELECT id, user_id, LEFT(content, 50) AS content_preview, created_at \
             FROM {} ORDER BY {} DESC LIMIT {}",
            quote_ident(&self.options.table),
            quote_ident(&self.options.timestamp_column),
            self.options.sample_limit
        )
    }
}

#[async_trait]
impl Routine for Verification {
    type Output = VerificationReport;

    fn name(&self) -> &'static str {
        "verify"
    }

    async fn run(&self, session: &mut dyn Session) -> PgResult<VerificationReport> {
        let server_version: String = session.query_one(VERSION_SQL, &[]).await?.first()?;

        let tables = session
            .query(TABLES_SQL, &[])
            .await?
            .iter()
            .map(TableSummary::from_row)
            .collect::<PgResult<Vec<_>>>()?;

        let table = self.options.table.as_str();
        let present: bool = session.query_one(EXISTS_SQL, &[table]).await?.first()?;

        let target = if present {
            let row_count: i64 = session.query_one(&self.count_sql(), &[]).await?.first()?;
            let recent = if row_count > 0 && self.options.sample_limit > 0 {
                session
                    .query(&self.sample_sql(), &[])
                    .await?
                    .iter()
                    .map(SampleRow::from_row)
                    .collect::<PgResult<Vec<_>>>()?
            } else {
                Vec::new()
            };
            TargetState::Present { row_count, recent }
        } else {
            TargetState::Missing
        };

        info!(
            tables = tables.len(),
            table = %table,
            present,
            "Verification queries completed"
        );

        Ok(VerificationReport {
            server_version,
            tables,
            target_table: self.options.table.clone(),
            target,
        })
    }
}
