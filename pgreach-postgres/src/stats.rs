//! Row counts, recent rows and per-user counts for the task table.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::connection::Session;
use crate::error::PgResult;
use crate::impl_from_row;
use crate::routine::Routine;
use crate::row::FromPgRow;
use crate::schema::{DEFAULT_TABLE, quote_ident};

/// A recent task row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecentTask {
    /// Row id.
    pub id: i64,
    /// Owner.
    pub user_id: String,
    /// First 50 characters of the content.
    pub content_preview: String,
    /// Creation time.
    pub created_at: Option<DateTime<Utc>>,
    /// Last update time.
    pub updated_at: Option<DateTime<Utc>>,
}

impl_from_row!(RecentTask {
    id: i64,
    user_id: String,
    content_preview: String,
    created_at: Option<DateTime<Utc>>,
    updated_at: Option<DateTime<Utc>>,
});

/// Task count for one user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserTaskCount {
    /// Owner.
    pub user_id: String,
    /// Rows owned.
    pub task_count: i64,
}

impl_from_row!(UserTaskCount {
    user_id: String,
    task_count: i64,
});

/// Statistics for the task table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableStats {
    /// Table name.
    pub table: String,
    /// Total rows.
    pub total_rows: i64,
    /// Newest rows.
    pub recent: Vec<RecentTask>,
    /// Rows per user, largest first.
    pub per_user: Vec<UserTaskCount>,
}

/// The statistics routine.
#[derive(Debug, Clone)]
pub struct Statistics {
    table: String,
    timestamp_column: String,
    recent_limit: usize,
}

impl Default for Statistics {
    fn default() -> Self {
        Self::new(DEFAULT_TABLE)
    }
}

impl Statistics {
    /// Statistics for `table`, showing the five newest rows.
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
            timestamp_column: "created_at".to_string(),
            recent_limit: 5,
        }
    }

    /// Set the column recent rows are ordered by.
    pub fn order_by(mut self, column: impl Into<String>) -> Self {
        self.timestamp_column = column.into();
        self
    }

    /// Set how many recent rows to fetch.
    pub fn recent_limit(mut self, limit: usize) -> Self {
        self.recent_limit = limit;
        self
    }
}

#[async_trait]
impl Routine for Statistics {
    type Output = TableStats;

    fn name(&self) -> &'static str {
        "stats"
    }

    async fn run(&self, session: &mut dyn Session) -> PgResult<TableStats> {
        let table = quote_ident(&self.table);

        let total_rows: i64 = session
            .query_one(&format!("SELECT COUNT(*) AS row_count FROM {table}"), &[])
            .await?
            .first()?;

        let mut stats = TableStats {
            table: self.table.clone(),
            total_rows,
            ..TableStats::default()
        };
        if total_rows == 0 {
            return Ok(stats);
        }

        stats.recent = session
            .query(
                &format!(
                    "SELECT id, user_id, LEFT(content, 50) AS content_preview, created_at, updated_at \
                     FROM {table} ORDER BY {} DESC LIMIT {}",
                    quote_ident(&self.timestamp_column),
                    self.recent_limit
                ),
                &[],
            )
            .await?
            .iter()
            .map(RecentTask::from_row)
            .collect::<PgResult<Vec<_>>>()?;

        stats.per_user = session
            .query(
                &format!(
                    "SELECT user_id, COUNT(*) AS task_count FROM {table} \
                     GROUP BY user_id ORDER BY task_count DESC"
                ),
                &[],
            )
            .await?
            .iter()
            .map(UserTaskCount::from_row)
            .collect::<PgResult<Vec<_>>>()?;

        Ok(stats)
    }
}
