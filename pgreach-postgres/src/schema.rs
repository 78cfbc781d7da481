//! Static schema for the task table and its row-level security policies.

/// Default table name.
pub const DEFAULT_TABLE: &str = "todoapp_tasks";

/// Expression every policy compares against the row owner.
const OWNER_CHECK: &str = "auth.uid()::text = user_id";

/// A row-level security policy on the task table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Policy {
    /// Policy name.
    pub name: &'static str,
    /// SQL command the policy applies to.
    pub command: &'static str,
    /// Whether the policy has a `USING` clause.
    pub using: bool,
    /// Whether the policy has a `WITH CHECK` clause.
    pub with_check: bool,
}

/// Owner-scoped policies, one per command.
pub const POLICIES: [Policy; 4] = [
    Policy {
        name: "Users can view their own tasks",
        command: "SELECT",
        using: true,
        with_check: false,
    },
    Policy {
        name: "Users can insert their own tasks",
        command: "INSERT",
        using: false,
        with_check: true,
    },
    Policy {
        name: "Users can update their own tasks",
        command: "UPDATE",
        using: true,
        with_check: true,
    },
    Policy {
        name: "Users can delete their own tasks",
        command: "DELETE",
        using: true,
        with_check: false,
    },
];

/// Quote an SQL identifier.
pub fn quote_ident(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

/// DDL for one task table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableSchema {
    table: String,
}

impl Default for TableSchema {
    fn default() -> Self {
        Self::new(DEFAULT_TABLE)
    }
}

impl TableSchema {
    /// Schema for the named table.
    pub fn new(table: impl Into<String>) -> Self {
        Self {
            table: table.into(),
        }
    }

    /// Table name, unquoted.
    pub fn table(&self) -> &str {
        &self.table
    }

    /// Name of the unique index on `user_id`.
    pub fn user_index(&self) -> String {
        format!("{}_user_id_key", self.table)
    }

    /// Table, unique index, and row level security, in order.
    pub fn table_statements(&self) -> Vec<String> {
        let table = quote_ident(&self.table);
        vec![
            format!(
                "CREATE TABLE IF NOT EXISTS {table} (\n\
                 \x20 id BIGSERIAL PRIMARY KEY,\n\
                 \x20 user_id TEXT NOT NULL,\n\
                 \x20 content TEXT NOT NULL,\n\
                 \x20 updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),\n\
                 \x20 created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()\n\
                 )"
            ),
            format!(
                "CREATE UNIQUE INDEX IF NOT EXISTS {} ON {table}(user_id)",
                quote_ident(&self.user_index())
            ),
            format!("ALTER TABLE {table} ENABLE ROW LEVEL SECURITY"),
        ]
    }

    /// Drop-then-create statements for every policy.
    pub fn policy_statements(&self) -> Vec<String> {
        let table = quote_ident(&self.table);
        let drops = POLICIES
            .iter()
            .map(|p| format!("DROP POLICY IF EXISTS {} ON {table}", quote_ident(p.name)));
        let creates = POLICIES.iter().map(|p| {
            let mut sql = format!(
                "CREATE POLICY {} ON {table} FOR {}",
                quote_ident(p.name),
                p.command
            );
            if p.using {
                sql.push_str(&format!(" USING ({OWNER_CHECK})"));
            }
            if p.with_check {
                sql.push_str(&format!(" WITH CHECK ({OWNER_CHECK})"));
            }
            sql
        });
        drops.chain(creates).collect()
    }
}
