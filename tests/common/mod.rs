//! In-memory connector and session used by the integration tests.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use pgreach::postgres::{
    ConnectError, Connector, FailureKind, PgError, PgRecord, PgResult, Session, SqlValue,
};

pub const URI: &str = "postgresql://postgres:pw@db.abcd1234.example.co:5432/postgres";

type Responder = Arc<dyn Fn(&str, &[&str]) -> PgResult<Vec<PgRecord>> + Send + Sync>;

/// Everything the fakes observed.
#[derive(Debug, Default)]
pub struct Journal {
    pub attempts: Vec<(String, Duration)>,
    pub queries: Vec<String>,
    pub executes: Vec<String>,
    pub closes: usize,
}

/// Connector that accepts URIs containing one of `accept` and fails the rest.
#[derive(Clone)]
pub struct FakeConnector {
    journal: Arc<Mutex<Journal>>,
    accept: Vec<String>,
    failure: FailureKind,
    responder: Responder,
}

impl FakeConnector {
    pub fn refusing_all() -> Self {
        Self {
            journal: Arc::default(),
            accept: Vec::new(),
            failure: FailureKind::Generic,
            responder: Arc::new(|_: &str, _: &[&str]| -> PgResult<Vec<PgRecord>> { Ok(Vec::new()) }),
        }
    }

    pub fn accepting(pattern: &str) -> Self {
        let mut connector = Self::refusing_all();
        connector.accept.push(pattern.to_string());
        connector
    }

    pub fn failing_with(mut self, kind: FailureKind) -> Self {
        self.failure = kind;
        self
    }

    pub fn responding<F>(mut self, responder: F) -> Self
    where
        F: Fn(&str, &[&str]) -> PgResult<Vec<PgRecord>> + Send + Sync + 'static,
    {
        self.responder = Arc::new(responder);
        self
    }

    pub fn attempted_uris(&self) -> Vec<String> {
        self.journal
            .lock()
            .unwrap()
            .attempts
            .iter()
            .map(|(uri, _)| uri.clone())
            .collect()
    }

    pub fn attempts(&self) -> Vec<(String, Duration)> {
        self.journal.lock().unwrap().attempts.clone()
    }

    pub fn queries(&self) -> Vec<String> {
        self.journal.lock().unwrap().queries.clone()
    }

    pub fn executes(&self) -> Vec<String> {
        self.journal.lock().unwrap().executes.clone()
    }

    pub fn closes(&self) -> usize {
        self.journal.lock().unwrap().closes
    }
}

#[async_trait]
impl Connector for FakeConnector {
    type Session = FakeSession;

    async fn connect(&self, uri: &str, timeout: Duration) -> Result<FakeSession, ConnectError> {
        self.journal
            .lock()
            .unwrap()
            .attempts
            .push((uri.to_string(), timeout));

        if self.accept.iter().any(|p| uri.contains(p.as_str())) {
            Ok(FakeSession {
                journal: self.journal.clone(),
                responder: self.responder.clone(),
            })
        } else {
            Err(ConnectError::new(self.failure, format!("refused: {uri}")))
        }
    }
}

pub struct FakeSession {
    journal: Arc<Mutex<Journal>>,
    responder: Responder,
}

#[async_trait]
impl Session for FakeSession {
    async fn query(&mut self, sql: &str, params: &[&str]) -> PgResult<Vec<PgRecord>> {
        self.journal.lock().unwrap().queries.push(sql.to_string());
        (self.responder)(sql, params)
    }

    async fn execute(&mut self, sql: &str) -> PgResult<()> {
        self.journal.lock().unwrap().executes.push(sql.to_string());
        Ok(())
    }

    async fn close(self) -> PgResult<()> {
        self.journal.lock().unwrap().closes += 1;
        Ok(())
    }
}

pub fn single(column: &str, value: SqlValue) -> Vec<PgRecord> {
    vec![PgRecord::from_pairs([(column, value)])]
}

/// Responder emulating a database with one public table holding `row_count` rows.
pub fn database(present: bool, row_count: i64) -> impl Fn(&str, &[&str]) -> PgResult<Vec<PgRecord>> {
    move |sql: &str, _params: &[&str]| {
        if sql.contains("version()") {
            Ok(single("version", SqlValue::Text("PostgreSQL 15.8 on x86_64".into())))
        } else if sql.contains("information_schema.tables t") {
            Ok(vec![PgRecord::from_pairs([
                ("table_name", SqlValue::Text("todoapp_tasks".into())),
                ("column_count", SqlValue::Int(5)),
            ])])
        } else if sql.contains("EXISTS") {
            Ok(single("present", SqlValue::Bool(present)))
        } else if sql.contains("COUNT(*) AS row_count") {
            Ok(single("row_count", SqlValue::Int(row_count)))
        } else if sql.contains("LEFT(content, 50)") {
            Ok((0..row_count.min(3))
                .map(|id| {
                    PgRecord::from_pairs([
                        ("id", SqlValue::Int(id + 1)),
                        ("user_id", SqlValue::Text(format!("user-{id}"))),
                        ("content_preview", SqlValue::Text("# Today".into())),
                        ("created_at", SqlValue::Null),
                    ])
                })
                .collect())
        } else {
            Err(PgError::query(format!("unexpected query: {sql}")))
        }
    }
}
