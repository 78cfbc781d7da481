//! Integration tests for the verification, provisioning and statistics routines.

mod common;

use common::{FakeConnector, database, single};
use pgreach::postgres::schema::TableSchema;
use pgreach::postgres::{
    PgRecord, Provisioning, SqlValue, Statistics, TargetState, Verification, VerifyOptions,
    run_scoped,
};
use pgreach::postgres::{Connector, PgError};
use pretty_assertions::assert_eq;
use std::time::Duration;

async fn open(connector: &FakeConnector) -> common::FakeSession {
    connector
        .connect("postgresql://local", Duration::from_secs(1))
        .await
        .ok()
        .unwrap()
}

#[tokio::test]
async fn test_empty_table_skips_sample_query() {
    let connector = FakeConnector::accepting("local").responding(database(true, 0));
    let session = open(&connector).await;

    let report = run_scoped(session, &Verification::default()).await.unwrap();

    assert_eq!(
        report.target,
        TargetState::Present {
            row_count: 0,
            recent: Vec::new()
        }
    );
    assert!(!connector.queries().iter().any(|q| q.contains("LEFT(content")));
    assert_eq!(connector.queries().len(), 4);
    assert_eq!(connector.closes(), 1);
}

#[tokio::test]
async fn test_populated_table_reports_recent_rows() {
    let connector = FakeConnector::accepting("local").responding(database(true, 7));
    let session = open(&connector).await;

    let report = run_scoped(session, &Verification::default()).await.unwrap();

    match report.target {
        TargetState::Present { row_count, recent } => {
            assert_eq!(row_count, 7);
            assert_eq!(recent.len(), 3);
            assert_eq!(recent[0].id, 1);
            assert_eq!(recent[0].user_id, "user-0");
            assert!(recent[0].created_at.is_none());
        }
        TargetState::Missing => panic!("table should be present"),
    }
    assert_eq!(report.tables.len(), 1);
    assert_eq!(report.tables[0].column_count, 5);

    let sample = connector.queries().pop().unwrap();
    assert!(sample.ends_with("ORDER BY \"created_at\" DESC LIMIT 3"));
}

#[tokio::test]
async fn test_missing_table_skips_count() {
    let connector = FakeConnector::accepting("local").responding(database(false, 0));
    let session = open(&connector).await;

    let report = run_scoped(session, &Verification::default()).await.unwrap();

    assert_eq!(report.target, TargetState::Missing);
    assert_eq!(report.target_table, "todoapp_tasks");
    assert!(!connector.queries().iter().any(|q| q.contains("row_count")));
}

#[tokio::test]
async fn test_verification_uses_configured_table() {
    let connector = FakeConnector::accepting("local").responding(database(true, 1));
    let session = open(&connector).await;
    let verification = Verification::new(VerifyOptions {
        table: "notes".to_string(),
        timestamp_column: "updated_at".to_string(),
        sample_limit: 1,
    });

    run_scoped(session, &verification).await.unwrap();

    let queries = connector.queries();
    assert!(queries.iter().any(|q| q.contains("FROM \"notes\"")));
    assert!(queries.last().unwrap().ends_with("ORDER BY \"updated_at\" DESC LIMIT 1"));
}

#[tokio::test]
async fn test_provisioning_runs_statements_in_order() {
    let connector = FakeConnector::accepting("local").responding(|sql: &str, params: &[&str]| {
        if sql.contains("information_schema.columns") {
            assert_eq!(params.to_vec(), vec!["todoapp_tasks"]);
            Ok(["id", "user_id", "content", "updated_at", "created_at"]
                .iter()
                .map(|name| {
                    PgRecord::from_pairs([
                        ("column_name", SqlValue::Text(name.to_string())),
                        ("data_type", SqlValue::Text("text".to_string())),
                    ])
                })
                .collect())
        } else if sql.contains("COUNT(*)") {
            Ok(single("row_count", SqlValue::Int(0)))
        } else {
            Err(PgError::query("unexpected"))
        }
    });
    let session = open(&connector).await;

    let report = run_scoped(session, &Provisioning::default()).await.unwrap();

    let schema = TableSchema::default();
    let mut expected = schema.table_statements();
    expected.extend(schema.policy_statements());
    assert_eq!(connector.executes(), expected);

    assert_eq!(report.columns.len(), 5);
    assert_eq!(report.policies.len(), 4);
    assert_eq!(report.row_count, 0);
    assert_eq!(connector.closes(), 1);
}

#[tokio::test]
async fn test_statistics_on_empty_table() {
    let connector = FakeConnector::accepting("local")
        .responding(|_: &str, _: &[&str]| Ok(single("row_count", SqlValue::Int(0))));
    let session = open(&connector).await;

    let stats = run_scoped(session, &Statistics::default()).await.unwrap();

    assert_eq!(stats.total_rows, 0);
    assert!(stats.recent.is_empty());
    assert_eq!(connector.queries().len(), 1);
}

#[tokio::test]
async fn test_statistics_per_user() {
    let connector = FakeConnector::accepting("local").responding(|sql: &str, _: &[&str]| {
        if sql.contains("GROUP BY user_id") {
            Ok(vec![
                PgRecord::from_pairs([
                    ("user_id", SqlValue::Text("alice".into())),
                    ("task_count", SqlValue::Int(2)),
                ]),
                PgRecord::from_pairs([
                    ("user_id", SqlValue::Text("bob".into())),
                    ("task_count", SqlValue::Int(1)),
                ]),
            ])
        } else if sql.contains("LEFT(content, 50)") {
            Ok(Vec::new())
        } else {
            Ok(single("row_count", SqlValue::Int(3)))
        }
    });
    let session = open(&connector).await;

    let stats = run_scoped(session, &Statistics::new("todoapp_tasks").recent_limit(2))
        .await
        .unwrap();

    assert_eq!(stats.total_rows, 3);
    assert_eq!(stats.per_user.len(), 2);
    assert_eq!(stats.per_user[0].user_id, "alice");
    assert!(connector.queries()[1].ends_with("ORDER BY \"created_at\" DESC LIMIT 2"));
}

#[tokio::test]
async fn test_statistics_uses_configured_timestamp_column() {
    let connector = FakeConnector::accepting("local").responding(|sql: &str, _: &[&str]| {
        if sql.contains("LEFT(content, 50)") || sql.contains("GROUP BY user_id") {
            Ok(Vec::new())
        } else {
            Ok(single("row_count", SqlValue::Int(1)))
        }
    });
    let session = open(&connector).await;

    run_scoped(session, &Statistics::new("notes").order_by("updated_at"))
        .await
        .unwrap();

    let queries = connector.queries();
    assert!(queries[1].contains("FROM \"notes\" ORDER BY \"updated_at\" DESC LIMIT 5"));
}
