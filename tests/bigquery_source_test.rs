//! BigQuery source integration tests against a mock HTTP server

use mockito::Matcher;
use tablecast::adapters::source::{BigQuerySource, RecordSource, RecordStream as _};
use tablecast::domain::{SourceError, TablecastError, Value};

const TABLE_PATH: &str = "/bigquery/v2/projects/student-00380/datasets/CL_TRANSFORMED/tables/defaulters";

fn source(base_url: &str) -> BigQuerySource {
    BigQuerySource::new(
        base_url,
        "student-00380",
        "CL_TRANSFORMED",
        "defaulters",
        None,
    )
    .unwrap()
}

fn schema_body() -> &'static str {
    r#"{
        "schema": {
            "fields": [
                {"name": "loan_id", "type": "STRING"},
                {"name": "amount_due", "type": "FLOAT"},
                {"name": "status", "type": "STRING"}
            ]
        }
    }"#
}

#[tokio::test]
async fn test_schema_fetch() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", TABLE_PATH)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(schema_body())
        .create_async()
        .await;

    let schema = source(&server.url()).schema().await.unwrap();
    assert_eq!(schema.columns(), ["loan_id", "amount_due", "status"]);
}

#[tokio::test]
async fn test_missing_table_fails_with_table_not_found() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", TABLE_PATH)
        .with_status(404)
        .with_body(r#"{"error": {"code": 404}}"#)
        .create_async()
        .await;

    let err = source(&server.url()).schema().await.unwrap_err();
    assert!(matches!(
        err,
        TablecastError::Source(SourceError::TableNotFound(_))
    ));
    assert!(err
        .to_string()
        .contains("student-00380.CL_TRANSFORMED.defaulters"));
}

#[tokio::test]
async fn test_rows_follow_page_tokens() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", TABLE_PATH)
        .with_status(200)
        .with_body(schema_body())
        .create_async()
        .await;

    let data_path = format!("{TABLE_PATH}/data");

    // First page carries a continuation token
    let page1 = server
        .mock("GET", data_path.as_str())
        .with_status(200)
        .with_body(
            r#"{
                "rows": [
                    {"f": [{"v": "L000001"}, {"v": "1200.5"}, {"v": "overdue"}]}
                ],
                "pageToken": "page-2"
            }"#,
        )
        .create_async()
        .await;

    // Declared after page1 so it takes priority for the tokened request
    let page2 = server
        .mock("GET", data_path.as_str())
        .match_query(Matcher::UrlEncoded("pageToken".into(), "page-2".into()))
        .with_status(200)
        .with_body(
            r#"{
                "rows": [
                    {"f": [{"v": "L000002"}, {"v": null}, {"v": null}]}
                ]
            }"#,
        )
        .create_async()
        .await;

    let src = source(&server.url());
    let mut rows = src.rows().await.unwrap();

    let first = rows.next_record().await.unwrap().unwrap();
    assert_eq!(first.get("loan_id"), &Value::String("L000001".to_string()));
    assert_eq!(first.get("amount_due"), &Value::Float(1200.5));

    let second = rows.next_record().await.unwrap().unwrap();
    assert_eq!(second.get("loan_id"), &Value::String("L000002".to_string()));
    assert!(second.get("amount_due").is_null());
    assert!(second.get("status").is_null());

    assert!(rows.next_record().await.unwrap().is_none());
    page1.assert_async().await;
    page2.assert_async().await;
}

#[tokio::test]
async fn test_empty_table_yields_no_records() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", TABLE_PATH)
        .with_status(200)
        .with_body(schema_body())
        .create_async()
        .await;
    server
        .mock("GET", format!("{TABLE_PATH}/data").as_str())
        .with_status(200)
        .with_body(r#"{"rows": []}"#)
        .create_async()
        .await;

    let src = source(&server.url());
    let mut rows = src.rows().await.unwrap();
    assert!(rows.next_record().await.unwrap().is_none());
}

#[tokio::test]
async fn test_mid_pass_server_error_surfaces_as_fetch_failure() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", TABLE_PATH)
        .with_status(200)
        .with_body(schema_body())
        .create_async()
        .await;
    server
        .mock("GET", format!("{TABLE_PATH}/data").as_str())
        .with_status(500)
        .with_body("internal error")
        .create_async()
        .await;

    let src = source(&server.url());
    let mut rows = src.rows().await.unwrap();
    let err = rows.next_record().await.unwrap_err();
    assert!(matches!(
        err,
        TablecastError::Source(SourceError::FetchFailed(_))
    ));
}
