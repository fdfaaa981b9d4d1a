//! BigQuery record source
//!
//! Talks to the BigQuery REST API v2: `tables.get` for the column schema,
//! `tabledata.list` with page-token pagination for rows. Authentication is
//! an opaque pre-resolved bearer token carried in configuration; this
//! adapter performs no credential resolution of its own.

use super::{RecordSource, RecordStream};
use crate::config::SecretString;
use crate::domain::{Record, Result, Schema, SourceError, Value};
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use chrono::DateTime;
use secrecy::ExposeSecret;
use serde::Deserialize;
use std::collections::VecDeque;
use std::time::Duration;

/// Default BigQuery API endpoint
pub const DEFAULT_BASE_URL: &str = "https://bigquery.googleapis.com";

/// Record source backed by a BigQuery table
#[derive(Debug, Clone)]
pub struct BigQuerySource {
    client: reqwest::Client,
    base_url: String,
    project: String,
    dataset: String,
    table: String,
    token: Option<SecretString>,
}

#[derive(Debug, Deserialize)]
struct TableMeta {
    schema: TableSchema,
}

#[derive(Debug, Deserialize)]
struct TableSchema {
    #[serde(default)]
    fields: Vec<FieldMeta>,
}

#[derive(Debug, Clone, Deserialize)]
struct FieldMeta {
    name: String,
    #[serde(rename = "type")]
    field_type: String,
    #[serde(default)]
    mode: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TableDataPage {
    #[serde(default)]
    rows: Vec<TableRow>,
    #[serde(rename = "pageToken")]
    page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TableRow {
    f: Vec<Cell>,
}

#[derive(Debug, Deserialize)]
struct Cell {
    v: serde_json::Value,
}

impl BigQuerySource {
    /// Create a source for `project.dataset.table`
    pub fn new(
        base_url: impl Into<String>,
        project: impl Into<String>,
        dataset: impl Into<String>,
        table: impl Into<String>,
        token: Option<SecretString>,
    ) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(|e| SourceError::ConnectionFailed(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            project: project.into(),
            dataset: dataset.into(),
            table: table.into(),
            token,
        })
    }

    /// Fully-qualified table reference used in logs and errors
    pub fn table_ref(&self) -> String {
        format!("{}.{}.{}", self.project, self.dataset, self.table)
    }

    fn table_url(&self) -> String {
        format!(
            "{}/bigquery/v2/projects/{}/datasets/{}/tables/{}",
            self.base_url, self.project, self.dataset, self.table
        )
    }

    fn authorized(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token.expose_secret()),
            None => request,
        }
    }

    async fn fetch_table_meta(&self) -> Result<TableMeta> {
        let response = self
            .authorized(self.client.get(self.table_url()))
            .send()
            .await
            .map_err(|e| SourceError::ConnectionFailed(e.to_string()))?;

        match response.status() {
            status if status.is_success() => response
                .json::<TableMeta>()
                .await
                .map_err(|e| SourceError::InvalidResponse(e.to_string()).into()),
            reqwest::StatusCode::NOT_FOUND => {
                Err(SourceError::TableNotFound(self.table_ref()).into())
            }
            status => {
                let body = response.text().await.unwrap_or_default();
                Err(SourceError::FetchFailed(format!(
                    "table metadata request returned {status}: {body}"
                ))
                .into())
            }
        }
    }
}

#[async_trait]
impl RecordSource for BigQuerySource {
    async fn schema(&self) -> Result<Schema> {
        let meta = self.fetch_table_meta().await?;
        let columns = meta.schema.fields.iter().map(|f| f.name.clone()).collect();
        tracing::debug!(
            table = %self.table_ref(),
            columns = ?columns,
            "Fetched table schema"
        );
        Ok(Schema::new(columns))
    }

    async fn rows(&self) -> Result<Box<dyn RecordStream>> {
        // Field metadata drives cell decoding, so each fresh pass
        // re-fetches it alongside the first page.
        let meta = self.fetch_table_meta().await?;
        Ok(Box::new(BigQueryStream {
            source: self.clone(),
            fields: meta.schema.fields,
            buffered: VecDeque::new(),
            next_page_token: None,
            started: false,
        }))
    }
}

/// One pass over a table, page by page
struct BigQueryStream {
    source: BigQuerySource,
    fields: Vec<FieldMeta>,
    buffered: VecDeque<Record>,
    next_page_token: Option<String>,
    started: bool,
}

impl BigQueryStream {
    async fn fetch_page(&mut self) -> Result<()> {
        let url = format!("{}/data", self.source.table_url());
        let mut request = self.source.client.get(url);
        if let Some(token) = &self.next_page_token {
            request = request.query(&[("pageToken", token.as_str())]);
        }

        let response = self
            .source
            .authorized(request)
            .send()
            .await
            .map_err(|e| SourceError::ConnectionFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(
                SourceError::FetchFailed(format!("row listing returned {status}: {body}")).into(),
            );
        }

        let page = response
            .json::<TableDataPage>()
            .await
            .map_err(|e| SourceError::InvalidResponse(e.to_string()))?;

        for row in &page.rows {
            self.buffered.push_back(decode_row(&self.fields, row)?);
        }
        self.next_page_token = page.page_token;
        self.started = true;
        Ok(())
    }
}

#[async_trait]
impl RecordStream for BigQueryStream {
    async fn next_record(&mut self) -> Result<Option<Record>> {
        while self.buffered.is_empty() && (!self.started || self.next_page_token.is_some()) {
            self.fetch_page().await?;
        }
        Ok(self.buffered.pop_front())
    }
}

/// Decode one wire row against the field metadata.
fn decode_row(fields: &[FieldMeta], row: &TableRow) -> Result<Record> {
    if row.f.len() != fields.len() {
        return Err(SourceError::InvalidResponse(format!(
            "row has {} cells, schema has {} fields",
            row.f.len(),
            fields.len()
        ))
        .into());
    }

    let mut record = Record::new();
    for (field, cell) in fields.iter().zip(&row.f) {
        record.push(field.name.clone(), decode_cell(field, &cell.v));
    }
    Ok(record)
}

/// Decode one cell per BigQuery JSON conventions.
///
/// REPEATED and RECORD fields arrive as structured JSON; they are carried
/// as their canonical JSON text, since the record model is scalar-only.
/// Cells that fail to parse as their declared type degrade to their raw
/// text rather than aborting the row.
fn decode_cell(field: &FieldMeta, v: &serde_json::Value) -> Value {
    if v.is_null() {
        return Value::Null;
    }

    if field.mode.as_deref() == Some("REPEATED") || !v.is_string() {
        return Value::String(canonical_json_text(v));
    }

    let text = v.as_str().unwrap_or_default();
    match field.field_type.as_str() {
        "INTEGER" | "INT64" => text
            .parse::<i64>()
            .map(Value::Integer)
            .unwrap_or_else(|_| Value::String(text.to_string())),
        "FLOAT" | "FLOAT64" => text
            .parse::<f64>()
            .map(Value::Float)
            .unwrap_or_else(|_| Value::String(text.to_string())),
        "BOOLEAN" | "BOOL" => match text {
            "true" => Value::Boolean(true),
            "false" => Value::Boolean(false),
            other => Value::String(other.to_string()),
        },
        // TIMESTAMP cells are epoch seconds with a fractional part
        "TIMESTAMP" => text
            .parse::<f64>()
            .ok()
            .and_then(|secs| DateTime::from_timestamp_micros((secs * 1_000_000.0).round() as i64))
            .map(Value::Timestamp)
            .unwrap_or_else(|| Value::String(text.to_string())),
        "BYTES" => BASE64
            .decode(text)
            .map(Value::Bytes)
            .unwrap_or_else(|_| Value::String(text.to_string())),
        // NUMERIC/BIGNUMERIC keep their exact decimal text
        _ => Value::String(text.to_string()),
    }
}

/// Deterministic textual form for structured cells
fn canonical_json_text(v: &serde_json::Value) -> String {
    match v {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
