//! Export command implementation
//!
//! This module implements the `export` command that moves a warehouse
//! table into the configured object store as a single document.

use crate::adapters::source::BigQuerySource;
use crate::adapters::store::{fs::FsStore, gcs, gcs::GcsStore, ObjectStore};
use crate::config::{load_config, DestinationBackend, ExportFormat, TablecastConfig};
use crate::core::export::ExportPipeline;
use crate::core::serialize::{CsvSerializer, RecordSerializer, XmlSerializer};
use chrono::Utc;
use clap::Args;

/// Arguments for the export command
#[derive(Args, Debug)]
pub struct ExportArgs {
    /// Override the source table
    #[arg(long)]
    pub table: Option<String>,

    /// Override the destination object path
    #[arg(long)]
    pub object_path: Option<String>,

    /// Override the output format (xml or csv)
    #[arg(long)]
    pub format: Option<String>,
}

impl ExportArgs {
    /// Execute the export command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!("Starting export command");

        let mut config = load_config(config_path)?;

        // Apply CLI overrides
        if let Some(table) = &self.table {
            tracing::info!(table = %table, "Overriding source table from CLI");
            config.source.table = table.clone();
        }

        if let Some(object_path) = &self.object_path {
            tracing::info!(object_path = %object_path, "Overriding object path from CLI");
            config.destination.object_path = Some(object_path.clone());
        }

        if let Some(format) = &self.format {
            config.export.format = match format.to_lowercase().as_str() {
                "xml" => ExportFormat::Xml,
                "csv" => ExportFormat::Csv,
                other => {
                    tracing::error!(format = %other, "Invalid export format");
                    eprintln!("Invalid export format: {other}. Use 'xml' or 'csv'");
                    return Ok(2);
                }
            };
        }

        // Validate configuration
        if let Err(e) = config.validate() {
            tracing::error!(error = %e, "Configuration validation failed");
            eprintln!("Configuration validation failed: {e}");
            return Ok(2); // Configuration error exit code
        }

        let object = object_name(&config);

        println!(
            "🚀 Exporting {} to {}/{}",
            config.source.table_ref(),
            config.destination.bucket,
            object
        );
        println!();

        let source = match build_source(&config) {
            Ok(s) => s,
            Err(e) => {
                tracing::error!(error = %e, "Failed to create source");
                eprintln!("Failed to initialize export: {e}");
                return Ok(4); // Connection error exit code
            }
        };

        let store = match build_store(&config) {
            Ok(s) => s,
            Err(e) => {
                tracing::error!(error = %e, "Failed to create destination store");
                eprintln!("Failed to initialize export: {e}");
                return Ok(4);
            }
        };

        let serializer = build_serializer(&config);

        let pipeline = ExportPipeline::new(
            &source,
            serializer.as_ref(),
            store.as_ref(),
            config.export.retry_policy(),
        );

        let outcome = match pipeline.run(&config.destination.bucket, &object).await {
            Ok(o) => o,
            Err(e) => {
                tracing::error!(error = %e, "Export failed");
                eprintln!("Export failed: {e}");
                return Ok(1);
            }
        };

        outcome.log();

        println!("✅ Export completed");
        println!("  Destination: {}", outcome.destination_uri);
        println!("  Records: {}", outcome.records_written);
        println!("  Tier: {}", outcome.tier);
        println!("  Attempts: {}", outcome.attempts);
        println!("  Duration: {:.2}s", outcome.duration.as_secs_f64());

        Ok(0)
    }
}

/// Object name from configuration, defaulting to `<table>_<timestamp>.<ext>`
fn object_name(config: &TablecastConfig) -> String {
    match &config.destination.object_path {
        Some(path) => path.clone(),
        None => format!(
            "{}_{}.{}",
            config.source.table,
            Utc::now().format("%Y%m%dT%H%M%SZ"),
            config.export.format.extension()
        ),
    }
}

fn build_source(config: &TablecastConfig) -> crate::domain::Result<BigQuerySource> {
    let base_url = config
        .source
        .base_url
        .as_deref()
        .unwrap_or(crate::adapters::source::bigquery::DEFAULT_BASE_URL);

    BigQuerySource::new(
        base_url,
        &config.source.project,
        &config.source.dataset,
        &config.source.table,
        config.source.access_token.clone(),
    )
}

fn build_store(config: &TablecastConfig) -> crate::domain::Result<Box<dyn ObjectStore>> {
    match config.destination.backend {
        DestinationBackend::Gcs => {
            let base_url = config
                .destination
                .base_url
                .as_deref()
                .unwrap_or(gcs::DEFAULT_BASE_URL);
            let store = GcsStore::new(base_url, config.destination.access_token.clone())?;
            Ok(Box::new(store))
        }
        // validate() guarantees root is present for the fs backend
        DestinationBackend::Fs => {
            let root = config.destination.root.clone().unwrap_or_default();
            Ok(Box::new(FsStore::new(root)))
        }
    }
}

fn build_serializer(config: &TablecastConfig) -> Box<dyn RecordSerializer> {
    match config.export.format {
        ExportFormat::Xml => Box::new(XmlSerializer::new(
            config.export.xml_root_element.clone(),
            config.export.xml_record_element.clone(),
        )),
        ExportFormat::Csv => Box::new(CsvSerializer::with_delimiter(
            config.export.csv_delimiter_byte(),
        )),
    }
}
