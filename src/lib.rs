// Tablecast - Warehouse Table to Object Store Export Tool
// Copyright (c) 2025 Tablecast Contributors
// Licensed under the MIT License

//! # Tablecast - Warehouse Table to Object Store Export
//!
//! Tablecast reads every row of a warehouse table and publishes it to an
//! object store bucket as a single serialized document (XML or CSV).
//!
//! ## Overview
//!
//! This library provides the core functionality for:
//! - **Reading** rows from BigQuery tables via the REST API
//! - **Serializing** records to XML or CSV with canonical text conversion
//! - **Writing** the document to GCS or a local directory tree
//! - **Recovering** from transient faults with two delivery tiers
//!
//! ## Delivery tiers
//!
//! The export first streams the document incrementally to the destination.
//! Each streaming attempt makes a fresh pass over the table, so a
//! half-written upload never leaks into the committed object. When the
//! streaming tier exhausts its retries, or the destination cannot accept
//! incremental writes at all, the pipeline falls back to building the
//! whole document in memory and uploading it in one shot, with its own
//! retry budget.
//!
//! ## Architecture
//!
//! Tablecast follows a layered architecture:
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`core`] - Business logic (serialization, export pipeline, retry)
//! - [`adapters`] - External integrations (BigQuery, GCS, filesystem)
//! - [`domain`] - Core domain types and models
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging and observability
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use tablecast::adapters::source::MemorySource;
//! use tablecast::adapters::store::FsStore;
//! use tablecast::core::export::{ExportPipeline, RetryPolicy};
//! use tablecast::core::serialize::XmlSerializer;
//! use tablecast::domain::{Record, Schema, Value};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let schema: Schema = ["name", "amount"].into_iter().collect();
//!     let records = vec![Record::new()
//!         .with("name", Value::String("ACME Corp".into()))
//!         .with("amount", Value::Integer(1200))];
//!
//!     let source = MemorySource::new(schema, records);
//!     let serializer = XmlSerializer::default();
//!     let store = FsStore::new("/tmp/exports");
//!
//!     let pipeline =
//!         ExportPipeline::new(&source, &serializer, &store, RetryPolicy::default());
//!     let outcome = pipeline.run("my-bucket", "defaulters.xml").await?;
//!
//!     println!("Wrote {} records", outcome.records_written);
//!     Ok(())
//! }
//! ```
//!
//! ## Error Handling
//!
//! Tablecast uses the [`domain::TablecastError`] type for all errors:
//!
//! ```rust,no_run
//! use tablecast::domain::TablecastError;
//!
//! fn example() -> Result<(), TablecastError> {
//!     let config = tablecast::config::load_config("tablecast.toml")?;
//!     Ok(())
//! }
//! ```
//!
//! ## Logging
//!
//! Tablecast uses structured logging with the `tracing` crate:
//!
//! ```rust,no_run
//! use tracing::{info, warn};
//!
//! info!("Starting export");
//! warn!(attempt = 2, "Streaming attempt failed, retrying");
//! ```

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod logging;
