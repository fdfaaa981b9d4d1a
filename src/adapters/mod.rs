//! External system integrations for Tablecast.
//!
//! This module provides the adapters the pipeline is parameterized by:
//!
//! - [`source`] - record sources (BigQuery REST, in-memory)
//! - [`store`] - object stores (GCS JSON API, local filesystem)
//!
//! Both sides are trait-based so the pipeline can be exercised against
//! mock implementations in tests, and so new warehouses or destinations
//! slot in without touching the core.

pub mod source;
pub mod store;
