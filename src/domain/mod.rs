//! Domain models and types for Tablecast.
//!
//! This module contains the core domain types shared by the pipeline and
//! the adapters:
//!
//! - **Typed records** ([`Record`], [`Value`], [`Schema`]) - the single
//!   access path from warehouse rows to serializers
//! - **Error taxonomy** ([`TablecastError`], [`SourceError`],
//!   [`StorageError`]) - the closed set of failure classes the pipeline
//!   routes on
//! - **Result alias** ([`Result`])
//!
//! # Error Handling
//!
//! All fallible operations return [`Result<T>`]:
//!
//! ```rust
//! use tablecast::domain::{Result, TablecastError};
//!
//! fn example() -> Result<()> {
//!     Err(TablecastError::Validation("Invalid input".to_string()))
//! }
//! ```

pub mod errors;
pub mod record;
pub mod result;

pub use errors::{SourceError, StorageError, TablecastError};
pub use record::{Record, Schema, Value};
pub use result::Result;
