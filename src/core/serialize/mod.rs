//! Record serialization
//!
//! This module defines the serializer seam between typed records and the
//! bytes handed to a destination writer, plus the two wire formats the
//! tool ships: XML ([`xml::XmlSerializer`]) and delimited text
//! ([`csv::CsvSerializer`]).
//!
//! Serializers are synchronous and append into caller-owned chunks; all
//! I/O happens in the store adapters.

pub mod csv;
pub mod xml;

pub use self::csv::CsvSerializer;
pub use self::xml::XmlSerializer;

use crate::domain::{Record, Result, Schema};

/// Maps records to output chunks in one target format.
///
/// The pipeline drives a serializer in strict header / records / footer
/// order, once per export attempt. Implementations must be deterministic:
/// the same record sequence always produces the same bytes, which is what
/// makes re-runs against truncating destinations idempotent.
///
/// # Contract
///
/// - `write_record` emits every column of `schema`, in schema order,
///   reading missing columns as null
/// - null values get an explicit empty representation, never an omitted
///   field and never a "null" literal
/// - values containing reserved characters for the format are escaped so
///   they can never break the surrounding structure
pub trait RecordSerializer: Send + Sync {
    /// MIME content type for the finished document
    fn content_type(&self) -> &'static str;

    /// Emit the format preamble (e.g. XML declaration + root open tag)
    fn write_header(&self, out: &mut Vec<u8>, schema: &Schema) -> Result<()>;

    /// Emit one serialized record
    fn write_record(&self, out: &mut Vec<u8>, record: &Record, schema: &Schema) -> Result<()>;

    /// Emit the closing root element / end marker
    fn write_footer(&self, out: &mut Vec<u8>) -> Result<()>;
}
