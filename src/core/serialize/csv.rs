//! Delimited-text serializer
//!
//! One header line of column names, then one line per record, quoted per
//! RFC 4180 by the `csv` crate. Null values render as empty fields.

use super::RecordSerializer;
use crate::domain::{Record, Result, Schema, TablecastError};
use csv::WriterBuilder;

/// CSV document serializer
#[derive(Debug, Clone)]
pub struct CsvSerializer {
    delimiter: u8,
}

impl Default for CsvSerializer {
    fn default() -> Self {
        Self { delimiter: b',' }
    }
}

impl CsvSerializer {
    /// Create a serializer with a custom field delimiter
    pub fn with_delimiter(delimiter: u8) -> Self {
        Self { delimiter }
    }

    /// Render one line, letting the csv crate handle quoting.
    fn write_line<I, S>(&self, out: &mut Vec<u8>, fields: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<[u8]>,
    {
        let mut writer = WriterBuilder::new()
            .delimiter(self.delimiter)
            .from_writer(Vec::new());
        writer
            .write_record(fields)
            .map_err(|e| TablecastError::Serialization(format!("CSV write failed: {e}")))?;
        let line = writer
            .into_inner()
            .map_err(|e| TablecastError::Serialization(format!("CSV flush failed: {e}")))?;
        out.extend_from_slice(&line);
        Ok(())
    }
}

impl RecordSerializer for CsvSerializer {
    fn content_type(&self) -> &'static str {
        "text/csv"
    }

    fn write_header(&self, out: &mut Vec<u8>, schema: &Schema) -> Result<()> {
        self.write_line(out, schema.columns())
    }

    fn write_record(&self, out: &mut Vec<u8>, record: &Record, schema: &Schema) -> Result<()> {
        let fields: Vec<String> = schema
            .columns()
            .iter()
            .map(|column| record.get(column).to_text())
            .collect();
        self.write_line(out, &fields)
    }

    // CSV has no end marker
    fn write_footer(&self, _out: &mut Vec<u8>) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Value;

    fn schema() -> Schema {
        ["loan_id", "amount", "status"].into_iter().collect()
    }

    #[test]
    fn test_header_line_lists_columns() {
        let mut out = Vec::new();
        CsvSerializer::default()
            .write_header(&mut out, &schema())
            .unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "loan_id,amount,status\n");
    }

    #[test]
    fn test_null_renders_as_empty_field() {
        let record = Record::new()
            .with("loan_id", Value::String("L000001".to_string()))
            .with("amount", Value::Float(1000.5))
            .with("status", Value::Null);
        let mut out = Vec::new();
        CsvSerializer::default()
            .write_record(&mut out, &record, &schema())
            .unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "L000001,1000.5,\n");
    }

    #[test]
    fn test_fields_with_delimiter_are_quoted() {
        let record = Record::new()
            .with("loan_id", Value::String("L1".to_string()))
            .with("amount", Value::Integer(5))
            .with("status", Value::String("Closed, pending review".to_string()));
        let mut out = Vec::new();
        CsvSerializer::default()
            .write_record(&mut out, &record, &schema())
            .unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "L1,5,\"Closed, pending review\"\n"
        );
    }

    #[test]
    fn test_custom_delimiter() {
        let mut out = Vec::new();
        CsvSerializer::with_delimiter(b'|')
            .write_header(&mut out, &schema())
            .unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "loan_id|amount|status\n");
    }

    #[test]
    fn test_footer_is_empty() {
        let mut out = Vec::new();
        CsvSerializer::default().write_footer(&mut out).unwrap();
        assert!(out.is_empty());
    }
}
