//! XML serializer
//!
//! Renders records as one element block per row:
//!
//! ```xml
//! <?xml version="1.0" encoding="UTF-8"?>
//! <Defaulters>
//!   <Defaulter>
//!     <loan_id>L000001</loan_id>
//!     <status></status>
//!   </Defaulter>
//! </Defaulters>
//! ```
//!
//! Null values emit a present-but-empty element. Text content is escaped
//! so reserved characters can never break the document structure.

use super::RecordSerializer;
use crate::domain::{Record, Result, Schema, TablecastError};

/// Default root element name
pub const DEFAULT_ROOT_ELEMENT: &str = "Defaulters";

/// Default per-record element name
pub const DEFAULT_RECORD_ELEMENT: &str = "Defaulter";

/// XML document serializer
#[derive(Debug, Clone)]
pub struct XmlSerializer {
    root_element: String,
    record_element: String,
}

impl Default for XmlSerializer {
    fn default() -> Self {
        Self::new(DEFAULT_ROOT_ELEMENT, DEFAULT_RECORD_ELEMENT)
    }
}

impl XmlSerializer {
    /// Create a serializer with custom root and per-record element names
    pub fn new(root_element: impl Into<String>, record_element: impl Into<String>) -> Self {
        Self {
            root_element: root_element.into(),
            record_element: record_element.into(),
        }
    }
}

impl RecordSerializer for XmlSerializer {
    fn content_type(&self) -> &'static str {
        "application/xml"
    }

    fn write_header(&self, out: &mut Vec<u8>, _schema: &Schema) -> Result<()> {
        out.extend_from_slice(b"<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
        out.extend_from_slice(format!("<{}>\n", self.root_element).as_bytes());
        Ok(())
    }

    fn write_record(&self, out: &mut Vec<u8>, record: &Record, schema: &Schema) -> Result<()> {
        out.extend_from_slice(format!("  <{}>\n", self.record_element).as_bytes());
        for column in schema.columns() {
            validate_element_name(column)?;
            let value = record.get(column);
            if value.is_null() {
                out.extend_from_slice(format!("    <{column}></{column}>\n").as_bytes());
            } else {
                let escaped = escape_text(&value.to_text());
                out.extend_from_slice(format!("    <{column}>{escaped}</{column}>\n").as_bytes());
            }
        }
        out.extend_from_slice(format!("  </{}>\n", self.record_element).as_bytes());
        Ok(())
    }

    fn write_footer(&self, out: &mut Vec<u8>) -> Result<()> {
        out.extend_from_slice(format!("</{}>\n", self.root_element).as_bytes());
        Ok(())
    }
}

/// Escape reserved XML characters in text content.
///
/// Quotes are escaped as well so the same routine is safe for attribute
/// values.
fn escape_text(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

/// Column names become element names, so they must be valid XML names.
///
/// Warehouse column naming rules are a strict subset of XML name rules;
/// this rejects anything that slipped past them rather than emitting a
/// malformed document.
fn validate_element_name(name: &str) -> Result<()> {
    let mut chars = name.chars();
    let valid_start = chars
        .next()
        .map(|c| c.is_ascii_alphabetic() || c == '_')
        .unwrap_or(false);
    if valid_start && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-' || c == '.') {
        Ok(())
    } else {
        Err(TablecastError::Serialization(format!(
            "column name '{name}' is not a valid XML element name"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Value;

    fn render(serializer: &XmlSerializer, schema: &Schema, records: &[Record]) -> String {
        let mut out = Vec::new();
        serializer.write_header(&mut out, schema).unwrap();
        for record in records {
            serializer.write_record(&mut out, record, schema).unwrap();
        }
        serializer.write_footer(&mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_declaration_precedes_root() {
        let schema: Schema = ["id"].into_iter().collect();
        let doc = render(&XmlSerializer::default(), &schema, &[]);
        assert!(doc.starts_with("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<Defaulters>\n"));
        assert!(doc.ends_with("</Defaulters>\n"));
    }

    #[test]
    fn test_null_emits_empty_element() {
        let schema: Schema = ["id", "status"].into_iter().collect();
        let record = Record::new()
            .with("id", Value::String("L000001".to_string()))
            .with("status", Value::Null);
        let doc = render(&XmlSerializer::default(), &schema, &[record]);
        assert!(doc.contains("<status></status>"));
        assert!(!doc.contains("null"));
    }

    #[test]
    fn test_missing_column_emits_empty_element() {
        let schema: Schema = ["id", "amount"].into_iter().collect();
        let record = Record::new().with("id", Value::String("L000002".to_string()));
        let doc = render(&XmlSerializer::default(), &schema, &[record]);
        assert!(doc.contains("<amount></amount>"));
    }

    #[test]
    fn test_reserved_characters_are_escaped() {
        let schema: Schema = ["note"].into_iter().collect();
        let record = Record::new().with(
            "note",
            Value::String("a < b && c > \"d\" & 'e'".to_string()),
        );
        let doc = render(&XmlSerializer::default(), &schema, &[record]);
        assert!(doc.contains("a &lt; b &amp;&amp; c &gt; &quot;d&quot; &amp; &apos;e&apos;"));
    }

    #[test]
    fn test_columns_follow_schema_order() {
        let schema: Schema = ["b", "a"].into_iter().collect();
        let record = Record::new()
            .with("a", Value::Integer(1))
            .with("b", Value::Integer(2));
        let doc = render(&XmlSerializer::default(), &schema, &[record]);
        let b_pos = doc.find("<b>").unwrap();
        let a_pos = doc.find("<a>").unwrap();
        assert!(b_pos < a_pos);
    }

    #[test]
    fn test_custom_element_names() {
        let serializer = XmlSerializer::new("Loans", "Loan");
        let schema: Schema = ["id"].into_iter().collect();
        let doc = render(&serializer, &schema, &[Record::new()]);
        assert!(doc.contains("<Loans>\n"));
        assert!(doc.contains("  <Loan>\n"));
        assert!(doc.contains("</Loans>\n"));
    }

    #[test]
    fn test_invalid_column_name_is_rejected() {
        let schema: Schema = ["bad name"].into_iter().collect();
        let mut out = Vec::new();
        let err = XmlSerializer::default()
            .write_record(&mut out, &Record::new(), &schema)
            .unwrap_err();
        assert!(matches!(err, TablecastError::Serialization(_)));
    }
}
