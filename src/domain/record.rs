//! Typed record model
//!
//! A single access path for row data: every source adapter produces
//! [`Record`] values (an ordered mapping from column name to a tagged
//! scalar [`Value`]), and the serializers consume nothing else. This
//! replaces the attribute-vs-mapping fallback chains warehouse client
//! libraries tend to encourage.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use chrono::{DateTime, SecondsFormat, Utc};

/// A scalar field value.
///
/// Composite warehouse values (REPEATED/RECORD fields) are rendered to
/// their canonical JSON text by the source adapter and carried as
/// [`Value::String`]; the serializers never see structured data.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// SQL NULL. Serializers emit an explicit empty representation,
    /// never the literal "null" and never an omitted field.
    Null,
    /// Text value
    String(String),
    /// 64-bit integer
    Integer(i64),
    /// 64-bit float
    Float(f64),
    /// Boolean
    Boolean(bool),
    /// Timestamp, always UTC
    Timestamp(DateTime<Utc>),
    /// Raw byte blob
    Bytes(Vec<u8>),
}

impl Value {
    /// Canonical text rendering of a value.
    ///
    /// - `Null` renders as the empty string
    /// - timestamps render as ISO-8601 UTC with a literal `Z` suffix
    ///   (never a numeric offset)
    /// - bytes decode as UTF-8 when valid, otherwise render as standard
    ///   Base64
    /// - numbers and booleans use their `Display` form
    ///
    /// The rendering is deterministic: the same value always produces the
    /// same text, which is what makes re-runs byte-for-byte identical.
    pub fn to_text(&self) -> String {
        match self {
            Value::Null => String::new(),
            Value::String(s) => s.clone(),
            Value::Integer(i) => i.to_string(),
            Value::Float(f) => f.to_string(),
            Value::Boolean(b) => b.to_string(),
            Value::Timestamp(ts) => ts.to_rfc3339_opts(SecondsFormat::AutoSi, true),
            Value::Bytes(bytes) => match std::str::from_utf8(bytes) {
                Ok(text) => text.to_string(),
                Err(_) => BASE64.encode(bytes),
            },
        }
    }

    /// Whether this value is SQL NULL
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }
}

/// Ordered column names for one export run.
///
/// Fetched once from table metadata before iteration begins and fixed for
/// the duration of the run. Every record is read against this ordering.
#[derive(Debug, Clone, PartialEq)]
pub struct Schema {
    columns: Vec<String>,
}

impl Schema {
    /// Create a schema from ordered column names
    pub fn new(columns: Vec<String>) -> Self {
        Self { columns }
    }

    /// Column names in declaration order
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Number of columns
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Whether the schema has no columns
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for Schema {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Schema::new(iter.into_iter().map(Into::into).collect())
    }
}

/// One row: an ordered mapping from column name to [`Value`].
///
/// Records are produced lazily by a source, consumed exactly once by a
/// serializer, and not retained afterwards. A column missing from the
/// record reads as [`Value::Null`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    fields: Vec<(String, Value)>,
}

impl Record {
    /// Create an empty record
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a field, preserving insertion order
    pub fn push(&mut self, column: impl Into<String>, value: Value) {
        self.fields.push((column.into(), value));
    }

    /// Builder-style variant of [`Record::push`]
    pub fn with(mut self, column: impl Into<String>, value: Value) -> Self {
        self.push(column, value);
        self
    }

    /// Look up a field by column name.
    ///
    /// Returns [`Value::Null`] for columns the record does not carry, so
    /// serializers can iterate the schema without special-casing sparse
    /// rows.
    pub fn get(&self, column: &str) -> &Value {
        self.fields
            .iter()
            .find(|(name, _)| name == column)
            .map(|(_, value)| value)
            .unwrap_or(&Value::Null)
    }

    /// Fields in insertion order
    pub fn fields(&self) -> &[(String, Value)] {
        &self.fields
    }

    /// Number of fields carried by this record
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the record carries no fields
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}
