//! Raw vendor records.
//!
//! A [`RawRecord`] is one row of a vendor export: an untyped bag of fields
//! keyed by column name, exactly as the loading collaborator produced it.
//! Records only live for the duration of extraction.

use std::borrow::Cow;
use std::collections::BTreeSet;

use serde::Deserialize;
use serde_json::Value;

use crate::types::SourceId;

/// One row of a vendor export table.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(transparent)]
pub struct RawRecord {
    fields: serde_json::Map<String, Value>,
}

impl RawRecord {
    /// Wraps a field map.
    #[must_use]
    pub const fn new(fields: serde_json::Map<String, Value>) -> Self {
        Self { fields }
    }

    /// Column names present on this record.
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// Reads a field as text.
    ///
    /// Strings are borrowed; numbers are rendered to text so that loaders
    /// which typed a clock-like column numerically still extract. Null and
    /// absent fields are `None`.
    #[must_use]
    pub fn text(&self, column: &str) -> Option<Cow<'_, str>> {
        match self.fields.get(column)? {
            Value::String(s) => Some(Cow::Borrowed(s.as_str())),
            Value::Number(n) => Some(Cow::Owned(n.to_string())),
            Value::Bool(_) | Value::Array(_) | Value::Object(_) | Value::Null => None,
        }
    }

    /// Reads a field as a non-negative integer count.
    ///
    /// Accepts JSON numbers and numeric strings. Anything else — including
    /// negative values — is `None`.
    #[must_use]
    pub fn count(&self, column: &str) -> Option<u64> {
        match self.fields.get(column)? {
            Value::Number(n) => n.as_u64(),
            Value::String(s) => s.trim().parse().ok(),
            Value::Bool(_) | Value::Array(_) | Value::Object(_) | Value::Null => None,
        }
    }
}

impl From<serde_json::Map<String, Value>> for RawRecord {
    fn from(fields: serde_json::Map<String, Value>) -> Self {
        Self::new(fields)
    }
}

/// One vendor export table: a source ID, its column set, and its rows.
#[derive(Debug, Clone)]
pub struct SourceTable {
    pub source_id: SourceId,
    /// Union of column names across all rows.
    pub columns: BTreeSet<String>,
    pub records: Vec<RawRecord>,
}

impl SourceTable {
    /// Builds a table, deriving the column set from the rows.
    #[must_use]
    pub fn new(source_id: SourceId, records: Vec<RawRecord>) -> Self {
        let columns = records
            .iter()
            .flat_map(RawRecord::columns)
            .map(str::to_string)
            .collect();
        Self {
            source_id,
            columns,
            records,
        }
    }

    /// Whether any row carries the column.
    #[must_use]
    pub fn has_column(&self, column: &str) -> bool {
        self.columns.contains(column)
    }
}
