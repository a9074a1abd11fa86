//! Stored rows
//!
//! Flat column/value maps as returned by a row read, with typed accessors
//! that fail closed on missing columns or unexpected types.

use std::collections::HashMap;

use crate::error::{StoreError, StoreResult};
use crate::statement::SqlValue;

/// One flat row read from a related table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StoredRow {
    columns: HashMap<String, SqlValue>,
}

impl StoredRow {
    /// Create an empty row.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a column value.
    pub fn set(&mut self, column: impl Into<String>, value: impl Into<SqlValue>) {
        self.columns.insert(column.into(), value.into());
    }

    /// Set a column value using builder pattern.
    #[must_use]
    pub fn with(mut self, column: impl Into<String>, value: impl Into<SqlValue>) -> Self {
        self.set(column, value);
        self
    }

    /// Get a column value.
    pub fn get(&self, column: &str) -> Option<&SqlValue> {
        self.columns.get(column)
    }

    /// Get an integer column, failing when it is absent or not an integer.
    pub fn get_i64(&self, column: &str) -> StoreResult<i64> {
        match self.get(column) {
            None => Err(StoreError::MissingColumn {
                column: column.to_string(),
            }),
            Some(value) => value.as_i64().ok_or_else(|| StoreError::ColumnType {
                column: column.to_string(),
                expected: "integer",
            }),
        }
    }

    /// Get a text column for comparison, treating absent and NULL as empty.
    #[must_use]
    pub fn text_or_empty(&self, column: &str) -> &str {
        self.get(column).map_or("", SqlValue::as_text_or_empty)
    }

    /// Iterate over all columns of this row.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &SqlValue)> {
        self.columns.iter().map(|(c, v)| (c.as_str(), v))
    }
}

impl FromIterator<(String, SqlValue)> for StoredRow {
    fn from_iter<T: IntoIterator<Item = (String, SqlValue)>>(iter: T) -> Self {
        Self {
            columns: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_typed_getters() {
        let row = StoredRow::new()
            .with("parent_id", 9001i64)
            .with("street", "Hauptstrasse 1")
            .with("note", SqlValue::Null);

        assert_eq!(row.get_i64("parent_id").unwrap(), 9001);
        assert_eq!(row.text_or_empty("street"), "Hauptstrasse 1");
        assert_eq!(row.text_or_empty("note"), "");
        assert_eq!(row.text_or_empty("missing"), "");
    }

    #[test]
    fn test_getters_fail_closed() {
        let row = StoredRow::new().with("street", "Hauptstrasse 1");

        assert!(matches!(
            row.get_i64("parent_id"),
            Err(StoreError::MissingColumn { .. })
        ));
        assert!(matches!(
            row.get_i64("street"),
            Err(StoreError::ColumnType { .. })
        ));
    }
}
