//! Mutation statements
//!
//! Inert descriptions of single relational changes, built in memory by the
//! reconcilers and consumed exactly once by the statement compiler.

use chrono::{DateTime, Utc};

/// The kind of relational change a statement describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// Insert one row.
    Insert,
    /// Update matching rows.
    Update,
    /// Delete matching rows.
    Delete,
}

/// A scalar value bound into a compiled statement.
///
/// Timestamps are kept as their own variant so the backend binds them
/// through a temporal path distinct from the generic scalar binds.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Text(String),
    Integer(i64),
    Bool(bool),
    Timestamp(DateTime<Utc>),
    Null,
}

impl SqlValue {
    /// View a text value as a string slice, treating NULL as empty.
    ///
    /// Used for field comparison, where an absent optional field and a
    /// stored NULL are the same thing.
    #[must_use]
    pub fn as_text_or_empty(&self) -> &str {
        match self {
            SqlValue::Text(s) => s.as_str(),
            _ => "",
        }
    }

    /// View an integer value, if this is one.
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            SqlValue::Integer(i) => Some(*i),
            _ => None,
        }
    }

    /// Check whether this is the NULL value.
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, SqlValue::Null)
    }
}

impl From<&str> for SqlValue {
    fn from(value: &str) -> Self {
        SqlValue::Text(value.to_string())
    }
}

impl From<String> for SqlValue {
    fn from(value: String) -> Self {
        SqlValue::Text(value)
    }
}

impl From<i64> for SqlValue {
    fn from(value: i64) -> Self {
        SqlValue::Integer(value)
    }
}

impl From<bool> for SqlValue {
    fn from(value: bool) -> Self {
        SqlValue::Bool(value)
    }
}

impl From<DateTime<Utc>> for SqlValue {
    fn from(value: DateTime<Utc>) -> Self {
        SqlValue::Timestamp(value)
    }
}

/// An insertion-ordered list of column/value pairs.
///
/// Keeping columns in a vector makes the compiled SQL text and the bind
/// order consistent by construction.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColumnValues(Vec<(String, SqlValue)>);

impl ColumnValues {
    /// Create an empty column list.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a column/value pair.
    pub fn push(&mut self, column: impl Into<String>, value: impl Into<SqlValue>) {
        self.0.push((column.into(), value.into()));
    }

    /// Append a column/value pair using builder pattern.
    #[must_use]
    pub fn with(mut self, column: impl Into<String>, value: impl Into<SqlValue>) -> Self {
        self.push(column, value);
        self
    }

    /// Iterate over the column/value pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &SqlValue)> {
        self.0.iter().map(|(c, v)| (c.as_str(), v))
    }

    /// Look up a value by column name.
    pub fn get(&self, column: &str) -> Option<&SqlValue> {
        self.0.iter().find(|(c, _)| c == column).map(|(_, v)| v)
    }

    /// Number of columns.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check whether the list is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, SqlValue)> for ColumnValues {
    fn from_iter<T: IntoIterator<Item = (String, SqlValue)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// One relational change, prior to SQL compilation.
///
/// Statements are never mutated after construction. Inserts carry no
/// conditions and deletes carry no values; an update with empty conditions
/// touches the whole table and is only ever the caller's explicit choice.
#[derive(Debug, Clone, PartialEq)]
pub struct MutationStatement {
    operation: Operation,
    table: String,
    values: ColumnValues,
    conditions: ColumnValues,
}

impl MutationStatement {
    /// Describe inserting one row with the given values.
    #[must_use]
    pub fn insert(table: impl Into<String>, values: ColumnValues) -> Self {
        Self {
            operation: Operation::Insert,
            table: table.into(),
            values,
            conditions: ColumnValues::new(),
        }
    }

    /// Describe updating the rows matching `conditions` with `values`.
    #[must_use]
    pub fn update(table: impl Into<String>, values: ColumnValues, conditions: ColumnValues) -> Self {
        Self {
            operation: Operation::Update,
            table: table.into(),
            values,
            conditions,
        }
    }

    /// Describe deleting the rows matching `conditions`.
    #[must_use]
    pub fn delete(table: impl Into<String>, conditions: ColumnValues) -> Self {
        Self {
            operation: Operation::Delete,
            table: table.into(),
            values: ColumnValues::new(),
            conditions,
        }
    }

    /// The kind of change.
    #[must_use]
    pub fn operation(&self) -> Operation {
        self.operation
    }

    /// The target table.
    #[must_use]
    pub fn table(&self) -> &str {
        &self.table
    }

    /// The columns written by this statement.
    #[must_use]
    pub fn values(&self) -> &ColumnValues {
        &self.values
    }

    /// The equality conditions selecting the affected rows.
    #[must_use]
    pub fn conditions(&self) -> &ColumnValues {
        &self.conditions
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_has_no_conditions() {
        let stmt = MutationStatement::insert(
            "org_parent",
            ColumnValues::new()
                .with("org_unit_id", 678i64)
                .with("parent_unit_id", 22234i64),
        );
        assert_eq!(stmt.operation(), Operation::Insert);
        assert_eq!(stmt.table(), "org_parent");
        assert_eq!(stmt.values().len(), 2);
        assert!(stmt.conditions().is_empty());
    }

    #[test]
    fn test_delete_has_no_values() {
        let stmt = MutationStatement::delete(
            "org_parent",
            ColumnValues::new().with("parent_id", 9001i64),
        );
        assert_eq!(stmt.operation(), Operation::Delete);
        assert!(stmt.values().is_empty());
        assert_eq!(stmt.conditions().get("parent_id"), Some(&SqlValue::Integer(9001)));
    }

    #[test]
    fn test_column_order_is_insertion_order() {
        let values = ColumnValues::new()
            .with("street", "Hauptstrasse 1")
            .with("city", "Berlin")
            .with("country", "DE");
        let columns: Vec<&str> = values.iter().map(|(c, _)| c).collect();
        assert_eq!(columns, vec!["street", "city", "country"]);
    }

    #[test]
    fn test_text_or_empty_treats_null_as_empty() {
        assert_eq!(SqlValue::Null.as_text_or_empty(), "");
        assert_eq!(SqlValue::Text("x".to_string()).as_text_or_empty(), "x");
    }
}
