//! Store error types
//!
//! Error definitions for reconciliation and transactional execution.
//! Every error is terminal for the current `update` call; the engine never
//! retries on its own.

use thiserror::Error;

use orgsync_record::RecordError;

/// Error that can occur while projecting an aggregate onto the store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Desired state failed validation before any statement was built.
    #[error("validation failed: {message}")]
    Validation { message: String },

    /// A table declared singleton returned more than one row.
    ///
    /// The reconciler refuses to guess which row is authoritative.
    #[error("table '{table}' holds {count} rows for organization {org_id}, at most one expected")]
    SingletonCardinality {
        table: String,
        org_id: i64,
        count: usize,
    },

    /// A read expected exactly one row and found a different count.
    #[error("expected exactly one row from table '{table}', found {count}")]
    RowCardinality { table: String, count: usize },

    /// A stored row is missing a column the reconciler relies on.
    #[error("column '{column}' is missing from a stored row")]
    MissingColumn { column: String },

    /// A stored column holds a value of an unexpected type.
    #[error("column '{column}' holds an unexpected type, expected {expected}")]
    ColumnType {
        column: String,
        expected: &'static str,
    },

    /// A statement failed to prepare or execute.
    ///
    /// Carries the offending SQL text to aid diagnosis.
    #[error("statement failed: {sql}")]
    Statement {
        sql: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Connection acquisition or lifecycle management failed.
    #[error("connection failed: {message}")]
    Connection {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Record navigation or id validation failed.
    #[error(transparent)]
    Record(#[from] RecordError),
}

impl StoreError {
    /// Create a validation error with the given message.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Wrap a driver error together with the SQL text it occurred on.
    pub fn statement(
        sql: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Statement {
            sql: sql.into(),
            source: Box::new(source),
        }
    }

    /// Create a connection error without an underlying cause.
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
            source: None,
        }
    }

    /// Create a connection error wrapping an underlying cause.
    pub fn connection_with_source(
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Connection {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_statement_error_carries_sql() {
        let cause = std::io::Error::new(std::io::ErrorKind::Other, "boom");
        let err = StoreError::statement("DELETE FROM \"org_parent\"", cause);
        assert!(err.to_string().contains("org_parent"));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_record_error_converts() {
        let err: StoreError = RecordError::InvalidId {
            value: "x".to_string(),
        }
        .into();
        assert!(matches!(err, StoreError::Record(_)));
    }
}
