//! Record model error types
//!
//! Validation errors raised while navigating or validating a record.

use thiserror::Error;

/// Error that can occur while reading a hierarchical record.
#[derive(Debug, Error)]
pub enum RecordError {
    /// An identifier field did not parse as a positive integer.
    #[error("invalid organization id '{value}': expected a positive integer")]
    InvalidId { value: String },

    /// A mandatory scalar field is missing from a record group.
    #[error("mandatory field '{field}' is missing")]
    MissingField { field: String },

    /// A group declared zero-or-one occurred more than once.
    #[error("group '{group}' occurs {count} times, at most one expected")]
    AmbiguousGroup { group: String, count: usize },
}

/// Result type for record operations.
pub type RecordResult<T> = Result<T, RecordError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = RecordError::InvalidId {
            value: "notAnInt".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "invalid organization id 'notAnInt': expected a positive integer"
        );

        let err = RecordError::AmbiguousGroup {
            group: "address".to_string(),
            count: 2,
        };
        assert!(err.to_string().contains("address"));
        assert!(err.to_string().contains('2'));
    }
}
