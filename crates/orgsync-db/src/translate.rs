//! Main-entity translation
//!
//! A mapping-driven [`MainTranslator`]: scalar fields of the root group
//! become the `SET` columns of the main table's update, keyed by the
//! validated aggregate id.

use chrono::Utc;

use orgsync_record::{OrgId, Record};

use crate::error::{StoreError, StoreResult};
use crate::statement::ColumnValues;
use crate::traits::MainTranslator;

/// One field-to-column mapping rule.
#[derive(Debug, Clone)]
struct Mapping {
    field: String,
    column: String,
    /// Whether translation fails when the field is absent.
    required: bool,
}

/// Translator driven by a list of field-to-column mappings.
#[derive(Debug, Clone)]
pub struct FieldTranslator {
    key_field: String,
    key_column: String,
    mappings: Vec<Mapping>,
    timestamp_column: Option<String>,
}

impl FieldTranslator {
    /// Create a translator with the given id field and key column.
    pub fn new(key_field: impl Into<String>, key_column: impl Into<String>) -> Self {
        Self {
            key_field: key_field.into(),
            key_column: key_column.into(),
            mappings: Vec::new(),
            timestamp_column: None,
        }
    }

    /// Map an optional field; absence is written as an empty value.
    #[must_use]
    pub fn with_mapping(mut self, field: impl Into<String>, column: impl Into<String>) -> Self {
        self.mappings.push(Mapping {
            field: field.into(),
            column: column.into(),
            required: false,
        });
        self
    }

    /// Map a mandatory field; absence rejects the whole update.
    #[must_use]
    pub fn with_required_mapping(
        mut self,
        field: impl Into<String>,
        column: impl Into<String>,
    ) -> Self {
        self.mappings.push(Mapping {
            field: field.into(),
            column: column.into(),
            required: true,
        });
        self
    }

    /// Stamp the given column with the update time.
    #[must_use]
    pub fn with_timestamp_column(mut self, column: impl Into<String>) -> Self {
        self.timestamp_column = Some(column.into());
        self
    }

    /// The translator for the standard `org_unit` table.
    #[must_use]
    pub fn standard() -> Self {
        Self::new("org_unit_id", "org_unit_id")
            .with_required_mapping("name", "name")
            .with_mapping("legal_form", "legal_form")
            .with_mapping("status", "status")
            .with_timestamp_column("updated_at")
    }
}

impl MainTranslator for FieldTranslator {
    fn translate(&self, desired: &Record) -> StoreResult<(ColumnValues, ColumnValues)> {
        let id = OrgId::parse(desired.require_field(&self.key_field)?)?;

        let mut values = ColumnValues::new();
        for mapping in &self.mappings {
            let value = match desired.field(&mapping.field) {
                Some(value) => value,
                None if mapping.required => {
                    return Err(StoreError::validation(format!(
                        "mandatory field '{}' is missing",
                        mapping.field
                    )));
                }
                None => "",
            };
            values.push(mapping.column.clone(), value);
        }
        if let Some(column) = &self.timestamp_column {
            values.push(column.clone(), Utc::now());
        }

        let conditions = ColumnValues::new().with(self.key_column.clone(), id.get());
        Ok((values, conditions))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::statement::SqlValue;

    fn desired() -> Record {
        Record::new()
            .with_field("org_unit_id", "678")
            .with_field("name", "Example GmbH")
            .with_field("legal_form", "GmbH")
    }

    #[test]
    fn test_translate_standard() {
        let (values, conditions) = FieldTranslator::standard().translate(&desired()).unwrap();

        assert_eq!(
            values.get("name"),
            Some(&SqlValue::Text("Example GmbH".to_string()))
        );
        // absent optional field normalized to an explicit empty value
        assert_eq!(values.get("status"), Some(&SqlValue::Text(String::new())));
        assert!(matches!(
            values.get("updated_at"),
            Some(SqlValue::Timestamp(_))
        ));
        assert_eq!(conditions.get("org_unit_id"), Some(&SqlValue::Integer(678)));
    }

    #[test]
    fn test_missing_required_field_is_rejected() {
        let record = Record::new().with_field("org_unit_id", "678");
        let err = FieldTranslator::standard().translate(&record).unwrap_err();
        assert!(matches!(err, StoreError::Validation { .. }));
    }

    #[test]
    fn test_invalid_id_is_rejected() {
        let record = desired().with_field("org_unit_id", "notAnInt");
        let err = FieldTranslator::standard().translate(&record).unwrap_err();
        assert!(matches!(err, StoreError::Record(_)));
    }
}
