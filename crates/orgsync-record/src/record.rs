//! Hierarchical record groups
//!
//! Read-only navigation over the desired state of one aggregate.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::{RecordError, RecordResult};

/// One group of a hierarchical record.
///
/// A group holds scalar string fields and named lists of child groups.
/// The root group is the main organization entity; child groups carry the
/// related sub-entities (`address`, `alternate_name`, `parent`,
/// `predecessor`). Consumers navigate the record read-only and never see
/// the full schema.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// Scalar fields of this group.
    #[serde(default)]
    fields: HashMap<String, String>,
    /// Child groups by group name.
    #[serde(default)]
    children: HashMap<String, Vec<Record>>,
}

impl Record {
    /// Create a new empty group.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a scalar field.
    pub fn set_field(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.fields.insert(name.into(), value.into());
    }

    /// Set a scalar field using builder pattern.
    #[must_use]
    pub fn with_field(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_field(name, value);
        self
    }

    /// Append a child group.
    pub fn add_child(&mut self, name: impl Into<String>, child: Record) {
        self.children.entry(name.into()).or_default().push(child);
    }

    /// Append a child group using builder pattern.
    #[must_use]
    pub fn with_child(mut self, name: impl Into<String>, child: Record) -> Self {
        self.add_child(name, child);
        self
    }

    /// Get a scalar field value.
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).map(String::as_str)
    }

    /// Get a scalar field value, normalizing absence to the empty string.
    ///
    /// Reconciliation compares complete value sets per related table, so
    /// optional fields never stay implicit.
    #[must_use]
    pub fn field_or_empty(&self, name: &str) -> &str {
        self.field(name).unwrap_or("")
    }

    /// Get a mandatory scalar field, failing when it is absent.
    pub fn require_field(&self, name: &str) -> RecordResult<&str> {
        self.field(name).ok_or_else(|| RecordError::MissingField {
            field: name.to_string(),
        })
    }

    /// Check if a scalar field is present.
    #[must_use]
    pub fn has_field(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    /// Get all child groups with the given name.
    #[must_use]
    pub fn children(&self, name: &str) -> &[Record] {
        self.children.get(name).map_or(&[], Vec::as_slice)
    }

    /// Get a zero-or-one child group.
    ///
    /// Fails when the group occurs more than once; the caller must not
    /// guess which occurrence is authoritative.
    pub fn child(&self, name: &str) -> RecordResult<Option<&Record>> {
        let groups = self.children(name);
        match groups.len() {
            0 => Ok(None),
            1 => Ok(Some(&groups[0])),
            count => Err(RecordError::AmbiguousGroup {
                group: name.to_string(),
                count,
            }),
        }
    }

    /// Check if at least one child group with the given name is present.
    #[must_use]
    pub fn has_child(&self, name: &str) -> bool {
        !self.children(name).is_empty()
    }

    /// Iterate over all scalar fields of this group.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_fields() {
        let record = Record::new()
            .with_field("org_unit_id", "678")
            .with_field("name", "Example GmbH");

        assert_eq!(record.field("org_unit_id"), Some("678"));
        assert_eq!(record.field("missing"), None);
        assert_eq!(record.field_or_empty("missing"), "");
        assert!(record.has_field("name"));
        assert!(!record.has_field("missing"));
    }

    #[test]
    fn test_require_field() {
        let record = Record::new().with_field("name", "Example GmbH");
        assert_eq!(record.require_field("name").unwrap(), "Example GmbH");
        assert!(matches!(
            record.require_field("legal_form"),
            Err(RecordError::MissingField { .. })
        ));
    }

    #[test]
    fn test_singleton_child() {
        let record = Record::new().with_child(
            "address",
            Record::new().with_field("city", "Berlin"),
        );

        let address = record.child("address").unwrap().unwrap();
        assert_eq!(address.field("city"), Some("Berlin"));
        assert!(record.child("alternate_name").unwrap().is_none());
    }

    #[test]
    fn test_child_rejects_duplicates() {
        let record = Record::new()
            .with_child("address", Record::new())
            .with_child("address", Record::new());

        assert!(matches!(
            record.child("address"),
            Err(RecordError::AmbiguousGroup { count: 2, .. })
        ));
    }

    #[test]
    fn test_repeated_children() {
        let record = Record::new()
            .with_child("parent", Record::new().with_field("parent_unit_id", "234"))
            .with_child("parent", Record::new().with_field("parent_unit_id", "22234"));

        let parents = record.children("parent");
        assert_eq!(parents.len(), 2);
        assert_eq!(parents[0].field("parent_unit_id"), Some("234"));
        assert!(record.children("predecessor").is_empty());
    }

    #[test]
    fn test_serde_round_trip() {
        let record = Record::new()
            .with_field("org_unit_id", "678")
            .with_child("parent", Record::new().with_field("parent_unit_id", "234"));

        let json = serde_json::to_string(&record).unwrap();
        let back: Record = serde_json::from_str(&json).unwrap();
        assert_eq!(back, record);
    }
}
