//! Repeatable-set reconciliation
//!
//! Converges an identity-only link table (parent links) by set difference
//! over the linked foreign ids. Links carry no updatable fields, so ids
//! present on both sides produce nothing.

use std::collections::{BTreeMap, BTreeSet};

use orgsync_record::{OrgId, Record};

use crate::error::StoreResult;
use crate::layout::RepeatableTable;
use crate::row::StoredRow;
use crate::statement::{ColumnValues, MutationStatement};

/// Compute the statements converging one repeatable link table.
///
/// Inserts are emitted before deletes; within each group the order follows
/// the ids and carries no meaning.
pub fn reconcile(
    spec: &RepeatableTable,
    org_id: OrgId,
    desired: &[Record],
    current: &[StoredRow],
) -> StoreResult<Vec<MutationStatement>> {
    let desired_ids = desired_link_ids(spec, desired)?;
    let current_ids = current_link_ids(spec, current)?;

    let mut statements = Vec::new();

    let current_keys: BTreeSet<i64> = current_ids.keys().copied().collect();
    for id in desired_ids.difference(&current_keys) {
        statements.push(MutationStatement::insert(
            spec.table,
            ColumnValues::new()
                .with(spec.aggregate_column, org_id.get())
                .with(spec.linked_column, *id),
        ));
    }

    for (id, surrogate) in &current_ids {
        if !desired_ids.contains(id) {
            statements.push(MutationStatement::delete(
                spec.table,
                ColumnValues::new().with(spec.surrogate_column, *surrogate),
            ));
        }
    }

    Ok(statements)
}

/// Extract the desired linked ids, validating each as a positive integer.
pub(crate) fn desired_link_ids(
    spec: &RepeatableTable,
    desired: &[Record],
) -> StoreResult<BTreeSet<i64>> {
    let mut ids = BTreeSet::new();
    for group in desired {
        let value = group.require_field(spec.link_field)?;
        ids.insert(OrgId::parse(value)?.get());
    }
    Ok(ids)
}

/// Map the current linked ids to their row surrogate keys.
pub(crate) fn current_link_ids(
    spec: &RepeatableTable,
    current: &[StoredRow],
) -> StoreResult<BTreeMap<i64, i64>> {
    let mut ids = BTreeMap::new();
    for row in current {
        ids.insert(
            row.get_i64(spec.linked_column)?,
            row.get_i64(spec.surrogate_column)?,
        );
    }
    Ok(ids)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;
    use crate::layout::{OrgLayout, RelatedTable};
    use crate::statement::{Operation, SqlValue};
    use orgsync_record::RecordError;

    fn parent_spec() -> RepeatableTable {
        let RelatedTable::Repeatable(spec) = OrgLayout::standard().related[2] else {
            panic!("expected repeatable");
        };
        spec
    }

    fn parent_group(id: &str) -> Record {
        Record::new().with_field("parent_unit_id", id)
    }

    fn parent_row(surrogate: i64, linked: i64) -> StoredRow {
        StoredRow::new()
            .with("parent_id", surrogate)
            .with("org_unit_id", 678i64)
            .with("parent_unit_id", linked)
    }

    #[test]
    fn test_insert_only_the_missing_id() {
        let spec = parent_spec();
        let desired = vec![parent_group("234"), parent_group("22234")];
        let current = vec![parent_row(9001, 234)];

        let statements =
            reconcile(&spec, OrgId::from_i64(678), &desired, &current).unwrap();

        assert_eq!(statements.len(), 1);
        assert_eq!(statements[0].operation(), Operation::Insert);
        assert_eq!(
            statements[0].values().get("parent_unit_id"),
            Some(&SqlValue::Integer(22234))
        );
        assert_eq!(
            statements[0].values().get("org_unit_id"),
            Some(&SqlValue::Integer(678))
        );
    }

    #[test]
    fn test_full_teardown() {
        let spec = parent_spec();
        let current = vec![parent_row(9001, 234)];

        let statements = reconcile(&spec, OrgId::from_i64(678), &[], &current).unwrap();

        assert_eq!(statements.len(), 1);
        assert_eq!(statements[0].operation(), Operation::Delete);
        assert_eq!(
            statements[0].conditions().get("parent_id"),
            Some(&SqlValue::Integer(9001))
        );
    }

    #[test]
    fn test_full_population() {
        let spec = parent_spec();
        let desired = vec![parent_group("234"), parent_group("22234")];

        let statements = reconcile(&spec, OrgId::from_i64(678), &desired, &[]).unwrap();
        assert_eq!(statements.len(), 2);
        assert!(statements
            .iter()
            .all(|s| s.operation() == Operation::Insert));
    }

    #[test]
    fn test_set_algebra() {
        let spec = parent_spec();
        // desired {1, 2, 3}, current {2, 3, 4}: insert 1, delete 4
        let desired = vec![parent_group("1"), parent_group("2"), parent_group("3")];
        let current = vec![parent_row(11, 2), parent_row(12, 3), parent_row(13, 4)];

        let statements =
            reconcile(&spec, OrgId::from_i64(678), &desired, &current).unwrap();

        assert_eq!(statements.len(), 2);
        assert_eq!(statements[0].operation(), Operation::Insert);
        assert_eq!(
            statements[0].values().get("parent_unit_id"),
            Some(&SqlValue::Integer(1))
        );
        assert_eq!(statements[1].operation(), Operation::Delete);
        assert_eq!(
            statements[1].conditions().get("parent_id"),
            Some(&SqlValue::Integer(13))
        );
    }

    #[test]
    fn test_inserts_come_before_deletes() {
        let spec = parent_spec();
        let desired = vec![parent_group("5")];
        let current = vec![parent_row(11, 2)];

        let statements =
            reconcile(&spec, OrgId::from_i64(678), &desired, &current).unwrap();

        assert_eq!(statements.len(), 2);
        assert_eq!(statements[0].operation(), Operation::Insert);
        assert_eq!(statements[1].operation(), Operation::Delete);
    }

    #[test]
    fn test_reconcile_is_idempotent() {
        let spec = parent_spec();
        let desired = vec![parent_group("234"), parent_group("22234")];
        let current = vec![parent_row(9001, 234), parent_row(9002, 22234)];

        let statements =
            reconcile(&spec, OrgId::from_i64(678), &desired, &current).unwrap();
        assert!(statements.is_empty());
    }

    #[test]
    fn test_non_integer_link_id_is_rejected() {
        let spec = parent_spec();
        let desired = vec![parent_group("notAnInt")];

        let err = reconcile(&spec, OrgId::from_i64(678), &desired, &[]).unwrap_err();
        assert!(matches!(
            err,
            StoreError::Record(RecordError::InvalidId { .. })
        ));
    }

    #[test]
    fn test_missing_link_field_is_rejected() {
        let spec = parent_spec();
        let desired = vec![Record::new()];

        let err = reconcile(&spec, OrgId::from_i64(678), &desired, &[]).unwrap_err();
        assert!(matches!(
            err,
            StoreError::Record(RecordError::MissingField { .. })
        ));
    }
}
