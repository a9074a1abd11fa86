//! Singleton reconciliation
//!
//! Converges a related table holding at most one row per aggregate
//! (address, alternate name).

use orgsync_record::{OrgId, Record};

use crate::error::{StoreError, StoreResult};
use crate::layout::{MainTable, SingletonTable};
use crate::row::StoredRow;
use crate::statement::{ColumnValues, MutationStatement, SqlValue};
use crate::traits::RowReader;

/// Compute the statements converging one singleton table.
///
/// When the main table references the singleton row through a foreign key
/// column, an insert also points that column at the new row, and a removal
/// clears it before the delete so a partially-applied transaction never
/// leaves a dangling reference.
pub async fn reconcile<R: RowReader + ?Sized>(
    reader: &R,
    main: &MainTable,
    spec: &SingletonTable,
    org_id: OrgId,
    desired: Option<&Record>,
    current: &[StoredRow],
) -> StoreResult<Vec<MutationStatement>> {
    if current.len() > 1 {
        return Err(StoreError::SingletonCardinality {
            table: spec.table.to_string(),
            org_id: org_id.get(),
            count: current.len(),
        });
    }

    match (current.first(), desired) {
        (None, None) => Ok(Vec::new()),
        (None, Some(group)) => insert_row(reader, main, spec, org_id, group).await,
        (Some(row), None) => remove_row(main, spec, org_id, row),
        (Some(row), Some(group)) => replace_row(spec, row, group),
    }
}

async fn insert_row<R: RowReader + ?Sized>(
    reader: &R,
    main: &MainTable,
    spec: &SingletonTable,
    org_id: OrgId,
    group: &Record,
) -> StoreResult<Vec<MutationStatement>> {
    let surrogate = reader.next_sequence_value(spec.sequence).await?;

    let mut values = ColumnValues::new()
        .with(spec.surrogate_column, surrogate)
        .with(spec.aggregate_column, org_id.get());
    for mapping in spec.fields {
        values.push(mapping.column, group.field_or_empty(mapping.field));
    }

    let mut statements = vec![MutationStatement::insert(spec.table, values)];

    if let Some(reference) = spec.main_reference {
        statements.push(MutationStatement::update(
            main.table,
            ColumnValues::new().with(reference, surrogate),
            ColumnValues::new().with(main.key_column, org_id.get()),
        ));
    }

    Ok(statements)
}

fn remove_row(
    main: &MainTable,
    spec: &SingletonTable,
    org_id: OrgId,
    row: &StoredRow,
) -> StoreResult<Vec<MutationStatement>> {
    let surrogate = row.get_i64(spec.surrogate_column)?;
    let mut statements = Vec::new();

    // clear the main-table reference before deleting its target
    if let Some(reference) = spec.main_reference {
        statements.push(MutationStatement::update(
            main.table,
            ColumnValues::new().with(reference, SqlValue::Null),
            ColumnValues::new().with(main.key_column, org_id.get()),
        ));
    }

    statements.push(MutationStatement::delete(
        spec.table,
        ColumnValues::new().with(spec.surrogate_column, surrogate),
    ));

    Ok(statements)
}

fn replace_row(
    spec: &SingletonTable,
    row: &StoredRow,
    group: &Record,
) -> StoreResult<Vec<MutationStatement>> {
    let unchanged = spec
        .fields
        .iter()
        .all(|mapping| group.field_or_empty(mapping.field) == row.text_or_empty(mapping.column));
    if unchanged {
        return Ok(Vec::new());
    }

    // full replace: carry every mapped field, not just the changed ones
    let mut values = ColumnValues::new();
    for mapping in spec.fields {
        values.push(mapping.column, group.field_or_empty(mapping.field));
    }

    let surrogate = row.get_i64(spec.surrogate_column)?;
    Ok(vec![MutationStatement::update(
        spec.table,
        values,
        ColumnValues::new().with(spec.surrogate_column, surrogate),
    )])
}
