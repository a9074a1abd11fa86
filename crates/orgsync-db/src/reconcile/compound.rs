//! Compound reconciliation
//!
//! Converges a link table with a dependent note table keyed by the link
//! row's surrogate (predecessor + optional note). The primary row is
//! identity-only and never updated; note changes replace the note row.

use std::collections::BTreeMap;

use orgsync_record::{OrgId, Record};

use crate::error::StoreResult;
use crate::layout::CompoundTable;
use crate::row::StoredRow;
use crate::statement::{ColumnValues, MutationStatement};
use crate::traits::RowReader;

use super::repeatable::current_link_ids;

/// Compute the statements converging one compound table pair.
///
/// On insert the primary row precedes its note row; on removal the note
/// row is deleted before the primary row so the reference is never left
/// dangling inside the transaction.
pub async fn reconcile<R: RowReader + ?Sized>(
    reader: &R,
    spec: &CompoundTable,
    org_id: OrgId,
    desired: &[Record],
    current_primary: &[StoredRow],
    current_notes: &[StoredRow],
) -> StoreResult<Vec<MutationStatement>> {
    let desired_links = desired_links(spec, desired)?;
    let current_links = current_link_ids(&spec.primary, current_primary)?;
    let notes_by_primary = notes_by_primary(spec, current_notes)?;

    let mut statements = Vec::new();

    // new links: primary row first, then its note when one is desired
    for (linked_id, note) in &desired_links {
        if current_links.contains_key(linked_id) {
            continue;
        }
        let surrogate = reader.next_sequence_value(spec.primary_sequence).await?;
        statements.push(MutationStatement::insert(
            spec.primary.table,
            ColumnValues::new()
                .with(spec.primary.surrogate_column, surrogate)
                .with(spec.primary.aggregate_column, org_id.get())
                .with(spec.primary.linked_column, *linked_id),
        ));
        if let Some(text) = note {
            statements.push(note_insert(reader, spec, org_id, surrogate, text).await?);
        }
    }

    // retained links: replace the note row when its content changed
    for (linked_id, desired_note) in &desired_links {
        let Some(surrogate) = current_links.get(linked_id) else {
            continue;
        };
        let current_note = notes_by_primary.get(surrogate);
        let unchanged = match (desired_note, current_note) {
            (None, None) => true,
            (Some(text), Some((_, current_text))) => text == current_text,
            _ => false,
        };
        if unchanged {
            continue;
        }
        if let Some((note_surrogate, _)) = current_note {
            statements.push(MutationStatement::delete(
                spec.note_table,
                ColumnValues::new().with(spec.note_surrogate_column, *note_surrogate),
            ));
        }
        if let Some(text) = desired_note {
            statements.push(note_insert(reader, spec, org_id, *surrogate, text).await?);
        }
    }

    // removed links: note row first, then the primary row
    for (linked_id, surrogate) in &current_links {
        if desired_links.contains_key(linked_id) {
            continue;
        }
        if let Some((note_surrogate, _)) = notes_by_primary.get(surrogate) {
            statements.push(MutationStatement::delete(
                spec.note_table,
                ColumnValues::new().with(spec.note_surrogate_column, *note_surrogate),
            ));
        }
        statements.push(MutationStatement::delete(
            spec.primary.table,
            ColumnValues::new().with(spec.primary.surrogate_column, *surrogate),
        ));
    }

    Ok(statements)
}

async fn note_insert<R: RowReader + ?Sized>(
    reader: &R,
    spec: &CompoundTable,
    org_id: OrgId,
    primary_surrogate: i64,
    text: &str,
) -> StoreResult<MutationStatement> {
    let note_surrogate = reader.next_sequence_value(spec.note_sequence).await?;
    Ok(MutationStatement::insert(
        spec.note_table,
        ColumnValues::new()
            .with(spec.note_surrogate_column, note_surrogate)
            .with(spec.note_aggregate_column, org_id.get())
            .with(spec.note_reference_column, primary_surrogate)
            .with(spec.note_column, text),
    ))
}

/// Extract the desired linked ids with their optional note content.
fn desired_links(
    spec: &CompoundTable,
    desired: &[Record],
) -> StoreResult<BTreeMap<i64, Option<String>>> {
    let mut links = BTreeMap::new();
    for group in desired {
        let value = group.require_field(spec.primary.link_field)?;
        let id = OrgId::parse(value)?.get();
        links.insert(id, group.field(spec.note_field).map(str::to_string));
    }
    Ok(links)
}

/// Index current note rows by the primary surrogate they reference.
fn notes_by_primary(
    spec: &CompoundTable,
    current_notes: &[StoredRow],
) -> StoreResult<BTreeMap<i64, (i64, String)>> {
    let mut notes = BTreeMap::new();
    for row in current_notes {
        notes.insert(
            row.get_i64(spec.note_reference_column)?,
            (
                row.get_i64(spec.note_surrogate_column)?,
                row.text_or_empty(spec.note_column).to_string(),
            ),
        );
    }
    Ok(notes)
}
