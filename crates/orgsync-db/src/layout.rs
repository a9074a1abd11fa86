//! Projected table layout
//!
//! The immutable description of how one aggregate maps onto relational
//! tables. Related tables are a closed enumeration of reconciliation
//! shapes, matched explicitly; unknown kinds cannot exist at runtime.

use std::sync::OnceLock;

/// The main table of the aggregate.
#[derive(Debug, Clone, Copy)]
pub struct MainTable {
    /// Table name.
    pub table: &'static str,
    /// Primary key column, holds the aggregate id.
    pub key_column: &'static str,
}

/// Mapping of one record field to one column.
#[derive(Debug, Clone, Copy)]
pub struct FieldMapping {
    /// Field name in the record group.
    pub field: &'static str,
    /// Column name in the related table.
    pub column: &'static str,
}

/// A related table holding at most one row per aggregate.
#[derive(Debug, Clone, Copy)]
pub struct SingletonTable {
    /// Table name.
    pub table: &'static str,
    /// Surrogate key column of the related table.
    pub surrogate_column: &'static str,
    /// Foreign key column back to the aggregate.
    pub aggregate_column: &'static str,
    /// Sequence allocating surrogate keys.
    pub sequence: &'static str,
    /// Record group name carrying the desired state.
    pub group: &'static str,
    /// Mapped fields, compared and written as a complete set.
    pub fields: &'static [FieldMapping],
    /// Foreign key column on the main table referencing this row, if any.
    pub main_reference: Option<&'static str>,
}

/// A related table holding zero-or-many identity-only link rows.
#[derive(Debug, Clone, Copy)]
pub struct RepeatableTable {
    /// Table name.
    pub table: &'static str,
    /// Surrogate key column of the link rows.
    pub surrogate_column: &'static str,
    /// Foreign key column back to the aggregate.
    pub aggregate_column: &'static str,
    /// Column holding the linked foreign id.
    pub linked_column: &'static str,
    /// Record group name carrying the desired links.
    pub group: &'static str,
    /// Record field holding the linked foreign id.
    pub link_field: &'static str,
}

/// A repeatable table with a dependent note table keyed by its surrogate.
#[derive(Debug, Clone, Copy)]
pub struct CompoundTable {
    /// The primary link table.
    pub primary: RepeatableTable,
    /// Sequence allocating primary surrogate keys.
    ///
    /// The primary key must be known before the transaction runs so the
    /// dependent note row can reference it.
    pub primary_sequence: &'static str,
    /// Dependent note table name.
    pub note_table: &'static str,
    /// Surrogate key column of the note table.
    pub note_surrogate_column: &'static str,
    /// Foreign key column back to the aggregate on the note table.
    pub note_aggregate_column: &'static str,
    /// Foreign key column referencing the primary row's surrogate.
    pub note_reference_column: &'static str,
    /// Column holding the note content.
    pub note_column: &'static str,
    /// Sequence allocating note surrogate keys.
    pub note_sequence: &'static str,
    /// Record field holding the optional note content.
    pub note_field: &'static str,
}

/// One related table together with its reconciliation shape.
#[derive(Debug, Clone, Copy)]
pub enum RelatedTable {
    /// Zero-or-one row per aggregate.
    Singleton(SingletonTable),
    /// Zero-or-many identity-only link rows.
    Repeatable(RepeatableTable),
    /// Link rows with a dependent note table.
    Compound(CompoundTable),
}

/// The full projected layout of one aggregate.
///
/// `related` is ordered: the synchronizer reconciles and executes in list
/// order, after the main-table update.
#[derive(Debug, Clone)]
pub struct OrgLayout {
    /// The main table.
    pub main: MainTable,
    /// Related tables in reconciliation order.
    pub related: Vec<RelatedTable>,
}

const ADDRESS_FIELDS: &[FieldMapping] = &[
    FieldMapping {
        field: "street",
        column: "street",
    },
    FieldMapping {
        field: "postal_code",
        column: "postal_code",
    },
    FieldMapping {
        field: "city",
        column: "city",
    },
    FieldMapping {
        field: "country",
        column: "country",
    },
];

const ALT_NAME_FIELDS: &[FieldMapping] = &[
    FieldMapping {
        field: "name",
        column: "name",
    },
    FieldMapping {
        field: "name_kind",
        column: "name_kind",
    },
];

impl OrgLayout {
    /// The standard organization layout, constructed once and shared.
    pub fn standard() -> &'static OrgLayout {
        static STANDARD: OnceLock<OrgLayout> = OnceLock::new();
        STANDARD.get_or_init(|| OrgLayout {
            main: MainTable {
                table: "org_unit",
                key_column: "org_unit_id",
            },
            related: vec![
                RelatedTable::Singleton(SingletonTable {
                    table: "org_address",
                    surrogate_column: "address_id",
                    aggregate_column: "org_unit_id",
                    sequence: "org_address_seq",
                    group: "address",
                    fields: ADDRESS_FIELDS,
                    main_reference: Some("address_id"),
                }),
                RelatedTable::Singleton(SingletonTable {
                    table: "org_alt_name",
                    surrogate_column: "name_id",
                    aggregate_column: "org_unit_id",
                    sequence: "org_alt_name_seq",
                    group: "alternate_name",
                    fields: ALT_NAME_FIELDS,
                    main_reference: None,
                }),
                RelatedTable::Repeatable(RepeatableTable {
                    table: "org_parent",
                    surrogate_column: "parent_id",
                    aggregate_column: "org_unit_id",
                    linked_column: "parent_unit_id",
                    group: "parent",
                    link_field: "parent_unit_id",
                }),
                RelatedTable::Compound(CompoundTable {
                    primary: RepeatableTable {
                        table: "org_predecessor",
                        surrogate_column: "predecessor_id",
                        aggregate_column: "org_unit_id",
                        linked_column: "predecessor_unit_id",
                        group: "predecessor",
                        link_field: "predecessor_unit_id",
                    },
                    primary_sequence: "org_predecessor_seq",
                    note_table: "org_predecessor_note",
                    note_surrogate_column: "note_id",
                    note_aggregate_column: "org_unit_id",
                    note_reference_column: "predecessor_id",
                    note_column: "note",
                    note_sequence: "org_predecessor_note_seq",
                    note_field: "note",
                }),
            ],
        })
    }
}
