//! Statement compiler
//!
//! Turns a [`MutationStatement`] into parameterized `PostgreSQL` text plus
//! the bind values in matching order.

use crate::statement::{ColumnValues, MutationStatement, Operation, SqlValue};

/// A compiled statement: SQL text plus ordered bind values.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledStatement {
    /// Parameterized SQL text with `$n` placeholders.
    pub sql: String,
    /// Bind values in placeholder order.
    pub binds: Vec<SqlValue>,
}

/// Escape a SQL identifier to prevent SQL injection.
pub(crate) fn escape_identifier(identifier: &str) -> String {
    identifier.replace('"', "\"\"")
}

/// Compile one mutation statement.
///
/// Value-assignment columns bind before condition columns. An update or
/// delete with no conditions omits the `WHERE` clause entirely; the caller
/// asked for a whole-table statement and gets one.
#[must_use]
pub fn compile(statement: MutationStatement) -> CompiledStatement {
    match statement.operation() {
        Operation::Insert => compile_insert(&statement),
        Operation::Update => compile_update(&statement),
        Operation::Delete => compile_delete(&statement),
    }
}

fn compile_insert(statement: &MutationStatement) -> CompiledStatement {
    let mut columns: Vec<String> = Vec::new();
    let mut placeholders: Vec<String> = Vec::new();
    let mut binds: Vec<SqlValue> = Vec::new();

    for (index, (column, value)) in statement.values().iter().enumerate() {
        columns.push(format!("\"{}\"", escape_identifier(column)));
        placeholders.push(format!("${}", index + 1));
        binds.push(value.clone());
    }

    let sql = format!(
        "INSERT INTO \"{}\" ({}) VALUES ({})",
        escape_identifier(statement.table()),
        columns.join(", "),
        placeholders.join(", ")
    );

    CompiledStatement { sql, binds }
}

fn compile_update(statement: &MutationStatement) -> CompiledStatement {
    let mut set_clauses: Vec<String> = Vec::new();
    let mut binds: Vec<SqlValue> = Vec::new();
    let mut param_idx = 0usize;

    for (column, value) in statement.values().iter() {
        param_idx += 1;
        set_clauses.push(format!("\"{}\" = ${param_idx}", escape_identifier(column)));
        binds.push(value.clone());
    }

    let mut sql = format!(
        "UPDATE \"{}\" SET {}",
        escape_identifier(statement.table()),
        set_clauses.join(", ")
    );

    if let Some(where_clause) = where_clause(statement.conditions(), &mut param_idx, &mut binds) {
        sql.push_str(&where_clause);
    }

    CompiledStatement { sql, binds }
}

fn compile_delete(statement: &MutationStatement) -> CompiledStatement {
    let mut binds: Vec<SqlValue> = Vec::new();
    let mut param_idx = 0usize;

    let mut sql = format!("DELETE FROM \"{}\"", escape_identifier(statement.table()));

    if let Some(where_clause) = where_clause(statement.conditions(), &mut param_idx, &mut binds) {
        sql.push_str(&where_clause);
    }

    CompiledStatement { sql, binds }
}

fn where_clause(
    conditions: &ColumnValues,
    param_idx: &mut usize,
    binds: &mut Vec<SqlValue>,
) -> Option<String> {
    if conditions.is_empty() {
        return None;
    }

    let mut clauses: Vec<String> = Vec::new();
    for (column, value) in conditions.iter() {
        *param_idx += 1;
        clauses.push(format!("\"{}\" = ${param_idx}", escape_identifier(column)));
        binds.push(value.clone());
    }

    Some(format!(" WHERE {}", clauses.join(" AND ")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::statement::ColumnValues;

    #[test]
    fn test_compile_insert() {
        let compiled = compile(MutationStatement::insert(
            "org_parent",
            ColumnValues::new()
                .with("org_unit_id", 678i64)
                .with("parent_unit_id", 22234i64),
        ));

        assert_eq!(
            compiled.sql,
            "INSERT INTO \"org_parent\" (\"org_unit_id\", \"parent_unit_id\") VALUES ($1, $2)"
        );
        assert_eq!(
            compiled.binds,
            vec![SqlValue::Integer(678), SqlValue::Integer(22234)]
        );
    }

    #[test]
    fn test_compile_update_binds_values_before_conditions() {
        let compiled = compile(MutationStatement::update(
            "org_address",
            ColumnValues::new()
                .with("street", "Hauptstrasse 1")
                .with("city", "Berlin"),
            ColumnValues::new().with("address_id", 42i64),
        ));

        assert_eq!(
            compiled.sql,
            "UPDATE \"org_address\" SET \"street\" = $1, \"city\" = $2 WHERE \"address_id\" = $3"
        );
        assert_eq!(
            compiled.binds,
            vec![
                SqlValue::Text("Hauptstrasse 1".to_string()),
                SqlValue::Text("Berlin".to_string()),
                SqlValue::Integer(42),
            ]
        );
    }

    #[test]
    fn test_compile_update_without_conditions_omits_where() {
        let compiled = compile(MutationStatement::update(
            "org_unit",
            ColumnValues::new().with("status", "archived"),
            ColumnValues::new(),
        ));

        assert_eq!(compiled.sql, "UPDATE \"org_unit\" SET \"status\" = $1");
        assert_eq!(compiled.binds.len(), 1);
    }

    #[test]
    fn test_compile_delete() {
        let compiled = compile(MutationStatement::delete(
            "org_predecessor_note",
            ColumnValues::new()
                .with("note_id", 7i64)
                .with("org_unit_id", 678i64),
        ));

        assert_eq!(
            compiled.sql,
            "DELETE FROM \"org_predecessor_note\" WHERE \"note_id\" = $1 AND \"org_unit_id\" = $2"
        );
        assert_eq!(
            compiled.binds,
            vec![SqlValue::Integer(7), SqlValue::Integer(678)]
        );
    }

    #[test]
    fn test_compile_delete_without_conditions_omits_where() {
        let compiled = compile(MutationStatement::delete("org_parent", ColumnValues::new()));
        assert_eq!(compiled.sql, "DELETE FROM \"org_parent\"");
        assert!(compiled.binds.is_empty());
    }

    #[test]
    fn test_null_and_timestamp_values_bind_like_any_column() {
        let now = chrono::Utc::now();
        let compiled = compile(MutationStatement::update(
            "org_unit",
            ColumnValues::new()
                .with("address_id", SqlValue::Null)
                .with("updated_at", now),
            ColumnValues::new().with("org_unit_id", 678i64),
        ));

        assert_eq!(
            compiled.binds,
            vec![
                SqlValue::Null,
                SqlValue::Timestamp(now),
                SqlValue::Integer(678),
            ]
        );
    }

    #[test]
    fn test_identifiers_are_escaped() {
        let compiled = compile(MutationStatement::delete(
            "weird\"table",
            ColumnValues::new().with("id", 1i64),
        ));
        assert!(compiled.sql.starts_with("DELETE FROM \"weird\"\"table\""));
    }
}
