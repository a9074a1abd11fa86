//! `PostgreSQL` backend
//!
//! Implementations of the collaborator traits over an `sqlx` pool:
//! [`PgRowReader`] for reads and sequence allocation, and
//! [`PgConnectionProvider`] / [`PgStoreConnection`] for transactional
//! execution.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use sqlx::pool::PoolConnection;
use sqlx::postgres::{PgArguments, PgRow};
use sqlx::{Column, Executor, PgPool, Postgres, Row, TypeInfo};
use tracing::debug;

use crate::compiler::escape_identifier;
use crate::error::{StoreError, StoreResult};
use crate::row::StoredRow;
use crate::statement::{ColumnValues, SqlValue};
use crate::traits::{ConnectionProvider, RowReader, StoreConnection};

/// Row reader over a `PostgreSQL` pool.
#[derive(Debug, Clone)]
pub struct PgRowReader {
    pool: PgPool,
}

impl PgRowReader {
    /// Create a reader over the given pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn select_sql(table: &str, conditions: &ColumnValues) -> String {
        let mut sql = format!("SELECT * FROM \"{}\"", escape_identifier(table));
        if !conditions.is_empty() {
            let clauses: Vec<String> = conditions
                .iter()
                .enumerate()
                .map(|(index, (column, _))| {
                    format!("\"{}\" = ${}", escape_identifier(column), index + 1)
                })
                .collect();
            sql.push_str(&format!(" WHERE {}", clauses.join(" AND ")));
        }
        sql
    }
}

#[async_trait]
impl RowReader for PgRowReader {
    async fn read_rows(
        &self,
        table: &str,
        conditions: &ColumnValues,
    ) -> StoreResult<Vec<StoredRow>> {
        let sql = Self::select_sql(table, conditions);
        debug!(sql = %sql, "reading rows");

        let mut query = sqlx::query(&sql);
        for (_, value) in conditions.iter() {
            query = bind_value(query, value);
        }

        let rows = query
            .fetch_all(&self.pool)
            .await
            .map_err(|e| StoreError::statement(sql.clone(), e))?;

        rows.iter().map(decode_row).collect()
    }

    async fn read_one(&self, table: &str, conditions: &ColumnValues) -> StoreResult<StoredRow> {
        let mut rows = self.read_rows(table, conditions).await?;
        match rows.len() {
            1 => Ok(rows.remove(0)),
            count => Err(StoreError::RowCardinality {
                table: table.to_string(),
                count,
            }),
        }
    }

    async fn next_sequence_value(&self, sequence: &str) -> StoreResult<i64> {
        let sql = "SELECT nextval($1::regclass)";
        sqlx::query_scalar::<_, i64>(sql)
            .bind(sequence)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| StoreError::statement(format!("{sql} [{sequence}]"), e))
    }
}

/// Connection provider over a `PostgreSQL` pool.
#[derive(Debug, Clone)]
pub struct PgConnectionProvider {
    pool: PgPool,
}

impl PgConnectionProvider {
    /// Create a provider over the given pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ConnectionProvider for PgConnectionProvider {
    type Conn = PgStoreConnection;

    async fn acquire(&self) -> StoreResult<Self::Conn> {
        let conn = self
            .pool
            .acquire()
            .await
            .map_err(|e| StoreError::connection_with_source("failed to acquire connection", e))?;
        Ok(PgStoreConnection {
            conn: Some(conn),
            in_transaction: false,
        })
    }
}

/// One pooled `PostgreSQL` connection with explicit transaction control.
///
/// `PostgreSQL` has no session-level auto-commit switch; disabling
/// auto-commit opens a transaction, and restoring it rolls back any
/// transaction still open at that point.
pub struct PgStoreConnection {
    conn: Option<PoolConnection<Postgres>>,
    in_transaction: bool,
}

impl PgStoreConnection {
    fn conn(&mut self) -> StoreResult<&mut PoolConnection<Postgres>> {
        self.conn
            .as_mut()
            .ok_or_else(|| StoreError::connection("connection already released"))
    }

    async fn run_command(&mut self, command: &str) -> StoreResult<()> {
        let conn = self.conn()?;
        (&mut **conn)
            .execute(command)
            .await
            .map_err(|e| StoreError::statement(command, e))?;
        Ok(())
    }
}

#[async_trait]
impl StoreConnection for PgStoreConnection {
    async fn set_auto_commit(&mut self, enabled: bool) -> StoreResult<()> {
        if enabled {
            if self.in_transaction {
                self.run_command("ROLLBACK").await?;
                self.in_transaction = false;
            }
        } else if !self.in_transaction {
            self.run_command("BEGIN").await?;
            self.in_transaction = true;
        }
        Ok(())
    }

    async fn execute(&mut self, sql: &str, binds: &[SqlValue]) -> StoreResult<u64> {
        let mut query = sqlx::query(sql);
        for value in binds {
            query = bind_value(query, value);
        }

        let conn = self.conn()?;
        let result = query
            .execute(&mut **conn)
            .await
            .map_err(|e| StoreError::statement(sql, e))?;
        Ok(result.rows_affected())
    }

    async fn commit(&mut self) -> StoreResult<()> {
        self.run_command("COMMIT").await?;
        self.in_transaction = false;
        Ok(())
    }

    async fn rollback(&mut self) -> StoreResult<()> {
        self.run_command("ROLLBACK").await?;
        self.in_transaction = false;
        Ok(())
    }

    async fn close(&mut self) -> StoreResult<()> {
        // dropping the handle returns the connection to the pool
        self.conn.take();
        Ok(())
    }
}

/// Bind one value onto a query.
///
/// Timestamps go through their own arm so temporal values keep a binding
/// path distinct from the generic scalars.
fn bind_value<'q>(
    query: sqlx::query::Query<'q, Postgres, PgArguments>,
    value: &SqlValue,
) -> sqlx::query::Query<'q, Postgres, PgArguments> {
    match value {
        SqlValue::Timestamp(ts) => query.bind(*ts),
        SqlValue::Text(text) => query.bind(text.clone()),
        SqlValue::Integer(i) => query.bind(*i),
        SqlValue::Bool(b) => query.bind(*b),
        SqlValue::Null => query.bind(Option::<String>::None),
    }
}

/// Decode one `PostgreSQL` row into a flat column map.
fn decode_row(row: &PgRow) -> StoreResult<StoredRow> {
    let mut stored = StoredRow::new();

    for (ordinal, column) in row.columns().iter().enumerate() {
        let name = column.name();
        let value = match column.type_info().name() {
            "INT2" => row
                .try_get::<Option<i16>, _>(ordinal)
                .map(|v| v.map(|i| SqlValue::Integer(i64::from(i)))),
            "INT4" => row
                .try_get::<Option<i32>, _>(ordinal)
                .map(|v| v.map(|i| SqlValue::Integer(i64::from(i)))),
            "INT8" => row
                .try_get::<Option<i64>, _>(ordinal)
                .map(|v| v.map(SqlValue::Integer)),
            "BOOL" => row
                .try_get::<Option<bool>, _>(ordinal)
                .map(|v| v.map(SqlValue::Bool)),
            "TIMESTAMPTZ" => row
                .try_get::<Option<DateTime<Utc>>, _>(ordinal)
                .map(|v| v.map(SqlValue::Timestamp)),
            "TIMESTAMP" => row.try_get::<Option<NaiveDateTime>, _>(ordinal).map(|v| {
                v.map(|naive| SqlValue::Timestamp(DateTime::from_naive_utc_and_offset(naive, Utc)))
            }),
            _ => row
                .try_get::<Option<String>, _>(ordinal)
                .map(|v| v.map(SqlValue::Text)),
        };

        let value = value.map_err(|_| StoreError::ColumnType {
            column: name.to_string(),
            expected: "text, integer, boolean or timestamp",
        })?;
        stored.set(name, value.unwrap_or(SqlValue::Null));
    }

    Ok(stored)
}
