//! Collaborator traits
//!
//! Seams between the reconciliation engine and the storage backend. The
//! engine only ever talks to these traits; the `PostgreSQL` implementations
//! live in [`crate::postgres`], and tests substitute recording mocks.

use async_trait::async_trait;

use orgsync_record::Record;

use crate::error::StoreResult;
use crate::row::StoredRow;
use crate::statement::{ColumnValues, SqlValue};

/// Read access to current rows and surrogate-key sequences.
///
/// All reads for one `update` call happen before any write; the reader is
/// never handed a connection that is inside the write transaction.
#[async_trait]
pub trait RowReader: Send + Sync {
    /// Read all rows of `table` matching the equality `conditions`.
    async fn read_rows(&self, table: &str, conditions: &ColumnValues)
        -> StoreResult<Vec<StoredRow>>;

    /// Read exactly one row of `table` matching the equality `conditions`.
    ///
    /// Fails when the read returns zero rows or more than one.
    async fn read_one(&self, table: &str, conditions: &ColumnValues) -> StoreResult<StoredRow>;

    /// Allocate the next value of a surrogate-key sequence.
    async fn next_sequence_value(&self, sequence: &str) -> StoreResult<i64>;
}

/// Translation of the main entity's scalar fields into column values.
///
/// Produces the `SET` columns and `WHERE` conditions for the main table's
/// update statement. Pure; performs no I/O.
pub trait MainTranslator: Send + Sync {
    /// Translate the desired aggregate's main entity.
    fn translate(&self, desired: &Record) -> StoreResult<(ColumnValues, ColumnValues)>;
}

/// One open connection with explicit transaction control.
#[async_trait]
pub trait StoreConnection: Send {
    /// Enable or disable auto-commit on this connection.
    async fn set_auto_commit(&mut self, enabled: bool) -> StoreResult<()>;

    /// Execute one parameterized statement, returning the affected row count.
    async fn execute(&mut self, sql: &str, binds: &[SqlValue]) -> StoreResult<u64>;

    /// Commit the open transaction.
    async fn commit(&mut self) -> StoreResult<()>;

    /// Roll back the open transaction.
    async fn rollback(&mut self) -> StoreResult<()>;

    /// Release the connection.
    ///
    /// Called on every exit path, after auto-commit has been restored.
    async fn close(&mut self) -> StoreResult<()>;
}

/// Source of connections for transactional execution.
#[async_trait]
pub trait ConnectionProvider: Send + Sync {
    /// The connection type handed out by this provider.
    type Conn: StoreConnection;

    /// Acquire one connection.
    async fn acquire(&self) -> StoreResult<Self::Conn>;
}
