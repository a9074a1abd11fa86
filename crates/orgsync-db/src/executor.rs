//! Transactional execution
//!
//! Applies an ordered list of mutation statements as one transaction on
//! one connection. All-or-nothing: any failure rolls back, and the
//! connection is restored and released on every exit path.

use tracing::{debug, warn};

use crate::compiler;
use crate::error::StoreResult;
use crate::statement::MutationStatement;
use crate::traits::{ConnectionProvider, StoreConnection};

/// Execute every statement in list order inside one transaction.
///
/// Acquires one connection, disables auto-commit, executes, then commits.
/// On any error the transaction is rolled back best-effort; a rollback
/// failure is logged and never masks the original error. Auto-commit is
/// restored and the connection released whether the transaction committed
/// or not.
pub async fn execute_transaction<P: ConnectionProvider>(
    provider: &P,
    statements: Vec<MutationStatement>,
) -> StoreResult<()> {
    let mut conn = provider.acquire().await?;
    let outcome = run_transaction(&mut conn, statements).await;

    if let Err(err) = conn.set_auto_commit(true).await {
        warn!(error = %err, "failed to restore auto-commit");
    }
    if let Err(err) = conn.close().await {
        warn!(error = %err, "failed to release connection");
    }

    outcome
}

async fn run_transaction<C: StoreConnection>(
    conn: &mut C,
    statements: Vec<MutationStatement>,
) -> StoreResult<()> {
    conn.set_auto_commit(false).await?;

    let applied = apply_statements(conn, statements).await;
    match applied {
        Ok(()) => match conn.commit().await {
            Ok(()) => Ok(()),
            Err(err) => {
                rollback_best_effort(conn).await;
                Err(err)
            }
        },
        Err(err) => {
            rollback_best_effort(conn).await;
            Err(err)
        }
    }
}

async fn apply_statements<C: StoreConnection>(
    conn: &mut C,
    statements: Vec<MutationStatement>,
) -> StoreResult<()> {
    for statement in statements {
        let compiled = compiler::compile(statement);
        debug!(sql = %compiled.sql, "executing statement");
        conn.execute(&compiled.sql, &compiled.binds).await?;
    }
    Ok(())
}

async fn rollback_best_effort<C: StoreConnection>(conn: &mut C) {
    if let Err(err) = conn.rollback().await {
        warn!(error = %err, "rollback failed after statement error");
    }
}
