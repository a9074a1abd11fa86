//! Aggregate synchronization
//!
//! The orchestrator: reads current rows, asks each reconciler for
//! statements, and executes the full ordered list as one transaction.

use tracing::{debug, info, instrument};

use orgsync_record::{OrgId, Record};

use crate::error::{StoreError, StoreResult};
use crate::executor::execute_transaction;
use crate::layout::{OrgLayout, RelatedTable};
use crate::reconcile::{compound, repeatable, singleton};
use crate::statement::{ColumnValues, MutationStatement};
use crate::traits::{ConnectionProvider, MainTranslator, RowReader};

/// Projects one aggregate's desired state onto the relational store.
///
/// Stateless between calls: every `update` reads, decides, and applies
/// from scratch. Reads all happen before the write transaction opens, so
/// no statement is computed from partially-committed state.
pub struct OrgSynchronizer<R, T, P> {
    reader: R,
    translator: T,
    provider: P,
    layout: &'static OrgLayout,
}

impl<R, T, P> OrgSynchronizer<R, T, P>
where
    R: RowReader,
    T: MainTranslator,
    P: ConnectionProvider,
{
    /// Create a synchronizer over the standard organization layout.
    pub fn new(reader: R, translator: T, provider: P) -> Self {
        Self::with_layout(reader, translator, provider, OrgLayout::standard())
    }

    /// Create a synchronizer over a custom layout.
    pub fn with_layout(
        reader: R,
        translator: T,
        provider: P,
        layout: &'static OrgLayout,
    ) -> Self {
        Self {
            reader,
            translator,
            provider,
            layout,
        }
    }

    /// Converge the stored rows of one aggregate to the desired state.
    ///
    /// Fails or succeeds as a whole; on failure nothing is applied.
    #[instrument(skip(self, desired), fields(org_id = %org_id))]
    pub async fn update(&self, org_id: &str, desired: &Record) -> StoreResult<()> {
        // validate before touching storage
        let id = OrgId::parse(org_id)?;

        let (values, conditions) = self.translator.translate(desired)?;
        if values.is_empty() {
            return Err(StoreError::validation(
                "main-entity translation produced no columns",
            ));
        }

        let mut statements = vec![MutationStatement::update(
            self.layout.main.table,
            values,
            conditions,
        )];

        // the aggregate must already exist; a missing row fails the read
        self.reader
            .read_one(self.layout.main.table, &self.main_key(id))
            .await?;

        for related in &self.layout.related {
            statements.extend(self.reconcile_related(id, desired, related).await?);
        }

        debug!(count = statements.len(), "applying reconciled statements");
        execute_transaction(&self.provider, statements).await?;

        info!(org_id = %id, "organization synchronized");
        Ok(())
    }

    async fn reconcile_related(
        &self,
        id: OrgId,
        desired: &Record,
        related: &RelatedTable,
    ) -> StoreResult<Vec<MutationStatement>> {
        match related {
            RelatedTable::Singleton(spec) => {
                let current = self
                    .reader
                    .read_rows(spec.table, &self.aggregate_key(spec.aggregate_column, id))
                    .await?;
                let group = desired.child(spec.group)?;
                singleton::reconcile(&self.reader, &self.layout.main, spec, id, group, &current)
                    .await
            }
            RelatedTable::Repeatable(spec) => {
                let current = self
                    .reader
                    .read_rows(spec.table, &self.aggregate_key(spec.aggregate_column, id))
                    .await?;
                repeatable::reconcile(spec, id, desired.children(spec.group), &current)
            }
            RelatedTable::Compound(spec) => {
                let current_primary = self
                    .reader
                    .read_rows(
                        spec.primary.table,
                        &self.aggregate_key(spec.primary.aggregate_column, id),
                    )
                    .await?;
                let current_notes = self
                    .reader
                    .read_rows(
                        spec.note_table,
                        &self.aggregate_key(spec.note_aggregate_column, id),
                    )
                    .await?;
                compound::reconcile(
                    &self.reader,
                    spec,
                    id,
                    desired.children(spec.primary.group),
                    &current_primary,
                    &current_notes,
                )
                .await
            }
        }
    }

    fn main_key(&self, id: OrgId) -> ColumnValues {
        ColumnValues::new().with(self.layout.main.key_column, id.get())
    }

    fn aggregate_key(&self, column: &str, id: OrgId) -> ColumnValues {
        ColumnValues::new().with(column, id.get())
    }
}
