//! # Organization Store
//!
//! Projects hierarchical organization records onto a normalized relational
//! schema and keeps the stored rows converged with the caller's desired
//! state on every update.
//!
//! ## Architecture
//!
//! Each `update` call runs read-then-decide-then-apply:
//!
//! - [`OrgSynchronizer`] reads the current rows of the main table and of
//!   every related table, then asks one reconciler per related table for
//!   the statements converging it.
//! - The reconcilers ([`reconcile::singleton`], [`reconcile::repeatable`],
//!   [`reconcile::compound`]) are pure functions of (desired sub-tree,
//!   current rows); they build inert [`MutationStatement`]s and retain
//!   nothing between calls.
//! - [`compiler`] turns each statement into parameterized SQL plus ordered
//!   bind values.
//! - [`executor`] applies the full ordered list on one connection as one
//!   transaction: everything commits or nothing does.
//!
//! ## Example
//!
//! ```ignore
//! use orgsync_db::{FieldTranslator, OrgSynchronizer, PgConnectionProvider, PgRowReader, StoreConfig};
//! use orgsync_record::Record;
//!
//! let pool = StoreConfig::new("db.example.com", "registry", "orgsync")
//!     .with_password("secret")
//!     .connect()
//!     .await?;
//!
//! let sync = OrgSynchronizer::new(
//!     PgRowReader::new(pool.clone()),
//!     FieldTranslator::standard(),
//!     PgConnectionProvider::new(pool),
//! );
//!
//! let desired = Record::new()
//!     .with_field("org_unit_id", "678")
//!     .with_field("name", "Example GmbH")
//!     .with_child("parent", Record::new().with_field("parent_unit_id", "234"));
//!
//! sync.update("678", &desired).await?;
//! ```
//!
//! ## Crate Organization
//!
//! - [`statement`] - Mutation statements and bind values
//! - [`compiler`] - Statement compilation to parameterized SQL
//! - [`reconcile`] - Singleton, repeatable and compound reconcilers
//! - [`layout`] - The typed description of the projected schema
//! - [`sync`] - The aggregate synchronizer
//! - [`executor`] - Transactional execution
//! - [`traits`] - Collaborator seams (row reader, translator, connections)
//! - [`translate`] - Mapping-driven main-entity translation
//! - [`postgres`] - `PostgreSQL` implementations of the seams
//! - [`config`] - Connection configuration
//! - [`error`] - Error types

pub mod compiler;
pub mod config;
pub mod error;
pub mod executor;
pub mod layout;
pub mod postgres;
pub mod reconcile;
pub mod row;
pub mod statement;
pub mod sync;
pub mod traits;
pub mod translate;

pub use compiler::{compile, CompiledStatement};
pub use config::{SslMode, StoreConfig};
pub use error::{StoreError, StoreResult};
pub use layout::{OrgLayout, RelatedTable};
pub use postgres::{PgConnectionProvider, PgRowReader, PgStoreConnection};
pub use row::StoredRow;
pub use statement::{ColumnValues, MutationStatement, Operation, SqlValue};
pub use sync::OrgSynchronizer;
pub use traits::{ConnectionProvider, MainTranslator, RowReader, StoreConnection};
pub use translate::FieldTranslator;
