//! # Organization Record Model
//!
//! The hierarchical record representation consumed by the orgsync
//! reconciliation engine.
//!
//! A [`Record`] is a group of scalar string fields plus named lists of
//! child groups. The caller builds one record per aggregate (the main
//! organization entity with its address, alternate name, parent links and
//! predecessor links); the engine only navigates it read-only.
//!
//! ## Example
//!
//! ```
//! use orgsync_record::Record;
//!
//! let desired = Record::new()
//!     .with_field("org_unit_id", "678")
//!     .with_field("name", "Example GmbH")
//!     .with_child(
//!         "address",
//!         Record::new()
//!             .with_field("street", "Hauptstrasse 1")
//!             .with_field("city", "Berlin"),
//!     )
//!     .with_child("parent", Record::new().with_field("parent_unit_id", "234"));
//!
//! assert_eq!(desired.field("name"), Some("Example GmbH"));
//! assert_eq!(desired.children("parent").len(), 1);
//! ```
//!
//! ## Crate Organization
//!
//! - [`record`] - The [`Record`] group type and its accessors
//! - [`ids`] - Type-safe identifiers ([`OrgId`])
//! - [`error`] - Record-level error types

pub mod error;
pub mod ids;
pub mod record;

pub use error::{RecordError, RecordResult};
pub use ids::OrgId;
pub use record::Record;
