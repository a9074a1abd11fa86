//! Reconcilers
//!
//! Compute the statements needed to converge one related table to the
//! desired state of one aggregate. Each reconciler is a pure function of
//! (desired sub-tree, current rows); surrogate keys come from the sequence
//! collaborator, and nothing is retained between calls.

pub mod compound;
pub mod repeatable;
pub mod singleton;
