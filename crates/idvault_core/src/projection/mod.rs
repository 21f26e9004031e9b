//! Projection between normalized attribute rows and the grouped view.
//!
//! # Responsibility
//! - Convert logical attribute assignments into one-value-per-row facts.
//! - Derive and cache the name-to-values view those rows imply.
//!
//! # Invariants
//! - Rows are the only persisted truth; the view is rebuildable at any time.

mod projector;
mod view;

pub use projector::AttributeProjector;
