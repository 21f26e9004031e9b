//! Unified domain model for identity records and their attributes.
//!
//! # Responsibility
//! - Define the canonical data structures used by core business logic.
//! - Keep one record envelope shape for user, role, and group identities.
//!
//! # Invariants
//! - Every record is identified by a stable caller-supplied id.
//! - Attribute rows are the persisted source of truth for attribute state.

pub mod attribute;
pub mod record;
