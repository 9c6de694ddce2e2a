//! Domain model for tracked objects and their typed properties.
//!
//! # Responsibility
//! - Define canonical data structures used by core business logic.
//! - Expose order keys through `crate::ordering::Orderable`.
//!
//! # Invariants
//! - Every record is identified by a stable, non-nil UUID.
//! - Property history is append-only; edits add entries.

pub mod object;
pub mod property;
