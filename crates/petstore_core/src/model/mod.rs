//! Domain model for the pet registry.
//!
//! # Responsibility
//! - Define canonical data structures used by persistence and request adapters.
//!
//! # Invariants
//! - Every pet is identified by a stable, non-empty `PetId`.
//! - Owners are referenced by numeric id only; no person data lives here.

pub mod pet;
