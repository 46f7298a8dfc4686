//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the pet data-access contract consumed by request adapters.
//! - Isolate SQLite statement details from adapters.
//!
//! # Invariants
//! - Write paths validate input before acquiring a connection.
//! - Write paths carrying an owner id check `people` before mutating `pets`.
//! - Repository APIs return semantic errors (`NotFound`, `OwnerNotFound`) in
//!   addition to storage errors, classified by `PetErrorKind`.

pub mod pet_repo;
