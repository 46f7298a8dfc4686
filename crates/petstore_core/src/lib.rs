//! Core domain logic for the pet registry.
//! This crate owns the pet data-access contract and its business invariants.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;

pub use db::{ConnectionSource, DbError, DbResult, SqliteConnectionSource};
pub use logging::{default_log_level, install_panic_hook, CoreLogger};
pub use model::pet::{OwnerId, Pet, PetId, PetValidationError};
pub use repo::pet_repo::{
    PetErrorKind, PetRepository, PetResult, PetStoreError, SqlitePetRepository,
};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
