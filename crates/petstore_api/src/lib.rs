//! HTTP request adapter for the pet registry.
//!
//! # Responsibility
//! - Expose `PetRepository` operations under `/pets` over HTTP.
//! - Translate error kinds into 400/500 responses with plain-text messages.
//! - Own server configuration and the serve loop.
//!
//! # Invariants
//! - Handlers carry no business rules; validation and owner checks live in core.
//! - Blocking storage calls never run on async worker threads.

mod config;
mod error;
mod routes;
mod server;

pub use config::{ConfigError, ServerConfig};
pub use error::ApiError;
pub use routes::{build_router, ApiState, PetForm};
pub use server::serve;
