//! Per-operation connection provisioning.
//!
//! # Responsibility
//! - Hand out one configured connection per repository operation.
//! - Run the schema bootstrap once, up front, instead of on every acquire.
//!
//! # Invariants
//! - Connections are owned by the caller and released when dropped.
//! - No connection is shared between two `acquire` calls.

use super::open::{configure_connection, open_db};
use super::schema::ensure_connection_ready;
use super::DbResult;
use crate::logging::CoreLogger;
use rusqlite::Connection;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Source of fresh storage connections.
///
/// Callers hold the returned connection only for the duration of one
/// operation; dropping it releases the underlying handle.
pub trait ConnectionSource: Send + Sync {
    fn acquire(&self) -> DbResult<Connection>;
}

/// File-backed SQLite connection source.
#[derive(Debug, Clone)]
pub struct SqliteConnectionSource {
    path: PathBuf,
}

impl SqliteConnectionSource {
    /// Bootstraps the database at `path` and returns a source for it.
    ///
    /// # Errors
    /// - Returns an error when the file cannot be opened or the schema cannot be ensured.
    pub fn open(path: impl AsRef<Path>, logger: &CoreLogger) -> DbResult<Self> {
        let path = path.as_ref().to_path_buf();
        let conn = open_db(&path, logger)?;
        ensure_connection_ready(&conn)?;
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ConnectionSource for SqliteConnectionSource {
    fn acquire(&self) -> DbResult<Connection> {
        let conn = Connection::open(&self.path)?;
        configure_connection(&conn)?;
        Ok(conn)
    }
}

impl<S: ConnectionSource + ?Sized> ConnectionSource for Arc<S> {
    fn acquire(&self) -> DbResult<Connection> {
        (**self).acquire()
    }
}
