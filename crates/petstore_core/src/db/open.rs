//! Connection bootstrap utilities for SQLite.
//!
//! # Responsibility
//! - Open file or in-memory SQLite connections.
//! - Configure connection pragmas required by core behavior.
//! - Ensure the bootstrap schema before returning a usable connection.
//!
//! # Invariants
//! - Returned connections have `foreign_keys=ON`.
//! - Returned connections expose the `people` and `pets` tables.

use super::schema::ensure_schema;
use super::DbResult;
use crate::logging::CoreLogger;
use rusqlite::Connection;
use std::path::Path;
use std::time::{Duration, Instant};

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Opens a SQLite database file and ensures the bootstrap schema.
///
/// # Side effects
/// - Creates the file when it does not exist.
/// - Emits `db_open` logging events with duration and status.
pub fn open_db(path: impl AsRef<Path>, logger: &CoreLogger) -> DbResult<Connection> {
    bootstrap(logger, "file", || Connection::open(path))
}

/// Opens an in-memory SQLite database and ensures the bootstrap schema.
///
/// # Side effects
/// - Emits `db_open` logging events with duration and status.
pub fn open_db_in_memory(logger: &CoreLogger) -> DbResult<Connection> {
    bootstrap(logger, "memory", Connection::open_in_memory)
}

fn bootstrap(
    logger: &CoreLogger,
    mode: &str,
    open: impl FnOnce() -> rusqlite::Result<Connection>,
) -> DbResult<Connection> {
    let started_at = Instant::now();
    logger.info(format_args!(
        "event=db_open module=db status=start mode={mode}"
    ));

    let conn = match open() {
        Ok(conn) => conn,
        Err(err) => {
            logger.error(format_args!(
                "event=db_open module=db status=error mode={mode} duration_ms={} error_code=db_open_failed error={}",
                started_at.elapsed().as_millis(),
                err
            ));
            return Err(err.into());
        }
    };

    match configure_connection(&conn).and_then(|()| ensure_schema(&conn)) {
        Ok(()) => {
            logger.info(format_args!(
                "event=db_open module=db status=ok mode={mode} duration_ms={}",
                started_at.elapsed().as_millis()
            ));
            Ok(conn)
        }
        Err(err) => {
            logger.error(format_args!(
                "event=db_open module=db status=error mode={mode} duration_ms={} error_code=db_bootstrap_failed error={}",
                started_at.elapsed().as_millis(),
                err
            ));
            Err(err)
        }
    }
}

pub(super) fn configure_connection(conn: &Connection) -> DbResult<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(BUSY_TIMEOUT)?;
    Ok(())
}
