//! Connection bootstrap utilities for SQLite.
//!
//! # Responsibility
//! - Open file or in-memory SQLite connections for the identity store.
//! - Configure connection pragmas required by core behavior.
//! - Run schema migrations before handing out a usable connection.
//!
//! # Invariants
//! - Returned connections have `foreign_keys=ON`.
//! - Returned connections have migrations fully applied.

use super::migrations::apply_migrations;
use super::DbResult;
use log::{error, info};
use rusqlite::Connection;
use std::path::Path;
use std::time::{Duration, Instant};

/// Opens the identity store at `path` and applies all pending migrations.
///
/// # Side effects
/// - Emits `store_open` logging events with duration and status.
pub fn open_store(path: impl AsRef<Path>) -> DbResult<Connection> {
    bootstrap("file", || Connection::open(path))
}

/// Opens an in-memory identity store and applies all pending migrations.
///
/// # Side effects
/// - Emits `store_open` logging events with duration and status.
pub fn open_store_in_memory() -> DbResult<Connection> {
    bootstrap("memory", Connection::open_in_memory)
}

fn bootstrap(
    mode: &str,
    open: impl FnOnce() -> rusqlite::Result<Connection>,
) -> DbResult<Connection> {
    let started_at = Instant::now();
    info!("event=store_open module=db status=start mode={mode}");

    let mut conn = match open() {
        Ok(conn) => conn,
        Err(err) => {
            error!(
                "event=store_open module=db status=error mode={mode} duration_ms={} error_code=store_open_failed error={err}",
                started_at.elapsed().as_millis()
            );
            return Err(err.into());
        }
    };

    match configure_connection(&mut conn) {
        Ok(()) => {
            info!(
                "event=store_open module=db status=ok mode={mode} duration_ms={}",
                started_at.elapsed().as_millis()
            );
            Ok(conn)
        }
        Err(err) => {
            error!(
                "event=store_open module=db status=error mode={mode} duration_ms={} error_code=store_bootstrap_failed error={err}",
                started_at.elapsed().as_millis()
            );
            Err(err)
        }
    }
}

fn configure_connection(conn: &mut Connection) -> DbResult<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(Duration::from_secs(5))?;
    apply_migrations(conn)?;
    Ok(())
}
