//! Migration runner — version tracking, forward-only, transactional.

mod v001_initial_schema;

use rusqlite::Connection;
use tracing::{debug, info};

use cortex_core::errors::CortexResult;

use crate::to_storage_err;

pub const LATEST_VERSION: u32 = 1;

type MigrationFn = fn(&Connection) -> CortexResult<()>;

const MIGRATIONS: [(u32, &str, MigrationFn); 1] =
    [(1, "initial_schema", v001_initial_schema::migrate)];

pub fn current_version(conn: &Connection) -> CortexResult<u32> {
    let exists: bool = conn
        .prepare("SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version'")
        .and_then(|mut stmt| stmt.exists([]))
        .map_err(|e| to_storage_err(e.to_string()))?;

    if !exists {
        return Ok(0);
    }

    let version: u32 = conn
        .query_row(
            "SELECT COALESCE(MAX(version), 0) FROM schema_version",
            [],
            |row| row.get(0),
        )
        .map_err(|e| to_storage_err(e.to_string()))?;

    Ok(version)
}

/// Run all pending migrations, each inside its own transaction. Idempotent:
/// calling this twice against an up-to-date database is a no-op.
pub fn run_migrations(conn: &mut Connection) -> CortexResult<u32> {
    let current = current_version(conn)?;
    let mut applied = 0;

    if current >= LATEST_VERSION {
        debug!("database schema is up to date (v{current})");
        return Ok(0);
    }

    info!(from = current, to = LATEST_VERSION, "running migrations");

    for (version, name, migrate) in MIGRATIONS {
        if version <= current {
            continue;
        }
        let tx = conn.transaction().map_err(|e| to_storage_err(e.to_string()))?;
        migrate(&tx)?;
        tx.execute(
            "CREATE TABLE IF NOT EXISTS schema_version (version INTEGER NOT NULL, applied_at TEXT NOT NULL)",
            [],
        )
        .map_err(|e| to_storage_err(e.to_string()))?;
        tx.execute(
            "INSERT INTO schema_version (version, applied_at) VALUES (?1, strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))",
            rusqlite::params![version],
        )
        .map_err(|e| to_storage_err(e.to_string()))?;
        tx.commit().map_err(|e| to_storage_err(e.to_string()))?;
        debug!(version, name, "applied migration");
        applied += 1;
    }

    Ok(applied)
}
