//! Single write connection + small read pool, both WAL mode (spec.md §B
//! ambient stack). Readers round-robin across the pool; the single writer
//! serializes all mutations, which is what gives the store's per-id
//! ordering guarantee (spec.md §5).

use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};

use rusqlite::Connection;
use tokio::sync::Mutex;

use cortex_core::errors::CortexResult;

use crate::to_storage_err;

fn configure(conn: &Connection) -> CortexResult<()> {
    conn.pragma_update(None, "journal_mode", "WAL")
        .map_err(|e| to_storage_err(e.to_string()))?;
    conn.pragma_update(None, "synchronous", "NORMAL")
        .map_err(|e| to_storage_err(e.to_string()))?;
    conn.pragma_update(None, "foreign_keys", "ON")
        .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}

/// The sole connection through which writes are issued.
pub struct WriteConnection {
    inner: Mutex<Connection>,
}

impl WriteConnection {
    pub fn open(path: &str) -> CortexResult<Self> {
        let conn = if path == ":memory:" {
            Connection::open_in_memory()
        } else {
            Connection::open(Path::new(path))
        }
        .map_err(|e| to_storage_err(e.to_string()))?;
        configure(&conn)?;
        Ok(Self {
            inner: Mutex::new(conn),
        })
    }

    /// Run a synchronous closure against the write connection. The closure
    /// itself never awaits: query execution against an embedded SQLite
    /// file is fast enough that holding the lock across it is preferable
    /// to the bookkeeping of a dedicated writer task.
    pub async fn with_conn<T>(
        &self,
        f: impl FnOnce(&Connection) -> CortexResult<T>,
    ) -> CortexResult<T> {
        let conn = self.inner.lock().await;
        f(&conn)
    }
}

/// A small pool of read-only connections, round-robined by an atomic
/// cursor. Readers never block the writer and vice versa under WAL.
pub struct ReadPool {
    conns: Vec<Mutex<Connection>>,
    cursor: AtomicUsize,
}

impl ReadPool {
    pub fn open(path: &str, size: usize) -> CortexResult<Self> {
        let mut conns = Vec::with_capacity(size.max(1));
        for _ in 0..size.max(1) {
            let conn = if path == ":memory:" {
                // In-memory databases are not shared across connections by
                // default; callers that want a read pool against an
                // in-memory store should route reads through the writer
                // instead (see `SqliteStore::open_in_memory`).
                Connection::open_in_memory()
            } else {
                Connection::open(Path::new(path))
            }
            .map_err(|e| to_storage_err(e.to_string()))?;
            configure(&conn)?;
            conns.push(Mutex::new(conn));
        }
        Ok(Self {
            conns,
            cursor: AtomicUsize::new(0),
        })
    }

    pub async fn with_conn<T>(
        &self,
        f: impl FnOnce(&Connection) -> CortexResult<T>,
    ) -> CortexResult<T> {
        let idx = self.cursor.fetch_add(1, Ordering::Relaxed) % self.conns.len();
        let conn = self.conns[idx].lock().await;
        f(&conn)
    }
}
