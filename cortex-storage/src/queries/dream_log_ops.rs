//! Dream-cycle audit log CRUD (spec.md §3, §4.8).

use rusqlite::{params, Connection};

use cortex_core::errors::CortexResult;
use cortex_core::memory::{DreamLog, DreamSessionKind};

use crate::to_storage_err;

pub fn insert_dream_log(conn: &Connection, log: &DreamLog) -> CortexResult<i64> {
    let input_ids = serde_json::to_string(&log.input_memory_ids).map_err(|e| to_storage_err(e.to_string()))?;
    let new_ids = serde_json::to_string(&log.new_memory_ids).map_err(|e| to_storage_err(e.to_string()))?;
    let details = serde_json::to_string(&log.details).map_err(|e| to_storage_err(e.to_string()))?;

    conn.execute(
        "INSERT INTO dream_logs (
            session_id, kind, input_memory_ids, output, new_memory_ids,
            started_at, finished_at, records_examined, records_affected, summary, details
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
        params![
            log.session_id,
            log.kind.as_str(),
            input_ids,
            log.output,
            new_ids,
            log.started_at.to_rfc3339(),
            log.finished_at.map(|t| t.to_rfc3339()),
            log.records_examined as i64,
            log.records_affected as i64,
            log.summary,
            details,
        ],
    )
    .map_err(|e| to_storage_err(e.to_string()))?;

    Ok(conn.last_insert_rowid())
}

pub fn finish_dream_log(
    conn: &Connection,
    id: i64,
    finished_at: chrono::DateTime<chrono::Utc>,
    records_examined: u64,
    records_affected: u64,
    summary: Option<String>,
) -> CortexResult<()> {
    conn.execute(
        "UPDATE dream_logs SET finished_at = ?2, records_examined = ?3, records_affected = ?4, summary = ?5
         WHERE id = ?1",
        params![
            id,
            finished_at.to_rfc3339(),
            records_examined as i64,
            records_affected as i64,
            summary,
        ],
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}

#[allow(dead_code)]
fn row_to_kind(s: &str) -> Option<DreamSessionKind> {
    DreamSessionKind::from_str_opt(s)
}
