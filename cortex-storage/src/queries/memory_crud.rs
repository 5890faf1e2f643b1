//! Insert, update, get, and candidate-query for memory records.

use rusqlite::{params, Connection, OptionalExtension};

use cortex_core::errors::{CortexResult, StorageError};
use cortex_core::memory::{CandidateQuery, MemoryKind, MemoryRecord, RecordPatch};

use crate::to_storage_err;

pub fn insert_record(conn: &Connection, record: &MemoryRecord) -> CortexResult<i64> {
    let existing = get_by_hash(conn, &record.hash_id)?;
    if let Some(existing) = existing {
        return Err(StorageError::Conflict {
            hash_id: record.hash_id.clone(),
            existing_id: existing.id,
        }
        .into());
    }

    let tags_json = serde_json::to_string(&record.tags).map_err(|e| to_storage_err(e.to_string()))?;
    let concepts_json =
        serde_json::to_string(&record.concepts).map_err(|e| to_storage_err(e.to_string()))?;
    let metadata_json =
        serde_json::to_string(&record.metadata).map_err(|e| to_storage_err(e.to_string()))?;
    let evidence_json =
        serde_json::to_string(&record.evidence_ids).map_err(|e| to_storage_err(e.to_string()))?;
    let embedding_blob = record.embedding.as_ref().map(|v| f32_vec_to_blob(v));

    conn.execute(
        "INSERT INTO memories (
            hash_id, kind, content, summary, tags, concepts, valence, importance,
            access_count, source, source_id, owner_id, wallet_id, metadata,
            created_at, last_accessed, decay_factor, evidence_ids,
            external_signature, compacted, compacted_into, embedding
        ) VALUES (
            ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14,
            ?15, ?16, ?17, ?18, ?19, ?20, ?21, ?22
        )",
        params![
            record.hash_id,
            record.kind.as_str(),
            record.content,
            record.summary,
            tags_json,
            concepts_json,
            record.valence,
            record.importance,
            record.access_count as i64,
            record.source,
            record.source_id,
            record.owner_id,
            record.wallet_id,
            metadata_json,
            record.created_at.to_rfc3339(),
            record.last_accessed.to_rfc3339(),
            record.decay_factor,
            evidence_json,
            record.external_signature,
            record.compacted as i32,
            record.compacted_into,
            embedding_blob,
        ],
    )
    .map_err(|e| to_storage_err(e.to_string()))?;

    Ok(conn.last_insert_rowid())
}

pub fn update_record(conn: &Connection, id: i64, patch: &RecordPatch) -> CortexResult<()> {
    let mut existing = get_record(conn, id)?.ok_or(StorageError::NotFound { id })?;

    if let Some(v) = patch.access_count {
        existing.access_count = v;
    }
    if let Some(v) = patch.last_accessed {
        existing.last_accessed = v;
    }
    if let Some(v) = patch.decay_factor {
        existing.decay_factor = v;
    }
    if let Some(v) = patch.compacted {
        existing.compacted = v;
    }
    if patch.compacted_into.is_some() {
        existing.compacted_into = patch.compacted_into.clone();
    }
    if patch.external_signature.is_some() {
        existing.external_signature = patch.external_signature.clone();
    }
    if patch.embedding.is_some() {
        existing.embedding = patch.embedding.clone();
    }
    existing.clamp_invariants();

    let embedding_blob = existing.embedding.as_ref().map(|v| f32_vec_to_blob(v));

    let rows = conn
        .execute(
            "UPDATE memories SET
                access_count = ?2, last_accessed = ?3, decay_factor = ?4,
                compacted = ?5, compacted_into = ?6, external_signature = ?7,
                embedding = ?8
             WHERE id = ?1",
            params![
                id,
                existing.access_count as i64,
                existing.last_accessed.to_rfc3339(),
                existing.decay_factor,
                existing.compacted as i32,
                existing.compacted_into,
                existing.external_signature,
                embedding_blob,
            ],
        )
        .map_err(|e| to_storage_err(e.to_string()))?;

    if rows == 0 {
        return Err(StorageError::NotFound { id }.into());
    }
    Ok(())
}

pub fn get_record(conn: &Connection, id: i64) -> CortexResult<Option<MemoryRecord>> {
    conn.query_row(&format!("{} WHERE id = ?1", SELECT_ALL), params![id], row_to_record)
        .optional()
        .map_err(|e| to_storage_err(e.to_string()))
}

pub fn get_by_hash(conn: &Connection, hash_id: &str) -> CortexResult<Option<MemoryRecord>> {
    conn.query_row(
        &format!("{} WHERE hash_id = ?1", SELECT_ALL),
        params![hash_id],
        row_to_record,
    )
    .optional()
    .map_err(|e| to_storage_err(e.to_string()))
}

pub fn fetch_recent(
    conn: &Connection,
    window_hours: i64,
    kinds: Option<&[MemoryKind]>,
    limit: usize,
) -> CortexResult<Vec<MemoryRecord>> {
    let cutoff = (chrono::Utc::now() - chrono::Duration::hours(window_hours)).to_rfc3339();
    let mut sql = format!("{} WHERE created_at >= ?1 AND compacted = 0", SELECT_ALL);
    if let Some(kinds) = kinds {
        if !kinds.is_empty() {
            let list = kinds
                .iter()
                .map(|k| format!("'{}'", k.as_str()))
                .collect::<Vec<_>>()
                .join(",");
            sql.push_str(&format!(" AND kind IN ({list})"));
        }
    }
    sql.push_str(" ORDER BY created_at DESC LIMIT ?2");

    let mut stmt = conn.prepare(&sql).map_err(|e| to_storage_err(e.to_string()))?;
    let rows = stmt
        .query_map(params![cutoff, limit as i64], row_to_record)
        .map_err(|e| to_storage_err(e.to_string()))?;
    rows.collect::<Result<Vec<_>, _>>()
        .map_err(|e| to_storage_err(e.to_string()))
}

/// The recall pre-filter (spec.md §4.1): kinds/owner/tag/decay/importance
/// filters, ordered by `(importance DESC, created_at DESC)`, over-fetched
/// 3x by the caller (`spec.limit`, already multiplied, is passed in here).
pub fn query_candidates(conn: &Connection, spec: &CandidateQuery) -> CortexResult<Vec<MemoryRecord>> {
    let mut sql = format!("{} WHERE compacted = 0", SELECT_ALL);
    let min_decay = spec.min_decay.unwrap_or(0.1);
    sql.push_str(&format!(" AND decay_factor >= {min_decay}"));

    if let Some(min_importance) = spec.min_importance {
        sql.push_str(&format!(" AND importance >= {min_importance}"));
    }
    if let Some(kinds) = &spec.kinds {
        if !kinds.is_empty() {
            let list = kinds
                .iter()
                .map(|k| format!("'{}'", k.as_str()))
                .collect::<Vec<_>>()
                .join(",");
            sql.push_str(&format!(" AND kind IN ({list})"));
        }
    }
    if let Some(owner_id) = &spec.owner_id {
        sql.push_str(&format!(" AND owner_id = '{}'", owner_id.replace('\'', "''")));
    }
    if let Some(wallet_id) = &spec.wallet_id {
        sql.push_str(&format!(" AND wallet_id = '{}'", wallet_id.replace('\'', "''")));
    }
    if let Some(after) = spec.created_after {
        sql.push_str(&format!(" AND created_at >= '{}'", after.to_rfc3339()));
    }
    if let Some(before) = spec.created_before {
        sql.push_str(&format!(" AND created_at <= '{}'", before.to_rfc3339()));
    }
    sql.push_str(" ORDER BY importance DESC, created_at DESC");
    if let Some(limit) = spec.limit {
        sql.push_str(&format!(" LIMIT {limit}"));
    }

    let mut stmt = conn.prepare(&sql).map_err(|e| to_storage_err(e.to_string()))?;
    let rows = stmt
        .query_map([], row_to_record)
        .map_err(|e| to_storage_err(e.to_string()))?;
    let mut out = Vec::new();
    for row in rows {
        out.push(row.map_err(|e| to_storage_err(e.to_string()))?);
    }
    if let Some(tags) = &spec.tags {
        if !tags.is_empty() {
            out.retain(|r| tags.iter().any(|t| r.tags.contains(t)));
        }
    }
    Ok(out)
}

pub(crate) fn f32_vec_to_blob(v: &[f32]) -> Vec<u8> {
    let mut out = Vec::with_capacity(v.len() * 4);
    for f in v {
        out.extend_from_slice(&f.to_le_bytes());
    }
    out
}

pub(crate) fn blob_to_f32_vec(blob: &[u8]) -> Vec<f32> {
    blob.chunks_exact(4)
        .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect()
}

const SELECT_ALL: &str = "SELECT id, hash_id, kind, content, summary, tags, concepts, valence,
    importance, access_count, source, source_id, owner_id, wallet_id, metadata,
    created_at, last_accessed, decay_factor, evidence_ids, external_signature,
    compacted, compacted_into, embedding FROM memories";

fn bad_column(idx: usize, e: impl std::error::Error + Send + Sync + 'static) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
}

fn row_to_record(row: &rusqlite::Row<'_>) -> rusqlite::Result<MemoryRecord> {
    let kind_str: String = row.get(2)?;
    let kind = MemoryKind::from_str_opt(&kind_str).ok_or_else(|| {
        bad_column(2, std::io::Error::new(std::io::ErrorKind::InvalidData, "unknown memory kind"))
    })?;
    let tags_json: String = row.get(5)?;
    let concepts_json: String = row.get(6)?;
    let metadata_json: String = row.get(14)?;
    let evidence_json: String = row.get(18)?;
    let created_at_str: String = row.get(15)?;
    let last_accessed_str: String = row.get(16)?;
    let embedding_blob: Option<Vec<u8>> = row.get(22)?;

    let parse_dt = |idx: usize, s: &str| -> rusqlite::Result<chrono::DateTime<chrono::Utc>> {
        chrono::DateTime::parse_from_rfc3339(s)
            .map(|dt| dt.with_timezone(&chrono::Utc))
            .map_err(|e| bad_column(idx, e))
    };

    Ok(MemoryRecord {
        id: row.get(0)?,
        hash_id: row.get(1)?,
        kind,
        content: row.get(3)?,
        summary: row.get(4)?,
        tags: serde_json::from_str(&tags_json).map_err(|e| bad_column(5, e))?,
        concepts: serde_json::from_str(&concepts_json).map_err(|e| bad_column(6, e))?,
        valence: row.get(7)?,
        importance: row.get(8)?,
        access_count: row.get::<_, i64>(9)? as u64,
        source: row.get(10)?,
        source_id: row.get(11)?,
        owner_id: row.get(12)?,
        wallet_id: row.get(13)?,
        metadata: serde_json::from_str(&metadata_json).map_err(|e| bad_column(14, e))?,
        created_at: parse_dt(15, &created_at_str)?,
        last_accessed: parse_dt(16, &last_accessed_str)?,
        decay_factor: row.get(17)?,
        evidence_ids: serde_json::from_str(&evidence_json).map_err(|e| bad_column(18, e))?,
        external_signature: row.get(19)?,
        compacted: row.get::<_, i32>(20)? != 0,
        compacted_into: row.get(21)?,
        embedding: embedding_blob.map(|b| blob_to_f32_vec(&b)),
    })
}
