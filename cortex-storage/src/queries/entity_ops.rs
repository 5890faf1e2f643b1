//! Entity, mention, and co-occurrence CRUD (spec.md §4.1, §4.3).

use rusqlite::{params, Connection, OptionalExtension};

use cortex_core::errors::CortexResult;
use cortex_core::memory::{Entity, EntityKind, Mention};

use crate::to_storage_err;

/// Insert the entity if absent, otherwise return its existing id.
/// Returns `(id, created)`.
pub fn upsert_entity(
    conn: &Connection,
    kind: EntityKind,
    canonical_name: &str,
    normalized_name: &str,
) -> CortexResult<(i64, bool)> {
    let existing: Option<i64> = conn
        .query_row(
            "SELECT id FROM entities WHERE kind = ?1 AND normalized_name = ?2",
            params![kind.as_str(), normalized_name],
            |row| row.get(0),
        )
        .optional()
        .map_err(|e| to_storage_err(e.to_string()))?;

    if let Some(id) = existing {
        return Ok((id, false));
    }

    let now = chrono::Utc::now().to_rfc3339();
    conn.execute(
        "INSERT INTO entities (kind, canonical_name, normalized_name, aliases, description,
            mention_count, first_seen, last_seen)
         VALUES (?1, ?2, ?3, '[]', NULL, 0, ?4, ?4)",
        params![kind.as_str(), canonical_name, normalized_name, now],
    )
    .map_err(|e| to_storage_err(e.to_string()))?;

    Ok((conn.last_insert_rowid(), true))
}

pub fn get_entity(conn: &Connection, id: i64) -> CortexResult<Option<Entity>> {
    conn.query_row(
        "SELECT id, kind, canonical_name, normalized_name, aliases, description,
                mention_count, first_seen, last_seen
         FROM entities WHERE id = ?1",
        params![id],
        row_to_entity,
    )
    .optional()
    .map_err(|e| to_storage_err(e.to_string()))
}

pub fn increment_entity_mention(
    conn: &Connection,
    id: i64,
    at: chrono::DateTime<chrono::Utc>,
) -> CortexResult<()> {
    conn.execute(
        "UPDATE entities SET mention_count = mention_count + 1, last_seen = ?2 WHERE id = ?1",
        params![id, at.to_rfc3339()],
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}

pub fn insert_mention(conn: &Connection, mention: &Mention) -> CortexResult<()> {
    conn.execute(
        "INSERT INTO mentions (record_id, entity_id, salience, offset_start, offset_end)
         VALUES (?1, ?2, ?3, ?4, ?5)
         ON CONFLICT(record_id, entity_id) DO UPDATE SET salience = excluded.salience",
        params![
            mention.record_id,
            mention.entity_id,
            mention.salience,
            mention.offset_start as i64,
            mention.offset_end as i64,
        ],
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}

pub fn mentions_for_record(conn: &Connection, record_id: i64) -> CortexResult<Vec<Mention>> {
    let mut stmt = conn
        .prepare(
            "SELECT record_id, entity_id, salience, offset_start, offset_end
             FROM mentions WHERE record_id = ?1",
        )
        .map_err(|e| to_storage_err(e.to_string()))?;
    let rows = stmt
        .query_map(params![record_id], |row| {
            Ok(Mention {
                record_id: row.get(0)?,
                entity_id: row.get(1)?,
                salience: row.get(2)?,
                offset_start: row.get::<_, i64>(3)? as usize,
                offset_end: row.get::<_, i64>(4)? as usize,
            })
        })
        .map_err(|e| to_storage_err(e.to_string()))?;
    rows.collect::<Result<Vec<_>, _>>()
        .map_err(|e| to_storage_err(e.to_string()))
}

pub fn record_ids_for_entity(conn: &Connection, entity_id: i64) -> CortexResult<Vec<i64>> {
    let mut stmt = conn
        .prepare("SELECT record_id FROM mentions WHERE entity_id = ?1")
        .map_err(|e| to_storage_err(e.to_string()))?;
    let rows = stmt
        .query_map(params![entity_id], |row| row.get(0))
        .map_err(|e| to_storage_err(e.to_string()))?;
    rows.collect::<Result<Vec<_>, _>>()
        .map_err(|e| to_storage_err(e.to_string()))
}

/// Increment the symmetric co-occurrence counter for an unordered entity
/// pair (spec.md §4.3). Stored with `entity_a < entity_b` so the pair is
/// representation-unique.
pub fn record_cooccurrence(conn: &Connection, a: i64, b: i64) -> CortexResult<()> {
    if a == b {
        return Ok(());
    }
    let (lo, hi) = if a < b { (a, b) } else { (b, a) };
    conn.execute(
        "INSERT INTO entity_cooccurrence (entity_a, entity_b, count) VALUES (?1, ?2, 1)
         ON CONFLICT(entity_a, entity_b) DO UPDATE SET count = count + 1",
        params![lo, hi],
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}

pub fn cooccurrence_count(conn: &Connection, a: i64, b: i64) -> CortexResult<u64> {
    if a == b {
        return Ok(0);
    }
    let (lo, hi) = if a < b { (a, b) } else { (b, a) };
    let count: Option<i64> = conn
        .query_row(
            "SELECT count FROM entity_cooccurrence WHERE entity_a = ?1 AND entity_b = ?2",
            params![lo, hi],
            |row| row.get(0),
        )
        .optional()
        .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(count.unwrap_or(0) as u64)
}

/// Every entity that has co-occurred with `entity_id`, paired with its
/// count, in either column of the stored ordered pair.
pub fn cooccurring_entities(conn: &Connection, entity_id: i64) -> CortexResult<Vec<(i64, u64)>> {
    let mut stmt = conn
        .prepare(
            "SELECT entity_b, count FROM entity_cooccurrence WHERE entity_a = ?1
             UNION ALL
             SELECT entity_a, count FROM entity_cooccurrence WHERE entity_b = ?1",
        )
        .map_err(|e| to_storage_err(e.to_string()))?;
    let rows = stmt
        .query_map(params![entity_id], |row| {
            Ok((row.get::<_, i64>(0)?, row.get::<_, i64>(1)? as u64))
        })
        .map_err(|e| to_storage_err(e.to_string()))?;
    rows.collect::<Result<Vec<_>, _>>()
        .map_err(|e| to_storage_err(e.to_string()))
}

fn row_to_entity(row: &rusqlite::Row<'_>) -> rusqlite::Result<Entity> {
    let kind_str: String = row.get(1)?;
    let kind = EntityKind::from_str_opt(&kind_str).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            1,
            rusqlite::types::Type::Text,
            Box::new(std::io::Error::new(std::io::ErrorKind::InvalidData, "unknown entity kind")),
        )
    })?;
    let aliases_json: String = row.get(4)?;
    let first_seen_str: String = row.get(7)?;
    let last_seen_str: String = row.get(8)?;
    let parse_dt = |idx: usize, s: &str| -> rusqlite::Result<chrono::DateTime<chrono::Utc>> {
        chrono::DateTime::parse_from_rfc3339(s)
            .map(|dt| dt.with_timezone(&chrono::Utc))
            .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e)))
    };
    Ok(Entity {
        id: row.get(0)?,
        kind,
        canonical_name: row.get(2)?,
        normalized_name: row.get(3)?,
        aliases: serde_json::from_str(&aliases_json).unwrap_or_default(),
        description: row.get(5)?,
        mention_count: row.get::<_, i64>(6)? as u64,
        first_seen: parse_dt(7, &first_seen_str)?,
        last_seen: parse_dt(8, &last_seen_str)?,
    })
}
