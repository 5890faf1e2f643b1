//! Bond CRUD. At most one bond per `(source_id, target_id, kind)`
//! (spec.md §3) — later creates update strength via `ON CONFLICT`.

use rusqlite::{params, Connection, OptionalExtension};

use cortex_core::errors::CortexResult;
use cortex_core::memory::{Bond, BondDirection, BondKind};

use crate::to_storage_err;

pub fn insert_bond(conn: &Connection, bond: &Bond) -> CortexResult<()> {
    conn.execute(
        "INSERT INTO bonds (source_id, target_id, kind, strength, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5)
         ON CONFLICT(source_id, target_id, kind) DO UPDATE SET strength = excluded.strength",
        params![
            bond.source_id,
            bond.target_id,
            bond.kind.as_str(),
            bond.strength,
            bond.created_at.to_rfc3339(),
        ],
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}

pub fn update_bond(conn: &Connection, bond: &Bond) -> CortexResult<()> {
    insert_bond(conn, bond)
}

pub fn get_bond(
    conn: &Connection,
    source_id: i64,
    target_id: i64,
    kind: BondKind,
) -> CortexResult<Option<Bond>> {
    conn.query_row(
        "SELECT source_id, target_id, kind, strength, created_at FROM bonds
         WHERE source_id = ?1 AND target_id = ?2 AND kind = ?3",
        params![source_id, target_id, kind.as_str()],
        row_to_bond,
    )
    .optional()
    .map_err(|e| to_storage_err(e.to_string()))
}

pub fn list_bonds(
    conn: &Connection,
    record_id: i64,
    direction: BondDirection,
) -> CortexResult<Vec<Bond>> {
    let sql = match direction {
        BondDirection::Outgoing => {
            "SELECT source_id, target_id, kind, strength, created_at FROM bonds WHERE source_id = ?1"
        }
        BondDirection::Incoming => {
            "SELECT source_id, target_id, kind, strength, created_at FROM bonds WHERE target_id = ?1"
        }
        BondDirection::Both => {
            "SELECT source_id, target_id, kind, strength, created_at FROM bonds
             WHERE source_id = ?1 OR target_id = ?1"
        }
    };
    let mut stmt = conn.prepare(sql).map_err(|e| to_storage_err(e.to_string()))?;
    let rows = stmt
        .query_map(params![record_id], row_to_bond)
        .map_err(|e| to_storage_err(e.to_string()))?;
    rows.collect::<Result<Vec<_>, _>>()
        .map_err(|e| to_storage_err(e.to_string()))
}

pub fn list_bonds_by_kind(conn: &Connection, kind: BondKind) -> CortexResult<Vec<Bond>> {
    let mut stmt = conn
        .prepare("SELECT source_id, target_id, kind, strength, created_at FROM bonds WHERE kind = ?1")
        .map_err(|e| to_storage_err(e.to_string()))?;
    let rows = stmt
        .query_map(params![kind.as_str()], row_to_bond)
        .map_err(|e| to_storage_err(e.to_string()))?;
    rows.collect::<Result<Vec<_>, _>>()
        .map_err(|e| to_storage_err(e.to_string()))
}

fn row_to_bond(row: &rusqlite::Row<'_>) -> rusqlite::Result<Bond> {
    let kind_str: String = row.get(2)?;
    let kind = BondKind::from_str_opt(&kind_str).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            2,
            rusqlite::types::Type::Text,
            Box::new(std::io::Error::new(std::io::ErrorKind::InvalidData, "unknown bond kind")),
        )
    })?;
    let created_at_str: String = row.get(4)?;
    let created_at = chrono::DateTime::parse_from_rfc3339(&created_at_str)
        .map(|dt| dt.with_timezone(&chrono::Utc))
        .map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(4, rusqlite::types::Type::Text, Box::new(e))
        })?;
    Ok(Bond {
        source_id: row.get(0)?,
        target_id: row.get(1)?,
        kind,
        strength: row.get(3)?,
        created_at,
    })
}
