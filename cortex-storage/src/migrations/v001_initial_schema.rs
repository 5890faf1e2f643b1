//! v001: memories, bonds, entities, mentions, entity_relations,
//! cooccurrence counters, dream_logs (spec.md §6 persistent schema).

use rusqlite::Connection;

use cortex_core::errors::CortexResult;

use crate::to_storage_err;

pub fn migrate(conn: &Connection) -> CortexResult<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS memories (
            id               INTEGER PRIMARY KEY AUTOINCREMENT,
            hash_id          TEXT NOT NULL UNIQUE,
            kind             TEXT NOT NULL,
            content          TEXT NOT NULL,
            summary          TEXT NOT NULL,
            tags             TEXT NOT NULL,
            concepts         TEXT NOT NULL,
            valence          REAL NOT NULL,
            importance       REAL NOT NULL,
            access_count     INTEGER NOT NULL DEFAULT 0,
            source           TEXT NOT NULL,
            source_id        TEXT,
            owner_id         TEXT,
            wallet_id        TEXT,
            metadata         TEXT NOT NULL,
            created_at       TEXT NOT NULL,
            last_accessed    TEXT NOT NULL,
            decay_factor     REAL NOT NULL DEFAULT 1.0,
            evidence_ids     TEXT NOT NULL,
            external_signature TEXT,
            compacted        INTEGER NOT NULL DEFAULT 0,
            compacted_into   TEXT,
            embedding        BLOB
        );

        CREATE INDEX IF NOT EXISTS idx_memories_kind ON memories(kind);
        CREATE INDEX IF NOT EXISTS idx_memories_owner ON memories(owner_id);
        CREATE INDEX IF NOT EXISTS idx_memories_created ON memories(created_at);
        CREATE INDEX IF NOT EXISTS idx_memories_last_accessed ON memories(last_accessed);
        CREATE INDEX IF NOT EXISTS idx_memories_decay ON memories(decay_factor);
        CREATE INDEX IF NOT EXISTS idx_memories_compacted ON memories(compacted);

        CREATE TABLE IF NOT EXISTS bonds (
            source_id  INTEGER NOT NULL,
            target_id  INTEGER NOT NULL,
            kind       TEXT NOT NULL,
            strength   REAL NOT NULL,
            created_at TEXT NOT NULL,
            PRIMARY KEY (source_id, target_id, kind),
            FOREIGN KEY (source_id) REFERENCES memories(id),
            FOREIGN KEY (target_id) REFERENCES memories(id)
        );

        CREATE INDEX IF NOT EXISTS idx_bonds_source ON bonds(source_id);
        CREATE INDEX IF NOT EXISTS idx_bonds_target ON bonds(target_id);
        CREATE INDEX IF NOT EXISTS idx_bonds_kind ON bonds(kind);

        CREATE TABLE IF NOT EXISTS entities (
            id              INTEGER PRIMARY KEY AUTOINCREMENT,
            kind            TEXT NOT NULL,
            canonical_name  TEXT NOT NULL,
            normalized_name TEXT NOT NULL,
            aliases         TEXT NOT NULL,
            description     TEXT,
            mention_count   INTEGER NOT NULL DEFAULT 0,
            first_seen      TEXT NOT NULL,
            last_seen       TEXT NOT NULL,
            UNIQUE(kind, normalized_name)
        );

        CREATE TABLE IF NOT EXISTS mentions (
            record_id    INTEGER NOT NULL,
            entity_id    INTEGER NOT NULL,
            salience     REAL NOT NULL,
            offset_start INTEGER NOT NULL,
            offset_end   INTEGER NOT NULL,
            PRIMARY KEY (record_id, entity_id),
            FOREIGN KEY (record_id) REFERENCES memories(id),
            FOREIGN KEY (entity_id) REFERENCES entities(id)
        );

        CREATE INDEX IF NOT EXISTS idx_mentions_entity ON mentions(entity_id);

        CREATE TABLE IF NOT EXISTS entity_relations (
            source_id INTEGER NOT NULL,
            target_id INTEGER NOT NULL,
            kind      TEXT NOT NULL,
            strength  REAL NOT NULL,
            PRIMARY KEY (source_id, target_id, kind)
        );

        CREATE TABLE IF NOT EXISTS entity_cooccurrence (
            entity_a INTEGER NOT NULL,
            entity_b INTEGER NOT NULL,
            count    INTEGER NOT NULL DEFAULT 0,
            PRIMARY KEY (entity_a, entity_b),
            CHECK (entity_a < entity_b)
        );

        CREATE TABLE IF NOT EXISTS dream_logs (
            id                 INTEGER PRIMARY KEY AUTOINCREMENT,
            session_id         TEXT NOT NULL,
            kind               TEXT NOT NULL,
            input_memory_ids   TEXT NOT NULL,
            output             TEXT NOT NULL,
            new_memory_ids     TEXT NOT NULL,
            started_at         TEXT NOT NULL,
            finished_at        TEXT,
            records_examined   INTEGER NOT NULL DEFAULT 0,
            records_affected   INTEGER NOT NULL DEFAULT 0,
            summary            TEXT,
            details            TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_dream_logs_kind ON dream_logs(kind);
        ",
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}
