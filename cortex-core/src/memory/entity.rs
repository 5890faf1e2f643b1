use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Entity kinds extracted from memory content (spec.md §3, §4.3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Person,
    Project,
    Concept,
    Token,
    Wallet,
    Location,
    Event,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Person => "person",
            EntityKind::Project => "project",
            EntityKind::Concept => "concept",
            EntityKind::Token => "token",
            EntityKind::Wallet => "wallet",
            EntityKind::Location => "location",
            EntityKind::Event => "event",
        }
    }

    pub fn from_str_opt(s: &str) -> Option<Self> {
        match s {
            "person" => Some(EntityKind::Person),
            "project" => Some(EntityKind::Project),
            "concept" => Some(EntityKind::Concept),
            "token" => Some(EntityKind::Token),
            "wallet" => Some(EntityKind::Wallet),
            "location" => Some(EntityKind::Location),
            "event" => Some(EntityKind::Event),
            _ => None,
        }
    }
}

/// A named, deduplicated entity mentioned across memory records.
/// Canonical-plus-kind is unique (spec.md §3).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entity {
    pub id: i64,
    pub kind: EntityKind,
    pub canonical_name: String,
    pub normalized_name: String,
    pub aliases: Vec<String>,
    pub description: Option<String>,
    pub mention_count: u64,
    pub first_seen: DateTime<Utc>,
    pub last_seen: DateTime<Utc>,
}

/// A record-to-entity link with a salience score and source offsets.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Mention {
    pub record_id: i64,
    pub entity_id: i64,
    pub salience: f64,
    pub offset_start: usize,
    pub offset_end: usize,
}

/// A directed edge between two entities, derived from co-occurrence or
/// explicit linking.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityRelation {
    pub source_id: i64,
    pub target_id: i64,
    pub kind: String,
    pub strength: f64,
}
