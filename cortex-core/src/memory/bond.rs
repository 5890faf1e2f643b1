use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Bond kinds and their base weights (spec.md §3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BondKind {
    Supports,
    Contradicts,
    Elaborates,
    Causes,
    Follows,
    Relates,
    Resolves,
}

impl BondKind {
    pub fn base_weight(&self) -> f64 {
        match self {
            BondKind::Supports => 0.9,
            BondKind::Contradicts => 0.6,
            BondKind::Elaborates => 0.7,
            BondKind::Causes => 1.0,
            BondKind::Follows => 0.3,
            BondKind::Relates => 0.4,
            BondKind::Resolves => 0.8,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BondKind::Supports => "supports",
            BondKind::Contradicts => "contradicts",
            BondKind::Elaborates => "elaborates",
            BondKind::Causes => "causes",
            BondKind::Follows => "follows",
            BondKind::Relates => "relates",
            BondKind::Resolves => "resolves",
        }
    }

    pub fn from_str_opt(s: &str) -> Option<Self> {
        match s {
            "supports" => Some(BondKind::Supports),
            "contradicts" => Some(BondKind::Contradicts),
            "elaborates" => Some(BondKind::Elaborates),
            "causes" => Some(BondKind::Causes),
            "follows" => Some(BondKind::Follows),
            "relates" => Some(BondKind::Relates),
            "resolves" => Some(BondKind::Resolves),
            _ => None,
        }
    }

    /// Bond-traversal priority order for recall phase 6 (spec.md §4.5):
    /// `causes > supports > resolves > elaborates > contradicts > relates > follows`.
    pub fn traversal_priority(&self) -> u8 {
        match self {
            BondKind::Causes => 0,
            BondKind::Supports => 1,
            BondKind::Resolves => 2,
            BondKind::Elaborates => 3,
            BondKind::Contradicts => 4,
            BondKind::Relates => 5,
            BondKind::Follows => 6,
        }
    }

    pub fn all() -> [BondKind; 7] {
        [
            BondKind::Supports,
            BondKind::Contradicts,
            BondKind::Elaborates,
            BondKind::Causes,
            BondKind::Follows,
            BondKind::Relates,
            BondKind::Resolves,
        ]
    }
}

/// A directed, typed, weighted edge between two memory records (spec.md §3).
/// At most one bond of a given kind exists between any ordered pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bond {
    pub source_id: i64,
    pub target_id: i64,
    pub kind: BondKind,
    pub strength: f64,
    pub created_at: DateTime<Utc>,
}

impl Bond {
    pub fn new(source_id: i64, target_id: i64, kind: BondKind, strength: f64) -> Self {
        Self {
            source_id,
            target_id,
            kind,
            strength: strength.clamp(f64::EPSILON, 1.0),
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BondDirection {
    Outgoing,
    Incoming,
    Both,
}
