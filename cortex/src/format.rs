//! Markdown context formatting (spec.md §6's `formatContext`): stable
//! output so prompts built from it are reproducible across calls.

use chrono::{DateTime, Utc};

use cortex_core::memory::{MemoryKind, MemoryRecord};

/// Trailing instruction appended verbatim to every rendered context block.
const TRAILING_INSTRUCTION: &str =
    "Use the memories above to stay consistent with what you have already said, \
     learned, and decided; do not contradict them without acknowledging the change.";

/// Renders a relative-age, per-kind markdown context block (spec.md §6):
/// `## Memory Recall`, per-kind subsections in fixed order, `- [age]
/// summary` bullets, and the trailing instruction line.
pub fn format_context(memories: &[MemoryRecord]) -> String {
    format_context_at(memories, Utc::now())
}

pub fn format_context_at(memories: &[MemoryRecord], now: DateTime<Utc>) -> String {
    let mut out = String::from("## Memory Recall\n");

    for (heading, kind) in [
        ("### Past Interactions", MemoryKind::Episodic),
        ("### Things You Know", MemoryKind::Semantic),
        ("### Behavioral Patterns", MemoryKind::Procedural),
        ("### Self-Observations", MemoryKind::SelfModel),
    ] {
        let section: Vec<&MemoryRecord> = memories.iter().filter(|m| m.kind == kind).collect();
        if section.is_empty() {
            continue;
        }
        out.push('\n');
        out.push_str(heading);
        out.push('\n');
        for record in section {
            out.push_str(&format!("- [{}] {}\n", relative_age(record.created_at, now), record.summary));
        }
    }

    out.push('\n');
    out.push_str(TRAILING_INSTRUCTION);
    out.push('\n');
    out
}

fn relative_age(created_at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let minutes = (now - created_at).num_minutes().max(0);
    if minutes < 1 {
        "just now".to_string()
    } else if minutes < 60 {
        format!("{minutes}m ago")
    } else if minutes < 60 * 24 {
        format!("{}h ago", minutes / 60)
    } else {
        format!("{}d ago", minutes / (60 * 24))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use serde_json::json;

    fn record(kind: MemoryKind, summary: &str, age_minutes: i64, now: DateTime<Utc>) -> MemoryRecord {
        let created_at = now - Duration::minutes(age_minutes);
        MemoryRecord {
            id: 1,
            hash_id: "clude-00000000".to_string(),
            kind,
            content: summary.to_string(),
            summary: summary.to_string(),
            tags: vec![],
            concepts: vec![],
            valence: 0.0,
            importance: 0.5,
            access_count: 0,
            source: "test".to_string(),
            source_id: None,
            owner_id: None,
            wallet_id: None,
            metadata: json!({}),
            created_at,
            last_accessed: created_at,
            decay_factor: 1.0,
            evidence_ids: vec![],
            external_signature: None,
            compacted: false,
            compacted_into: None,
            embedding: None,
        }
    }

    #[test]
    fn renders_sections_in_fixed_order_and_skips_empty_kinds() {
        let now = Utc::now();
        let memories = vec![
            record(MemoryKind::SelfModel, "reflects on growth", 10, now),
            record(MemoryKind::Episodic, "talked about the launch", 90, now),
        ];

        let rendered = format_context_at(&memories, now);

        assert!(rendered.starts_with("## Memory Recall\n"));
        let past_pos = rendered.find("### Past Interactions").unwrap();
        let self_pos = rendered.find("### Self-Observations").unwrap();
        assert!(past_pos < self_pos);
        assert!(!rendered.contains("### Things You Know"));
        assert!(!rendered.contains("### Behavioral Patterns"));
        assert!(rendered.contains("- [1h ago] talked about the launch"));
        assert!(rendered.ends_with(
            "Use the memories above to stay consistent with what you have already said, \
             learned, and decided; do not contradict them without acknowledging the change.\n"
        ));
    }

    #[test]
    fn empty_input_still_has_heading_and_instruction() {
        let rendered = format_context_at(&[], Utc::now());
        assert!(rendered.starts_with("## Memory Recall\n"));
        assert!(rendered.contains("Use the memories above"));
    }
}
