//! Grouping records by dominant concept, shared by the consolidation and
//! compaction phases (spec.md §4.8 phases 1 and 2).

use std::collections::HashMap;

use cortex_core::memory::MemoryRecord;

/// A record's dominant concept: its first listed concept, falling back to
/// its first tag, falling back to a catch-all bucket.
fn dominant_concept(record: &MemoryRecord) -> String {
    if let Some(concept) = record.concepts.first() {
        return concept.clone();
    }
    if let Some(tag) = record.tags.first() {
        return tag.clone();
    }
    "uncategorized".to_string()
}

/// Partitions `records` by [`dominant_concept`], preserving each group's
/// relative order of insertion.
pub fn group_by_dominant_concept(records: Vec<MemoryRecord>) -> Vec<(String, Vec<MemoryRecord>)> {
    let mut order: Vec<String> = Vec::new();
    let mut groups: HashMap<String, Vec<MemoryRecord>> = HashMap::new();

    for record in records {
        let key = dominant_concept(&record);
        if !groups.contains_key(&key) {
            order.push(key.clone());
        }
        groups.entry(key).or_default().push(record);
    }

    order
        .into_iter()
        .map(|key| {
            let members = groups.remove(&key).unwrap_or_default();
            (key, members)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use cortex_core::memory::MemoryKind;
    use serde_json::json;

    fn record(concepts: Vec<&str>, tags: Vec<&str>) -> MemoryRecord {
        let now = Utc::now();
        MemoryRecord {
            id: 0,
            hash_id: "clude-00000000".to_string(),
            kind: MemoryKind::Episodic,
            content: "x".to_string(),
            summary: "x".to_string(),
            tags: tags.into_iter().map(String::from).collect(),
            concepts: concepts.into_iter().map(String::from).collect(),
            valence: 0.0,
            importance: 0.5,
            access_count: 0,
            source: "test".to_string(),
            source_id: None,
            owner_id: None,
            wallet_id: None,
            metadata: json!({}),
            created_at: now,
            last_accessed: now,
            decay_factor: 1.0,
            evidence_ids: vec![],
            external_signature: None,
            compacted: false,
            compacted_into: None,
            embedding: None,
        }
    }

    #[test]
    fn groups_by_concept_before_tag() {
        let records = vec![record(vec!["rust"], vec![]), record(vec![], vec!["rust"])];
        let groups = group_by_dominant_concept(records);
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].0, "rust");
        assert_eq!(groups[0].1.len(), 2);
    }

    #[test]
    fn falls_back_to_uncategorized() {
        let groups = group_by_dominant_concept(vec![record(vec![], vec![])]);
        assert_eq!(groups[0].0, "uncategorized");
    }

    #[test]
    fn preserves_first_seen_order() {
        let records = vec![record(vec!["b"], vec![]), record(vec!["a"], vec![]), record(vec!["b"], vec![])];
        let groups = group_by_dominant_concept(records);
        assert_eq!(groups.iter().map(|(k, _)| k.as_str()).collect::<Vec<_>>(), vec!["b", "a"]);
    }
}
