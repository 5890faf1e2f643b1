use std::collections::HashSet;

use chrono::{DateTime, Utc};

use cortex_core::config::RetrievalConfig;

/// `1 / (1 + ageHours / 24)`, the canonical recency form spec.md §4.5
/// requires. `legacy` selects the documented `0.995^hours` variant
/// (spec.md §9 Open Question), kept as a configurable alternative rather
/// than the default.
pub fn recency(age_hours: f64, legacy: bool) -> f64 {
    if legacy {
        0.995f64.powf(age_hours)
    } else {
        1.0 / (1.0 + age_hours / 24.0)
    }
}

pub fn age_hours(created_at: DateTime<Utc>, now: DateTime<Utc>) -> f64 {
    (now - created_at).num_seconds().max(0) as f64 / 3600.0
}

/// `0.3 + 0.7 * min(1, keywordMatches / max(1, queryWords))`, or `0.5` with
/// no query text (spec.md §4.5).
pub fn relevance(query_words: &[String], summary: &str) -> f64 {
    if query_words.is_empty() {
        return 0.5;
    }
    let lower_summary = summary.to_lowercase();
    let matches = query_words
        .iter()
        .filter(|w| w.chars().count() > 2)
        .filter(|w| lower_summary.contains(w.to_lowercase().as_str()))
        .count();
    let denom = query_words.len().max(1) as f64;
    0.3 + 0.7 * (matches as f64 / denom).min(1.0)
}

/// `0.5 + 0.5 * (|requested ∩ record| / |requested|)`, or `0.5` if no tags
/// were requested (spec.md §4.5).
pub fn tag_score(requested: &[String], record_tags: &[String]) -> f64 {
    if requested.is_empty() {
        return 0.5;
    }
    let record_set: HashSet<&str> = record_tags.iter().map(String::as_str).collect();
    let overlap = requested.iter().filter(|t| record_set.contains(t.as_str())).count();
    0.5 + 0.5 * (overlap as f64 / requested.len() as f64)
}

/// Final composite score (spec.md §4.5 phase 4):
/// `(w_recency*recency + w_relevance*relevance + w_importance*importance
///   + w_vector*vectorScore + w_graph*graphBoost) * decayFactor * tagScore`.
#[allow(clippy::too_many_arguments)]
pub fn composite_score(
    config: &RetrievalConfig,
    recency: f64,
    relevance: f64,
    importance: f64,
    vector_score: f64,
    graph_boost: f64,
    decay_factor: f64,
    tag_score: f64,
) -> f64 {
    (config.weight_recency * recency
        + config.weight_relevance * relevance
        + config.weight_importance * importance
        + config.weight_vector * vector_score
        + config.weight_graph * graph_boost)
        * decay_factor
        * tag_score
}

pub fn query_words(query_text: Option<&str>) -> Vec<String> {
    query_text
        .map(|q| q.split_whitespace().map(str::to_lowercase).collect())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recency_is_one_at_zero_age() {
        assert!((recency(0.0, false) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn recency_decreases_with_age() {
        assert!(recency(48.0, false) < recency(1.0, false));
    }

    #[test]
    fn relevance_is_half_with_no_query() {
        assert_eq!(relevance(&[], "anything"), 0.5);
    }

    #[test]
    fn relevance_rewards_keyword_matches() {
        let words = vec!["rust".to_string(), "async".to_string()];
        assert!(relevance(&words, "notes on rust and async runtimes") > relevance(&words, "unrelated text"));
    }

    #[test]
    fn tag_score_full_overlap_is_one() {
        let requested = vec!["finance".to_string()];
        let record = vec!["finance".to_string()];
        assert!((tag_score(&requested, &record) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn tag_score_no_request_is_half() {
        assert_eq!(tag_score(&[], &["finance".to_string()]), 0.5);
    }
}
