/// Static hint tables used by the ingest pipeline's concept-inference and
/// importance-scoring steps (spec.md §4.2 step 2, §4.3 concept-pattern
/// table). Kept as plain slices rather than a crate dependency on a
/// stemmer/NLP library, matching this system's other pattern-based
/// extraction (see `cortex-graph`'s entity extractor).
const CONCEPT_LEXICON: &[(&str, &[&str])] = &[
    ("finance", &["price", "trade", "wallet", "token", "yield", "swap"]),
    ("security", &["exploit", "vulnerability", "breach", "key", "signature"]),
    ("planning", &["deadline", "milestone", "roadmap", "schedule"]),
    ("relationship", &["trust", "conflict", "agreement", "promise"]),
    ("technical", &["bug", "deploy", "build", "release", "regression"]),
];

pub fn concept_lexicon() -> &'static [(&'static str, &'static [&'static str])] {
    CONCEPT_LEXICON
}

/// Keyword weights nudging an observation's inferred importance score.
#[derive(Debug, Clone, Copy)]
pub struct ImportanceHints {
    pub high: &'static [&'static str],
    pub low: &'static [&'static str],
}

const IMPORTANCE_HINTS: ImportanceHints = ImportanceHints {
    high: &["critical", "urgent", "must", "breach", "failure", "deadline"],
    low: &["fyi", "minor", "trivial", "maybe", "someday"],
};

pub fn importance_hints() -> ImportanceHints {
    IMPORTANCE_HINTS
}
