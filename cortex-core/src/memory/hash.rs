use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};

use super::record::MemoryKind;

/// `clude-<8 hex>` where the digest is `SHA-256(kind || summary || createdAt)`
/// (spec.md §3). `created_at` is formatted RFC 3339 so the hash is stable
/// across serialization round-trips.
pub fn compute_hash_id(kind: MemoryKind, summary: &str, created_at: DateTime<Utc>) -> String {
    let mut hasher = Sha256::new();
    hasher.update(kind.as_str().as_bytes());
    hasher.update(summary.as_bytes());
    hasher.update(created_at.to_rfc3339().as_bytes());
    let digest = hasher.finalize();
    format!("clude-{}", hex_prefix(&digest, 4))
}

fn hex_prefix(bytes: &[u8], n: usize) -> String {
    bytes
        .iter()
        .take(n)
        .map(|b| format!("{:02x}", b))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_id_has_expected_shape() {
        let now = Utc::now();
        let id = compute_hash_id(MemoryKind::Episodic, "a test summary", now);
        assert!(id.starts_with("clude-"));
        assert_eq!(id.len(), "clude-".len() + 8);
    }

    #[test]
    fn hash_id_is_deterministic() {
        let now = Utc::now();
        let a = compute_hash_id(MemoryKind::Semantic, "same summary", now);
        let b = compute_hash_id(MemoryKind::Semantic, "same summary", now);
        assert_eq!(a, b);
    }

    #[test]
    fn hash_id_differs_by_kind() {
        let now = Utc::now();
        let a = compute_hash_id(MemoryKind::Episodic, "same summary", now);
        let b = compute_hash_id(MemoryKind::Semantic, "same summary", now);
        assert_ne!(a, b);
    }
}
