//! Approximate-nearest-neighbour vector search (spec.md §4.1).
//!
//! No ANN index is embedded in this workspace (no vector-index crate is
//! part of the inherited dependency stack, and adding one would mean
//! fabricating a backend this system was never wired to). This performs
//! an exact cosine-similarity scan over non-compacted, embedded records
//! above `min_decay`, which is correct but O(n) — documented as the
//! degrade path a production deployment would replace with a real ANN
//! index behind the same `vector_search` signature.

use rusqlite::{params, Connection};

use cortex_core::errors::CortexResult;

use crate::queries::memory_crud::blob_to_f32_vec;
use crate::to_storage_err;

pub fn vector_search(
    conn: &Connection,
    query_embedding: &[f32],
    k: usize,
    min_decay: f64,
) -> CortexResult<Vec<(i64, f64)>> {
    let mut stmt = conn
        .prepare(
            "SELECT id, embedding FROM memories
             WHERE compacted = 0 AND decay_factor >= ?1 AND embedding IS NOT NULL",
        )
        .map_err(|e| to_storage_err(e.to_string()))?;

    let rows = stmt
        .query_map(params![min_decay], |row| {
            let id: i64 = row.get(0)?;
            let blob: Vec<u8> = row.get(1)?;
            Ok((id, blob))
        })
        .map_err(|e| to_storage_err(e.to_string()))?;

    let mut scored: Vec<(i64, f64)> = Vec::new();
    for row in rows {
        let (id, blob) = row.map_err(|e| to_storage_err(e.to_string()))?;
        let embedding = blob_to_f32_vec(&blob);
        if embedding.len() != query_embedding.len() {
            continue;
        }
        scored.push((id, cosine_similarity(query_embedding, &embedding)));
    }

    scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
    scored.truncate(k);
    Ok(scored)
}

fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
    let mut dot = 0.0f64;
    let mut norm_a = 0.0f64;
    let mut norm_b = 0.0f64;
    for (x, y) in a.iter().zip(b.iter()) {
        dot += (*x as f64) * (*y as f64);
        norm_a += (*x as f64) * (*x as f64);
        norm_b += (*y as f64) * (*y as f64);
    }
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a.sqrt() * norm_b.sqrt())
}

#[cfg(test)]
mod tests {
    use super::cosine_similarity;

    #[test]
    fn identical_vectors_have_similarity_one() {
        let v = vec![1.0, 2.0, 3.0];
        assert!((cosine_similarity(&v, &v) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn orthogonal_vectors_have_similarity_zero() {
        let a = vec![1.0, 0.0];
        let b = vec![0.0, 1.0];
        assert!(cosine_similarity(&a, &b).abs() < 1e-9);
    }
}
