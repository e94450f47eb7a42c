use std::cmp::Ordering;

use depdocs_core::traits::Ranker;
use depdocs_core::types::{Record, SearchResult};
use depdocs_core::{Error, Result};

/// Cosine similarity: dot product over the product of Euclidean norms.
///
/// Returns 0.0 when either vector has zero norm. Vectors of different
/// length are a dimension mismatch.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Result<f32> {
    if a.len() != b.len() {
        return Err(Error::DimensionMismatch { expected: a.len(), actual: b.len() });
    }
    let mut dot = 0f32;
    let mut norm_a = 0f32;
    let mut norm_b = 0f32;
    for (x, y) in a.iter().zip(b) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }
    if norm_a == 0.0 || norm_b == 0.0 {
        return Ok(0.0);
    }
    Ok(dot / (norm_a.sqrt() * norm_b.sqrt()))
}

/// Loose, case-sensitive substring match on repository URL or file path.
fn matches_filter(record: &Record, filter: &str) -> bool {
    record.metadata.repository_url.contains(filter) || record.metadata.file_path.contains(filter)
}

/// Scores every record; no index structure.
#[derive(Debug, Default, Clone, Copy)]
pub struct ExhaustiveRanker;

impl Ranker for ExhaustiveRanker {
    fn rank(
        &self,
        query_embedding: &[f32],
        records: &[Record],
        repository_filter: Option<&str>,
        top_k: usize,
    ) -> Result<Vec<SearchResult>> {
        let filter = repository_filter.filter(|f| !f.is_empty());
        let mut scored: Vec<(f32, &Record)> = Vec::with_capacity(records.len());
        for record in records {
            let score = cosine_similarity(query_embedding, &record.embedding)?;
            if filter.map_or(true, |f| matches_filter(record, f)) {
                scored.push((score, record));
            }
        }
        // sort_by is stable: equal scores keep insertion order.
        scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(Ordering::Equal));
        scored.truncate(top_k);
        Ok(scored.into_iter().map(|(score, record)| SearchResult::from_record(record, score)).collect())
    }
}
