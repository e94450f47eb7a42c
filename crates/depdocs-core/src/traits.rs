use crate::types::{Record, SearchResult};
use crate::Result;

pub trait Embedder: Send + Sync {
    /// Stable identifier of the underlying model (e.g. `fake:d384`).
    fn model_id(&self) -> &str;
    /// Embed a single text into a fixed-length, L2-normalized vector.
    fn embed(&self, text: &str) -> Result<Vec<f32>>;

    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        texts.iter().map(|t| self.embed(t)).collect()
    }
}

/// Scores stored records against a query vector.
///
/// The exhaustive scan lives in `depdocs-vector`; an approximate index can
/// implement this trait without touching chunking, embedding or storage.
pub trait Ranker: Send + Sync {
    fn rank(
        &self,
        query_embedding: &[f32],
        records: &[Record],
        repository_filter: Option<&str>,
        top_k: usize,
    ) -> Result<Vec<SearchResult>>;
}
