use async_trait::async_trait;

use crate::types::Entities;

/// Text embedding provider.
///
/// Implementations must return vectors of length `dim()` for a given
/// `embedder_id()`; the id keys the embedding cache.
pub trait Embedder: Send + Sync {
    fn embedder_id(&self) -> &str;
    fn dim(&self) -> usize;
    fn embed_batch(&self, texts: &[String]) -> anyhow::Result<Vec<Vec<f32>>>;

    /// Similarity in [-1,1]. Cosine unless overridden.
    fn similarity(&self, a: &[f32], b: &[f32]) -> f32 {
        cosine_similarity(a, b)
    }
}

pub trait EntityExtractor: Send + Sync {
    fn extract(&self, text: &str) -> anyhow::Result<Entities>;
}

/// External relevance model scoring `(article id, text)` pairs against a query.
/// Must return one score per candidate, in candidate order.
#[async_trait]
pub trait Reranker: Send + Sync {
    async fn rerank(&self, query: &str, candidates: &[(String, String)]) -> anyhow::Result<Vec<f64>>;
}

pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let (mut dot, mut na, mut nb) = (0f32, 0f32, 0f32);
    for (x, y) in a.iter().zip(b) {
        dot += x * y;
        na += x * x;
        nb += y * y;
    }
    let denom = na.sqrt() * nb.sqrt();
    if denom <= f32::EPSILON {
        0.0
    } else {
        (dot / denom).clamp(-1.0, 1.0)
    }
}
