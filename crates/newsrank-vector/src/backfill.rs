use anyhow::{anyhow, Result};
use std::collections::HashMap;
use std::sync::Arc;

use newsrank_core::traits::Embedder;
use newsrank_core::types::{Article, ArticleId};

use crate::cache::{hash_content, CacheEntry, EmbeddingCache};

/// Vectors for every article: precomputed embeddings when their dimension
/// matches, otherwise cached or freshly embedded text in `batch_size` batches.
pub fn embed_articles<'a>(
    articles: impl IntoIterator<Item = &'a Article>,
    embedder: &dyn Embedder,
    cache: &EmbeddingCache,
    batch_size: usize,
) -> Result<HashMap<ArticleId, Arc<Vec<f32>>>> {
    let mut out = HashMap::new();
    let mut to_process: Vec<(ArticleId, String, String)> = Vec::new();
    for article in articles {
        match &article.embedding {
            Some(v) if v.len() == embedder.dim() => { out.insert(article.id.clone(), Arc::new(v.clone())); }
            _ => {
                let text = article.searchable_text();
                let chash = hash_content(&text);
                to_process.push((article.id.clone(), text, chash));
            }
        }
    }
    if to_process.is_empty() { return Ok(out); }

    let hashes: Vec<String> = to_process.iter().map(|(_, _, h)| h.clone()).collect();
    let cached = cache.get_many(embedder.embedder_id(), &hashes);
    let mut misses = Vec::new();
    for (id, text, h) in to_process {
        match cached.get(&h) {
            Some(v) => { out.insert(id, Arc::clone(v)); }
            None => misses.push((id, text, h)),
        }
    }

    let mut embedded = 0usize;
    for chunk in misses.chunks(batch_size.max(1)) {
        let texts: Vec<String> = chunk.iter().map(|(_, t, _)| t.clone()).collect();
        let vectors = embedder.embed_batch(&texts)?;
        if vectors.len() != chunk.len() {
            return Err(anyhow!("embedder returned {} vectors for {} texts", vectors.len(), chunk.len()));
        }
        let mut entries = Vec::with_capacity(chunk.len());
        for ((id, _, h), vector) in chunk.iter().zip(vectors) {
            out.insert(id.clone(), Arc::new(vector.clone()));
            entries.push(CacheEntry { content_hash: h.clone(), embedder_id: embedder.embedder_id().to_string(), vector });
        }
        cache.put_many(entries);
        embedded += chunk.len();
    }
    tracing::debug!(embedded, total = out.len(), "article embeddings ready");
    Ok(out)
}
