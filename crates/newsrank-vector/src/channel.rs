use anyhow::anyhow;
use async_trait::async_trait;
use std::collections::{BTreeSet, HashSet};
use std::sync::Arc;
use std::time::Duration;

use newsrank_core::config::Config;
use newsrank_core::error::{Error, Result};
use newsrank_core::traits::Embedder;
use newsrank_core::types::{RelevanceType, SearchResult};
use newsrank_text::ArticleIndex;

use crate::backfill::embed_articles;
use crate::cache::{hash_content, EmbeddingCache};

const EMBED_BATCH_SIZE: usize = 64;

/// Semantic retrieval as seen by the orchestrator.
///
/// Errors are `ChannelUnavailable`; callers recover with an empty result.
#[async_trait]
pub trait SemanticChannel: Send + Sync {
    fn is_active(&self) -> bool;

    /// Warm embeddings for a freshly built index.
    fn prepare(&self, _index: &ArticleIndex) -> Result<()> { Ok(()) }

    async fn search(&self, index: Arc<ArticleIndex>, query: &str) -> Result<Vec<SearchResult>>;
}

/// Used when no embedder is configured: always empty, never fails.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullChannel;

#[async_trait]
impl SemanticChannel for NullChannel {
    fn is_active(&self) -> bool { false }

    async fn search(&self, _index: Arc<ArticleIndex>, _query: &str) -> Result<Vec<SearchResult>> { Ok(Vec::new()) }
}

pub struct RealChannel {
    embedder: Arc<dyn Embedder>,
    cache: Arc<EmbeddingCache>,
    threshold: f64,
    timeout: Duration,
}

impl RealChannel {
    pub fn new(embedder: Arc<dyn Embedder>, config: &Config) -> Self {
        Self {
            embedder,
            cache: Arc::new(EmbeddingCache::new()),
            threshold: config.search.semantic_threshold,
            timeout: Duration::from_millis(config.semantic.timeout_ms),
        }
    }

    pub fn with_cache(mut self, cache: Arc<EmbeddingCache>) -> Self {
        self.cache = cache;
        self
    }

    pub fn cache(&self) -> &Arc<EmbeddingCache> { &self.cache }
}

#[async_trait]
impl SemanticChannel for RealChannel {
    fn is_active(&self) -> bool { true }

    /// Prunes cache entries for articles no longer indexed, then embeds the rest.
    fn prepare(&self, index: &ArticleIndex) -> Result<()> {
        let live: HashSet<String> = index.articles().map(|a| hash_content(&a.searchable_text())).collect();
        let pruned = self.cache.retain_hashes(self.embedder.embedder_id(), &live);
        if pruned > 0 {
            tracing::debug!(pruned, cached = self.cache.len(), "embedding cache pruned");
        }
        embed_articles(index.articles(), self.embedder.as_ref(), &self.cache, EMBED_BATCH_SIZE)
            .map(|_| ())
            .map_err(|e| Error::channel("semantic", e))
    }

    async fn search(&self, index: Arc<ArticleIndex>, query: &str) -> Result<Vec<SearchResult>> {
        let embedder = Arc::clone(&self.embedder);
        let cache = Arc::clone(&self.cache);
        let query = query.to_string();
        let threshold = self.threshold;
        let task = tokio::task::spawn_blocking(move || score(embedder.as_ref(), &cache, &index, &query, threshold));
        match tokio::time::timeout(self.timeout, task).await {
            Ok(Ok(Ok(results))) => Ok(results),
            Ok(Ok(Err(e))) => Err(Error::channel("semantic", e)),
            Ok(Err(join)) => Err(Error::channel("semantic", join)),
            Err(_) => Err(Error::channel("semantic", format!("timed out after {} ms", self.timeout.as_millis()))),
        }
    }
}

fn score(
    embedder: &dyn Embedder,
    cache: &EmbeddingCache,
    index: &ArticleIndex,
    query: &str,
    threshold: f64,
) -> anyhow::Result<Vec<SearchResult>> {
    let query_vec = embedder
        .embed_batch(&[query.to_string()])?
        .pop()
        .ok_or_else(|| anyhow!("embedder returned no vector for the query"))?;
    let vectors = embed_articles(index.articles(), embedder, cache, EMBED_BATCH_SIZE)?;

    let mut results: Vec<SearchResult> = index
        .articles()
        .filter_map(|article| {
            let v = vectors.get(&article.id)?;
            let sim = f64::from(embedder.similarity(&query_vec, v));
            (sim > threshold).then(|| SearchResult {
                article_id: article.id.clone(),
                score: sim.clamp(0.0, 1.0),
                relevance_type: RelevanceType::Semantic,
                matched_terms: BTreeSet::new(),
                explanation: format!("Semantic similarity: {sim:.3}"),
            })
        })
        .collect();
    results.sort_by(|a, b| b.score.total_cmp(&a.score).then_with(|| a.article_id.cmp(&b.article_id)));
    tracing::debug!(query, hits = results.len(), "semantic channel");
    Ok(results)
}

/// `RealChannel` when enabled and an embedder is available, else `NullChannel`.
pub fn semantic_channel(config: &Config, embedder: Option<Arc<dyn Embedder>>) -> Arc<dyn SemanticChannel> {
    match embedder {
        Some(embedder) if config.semantic.enabled => Arc::new(RealChannel::new(embedder, config)),
        Some(_) => {
            tracing::info!("semantic channel disabled by configuration");
            Arc::new(NullChannel)
        }
        None => Arc::new(NullChannel),
    }
}
