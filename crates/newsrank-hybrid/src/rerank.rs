use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

use newsrank_core::config::Config;
use newsrank_core::error::{Error, Result};
use newsrank_core::traits::Reranker;
use newsrank_core::types::SearchResult;
use newsrank_text::ArticleIndex;

/// Characters of article text sent to the reranker per candidate.
const RERANK_TEXT_CHARS: usize = 2000;

#[async_trait]
pub trait RerankChannel: Send + Sync {
    fn is_active(&self) -> bool;

    /// Reordered copy of `results`. Errors are `ChannelUnavailable`.
    async fn rerank(&self, query: &str, results: &[SearchResult], index: &ArticleIndex) -> Result<Vec<SearchResult>>;
}

/// Keeps the fused order.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullRerankChannel;

#[async_trait]
impl RerankChannel for NullRerankChannel {
    fn is_active(&self) -> bool { false }

    async fn rerank(&self, _query: &str, results: &[SearchResult], _index: &ArticleIndex) -> Result<Vec<SearchResult>> {
        Ok(results.to_vec())
    }
}

pub struct RealRerankChannel {
    reranker: Arc<dyn Reranker>,
    timeout: Duration,
}

impl RealRerankChannel {
    pub fn new(reranker: Arc<dyn Reranker>, timeout: Duration) -> Self { Self { reranker, timeout } }
}

#[async_trait]
impl RerankChannel for RealRerankChannel {
    fn is_active(&self) -> bool { true }

    async fn rerank(&self, query: &str, results: &[SearchResult], index: &ArticleIndex) -> Result<Vec<SearchResult>> {
        if results.is_empty() { return Ok(Vec::new()); }
        let candidates: Vec<(String, String)> = results
            .iter()
            .map(|r| {
                let text = index
                    .article(&r.article_id)
                    .map(|a| a.searchable_text().chars().take(RERANK_TEXT_CHARS).collect::<String>())
                    .unwrap_or_default();
                (r.article_id.clone(), text)
            })
            .collect();

        let scores = match tokio::time::timeout(self.timeout, self.reranker.rerank(query, &candidates)).await {
            Ok(Ok(scores)) => scores,
            Ok(Err(e)) => return Err(Error::channel("rerank", e)),
            Err(_) => return Err(Error::channel("rerank", format!("timed out after {} ms", self.timeout.as_millis()))),
        };
        if scores.len() != results.len() {
            return Err(Error::channel("rerank", format!("expected {} scores, got {}", results.len(), scores.len())));
        }

        let mut reranked: Vec<(f64, SearchResult)> = results
            .iter()
            .zip(scores)
            .map(|(r, s)| {
                let score = if s.is_nan() { 0.0 } else { s.clamp(0.0, 1.0) };
                let mut r = r.clone();
                let fused = r.score;
                r.score = score;
                r.explanation.push_str(&format!("; reranked {fused:.3} -> {score:.3}"));
                (fused, r)
            })
            .collect();
        reranked.sort_by(|(fa, a), (fb, b)| {
            b.score.total_cmp(&a.score).then_with(|| fb.total_cmp(fa)).then_with(|| a.article_id.cmp(&b.article_id))
        });
        Ok(reranked.into_iter().map(|(_, r)| r).collect())
    }
}

/// `RealRerankChannel` when enabled and a reranker is injected, else `NullRerankChannel`.
pub fn rerank_channel(config: &Config, reranker: Option<Arc<dyn Reranker>>) -> Arc<dyn RerankChannel> {
    match reranker {
        Some(reranker) if config.rerank.enabled => {
            Arc::new(RealRerankChannel::new(reranker, Duration::from_millis(config.rerank.timeout_ms)))
        }
        _ => Arc::new(NullRerankChannel),
    }
}
