use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use newsrank_core::config::Config;
use newsrank_core::error::Error;
use newsrank_core::traits::Embedder;
use newsrank_core::types::{Article, RelevanceType};
use newsrank_embed::HashEmbedder;
use newsrank_text::{ArticleIndex, Tokenizer};
use newsrank_vector::{embed_articles, semantic_channel, CacheEntry, EmbeddingCache, NullChannel, RealChannel, SemanticChannel};

fn article(id: &str, title: &str, content: &str) -> Article {
    Article { id: id.into(), title: title.into(), content: content.into(), ..Article::default() }
}

fn index(articles: Vec<Article>) -> Arc<ArticleIndex> {
    Arc::new(ArticleIndex::build(articles, Tokenizer::default()).expect("index"))
}

fn corpus() -> Vec<Article> {
    vec![
        article("gpu", "GPU kernels", "fused attention kernels on gpu hardware"),
        article("fin", "Quarterly earnings", "cloud revenue grew in the quarter"),
    ]
}

struct CountingEmbedder {
    inner: HashEmbedder,
    calls: AtomicUsize,
}

impl Embedder for CountingEmbedder {
    fn embedder_id(&self) -> &str {
        self.inner.embedder_id()
    }
    fn dim(&self) -> usize {
        self.inner.dim()
    }
    fn embed_batch(&self, texts: &[String]) -> anyhow::Result<Vec<Vec<f32>>> {
        self.calls.fetch_add(texts.len(), Ordering::SeqCst);
        self.inner.embed_batch(texts)
    }
}

struct SlowEmbedder;

impl Embedder for SlowEmbedder {
    fn embedder_id(&self) -> &str {
        "slow"
    }
    fn dim(&self) -> usize {
        4
    }
    fn embed_batch(&self, texts: &[String]) -> anyhow::Result<Vec<Vec<f32>>> {
        std::thread::sleep(Duration::from_millis(300));
        Ok(texts.iter().map(|_| vec![1.0; 4]).collect())
    }
}

struct FailingEmbedder;

impl Embedder for FailingEmbedder {
    fn embedder_id(&self) -> &str {
        "failing"
    }
    fn dim(&self) -> usize {
        4
    }
    fn embed_batch(&self, _texts: &[String]) -> anyhow::Result<Vec<Vec<f32>>> {
        anyhow::bail!("provider quota exceeded")
    }
}

#[tokio::test]
async fn null_channel_is_always_empty() {
    let results = NullChannel.search(index(corpus()), "gpu kernels").await.expect("null");
    assert!(results.is_empty());
    assert!(!NullChannel.is_active());
}

#[tokio::test]
async fn real_channel_keeps_results_above_threshold() {
    let channel = RealChannel::new(Arc::new(HashEmbedder::new(512)), &Config::default());
    let results = channel.search(index(corpus()), "fused attention kernels on gpu").await.expect("semantic");
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].article_id, "gpu");
    assert_eq!(results[0].relevance_type, RelevanceType::Semantic);
    assert!(results[0].score > 0.3 && results[0].score <= 1.0);
}

#[tokio::test]
async fn precomputed_embeddings_take_precedence() {
    let embedder = HashEmbedder::new(64);
    let mut a = article("a", "unrelated title", "nothing in common");
    a.embedding = Some(embedder.embed_text("vector databases"));
    let channel = RealChannel::new(Arc::new(embedder), &Config::default());
    let results = channel.search(index(vec![a]), "vector databases").await.expect("semantic");
    assert_eq!(results.len(), 1);
    assert!((results[0].score - 1.0).abs() < 1e-5);
}

#[test]
fn cache_avoids_re_embedding_unchanged_articles() {
    let embedder = CountingEmbedder { inner: HashEmbedder::new(32), calls: AtomicUsize::new(0) };
    let cache = EmbeddingCache::new();
    let idx = index(corpus());
    let first = embed_articles(idx.articles(), &embedder, &cache, 1).expect("first");
    assert_eq!(first.len(), 2);
    assert_eq!(embedder.calls.load(Ordering::SeqCst), 2);
    assert_eq!(cache.len(), 2);

    let rebuilt = index(corpus());
    embed_articles(rebuilt.articles(), &embedder, &cache, 8).expect("second");
    assert_eq!(embedder.calls.load(Ordering::SeqCst), 2, "cache hit on identical content");
}

#[test]
fn rebuilding_with_a_disjoint_corpus_prunes_the_cache() {
    let channel = RealChannel::new(Arc::new(HashEmbedder::new(32)), &Config::default());
    channel.prepare(&index(corpus())).expect("prepare");
    assert_eq!(channel.cache().len(), 2);

    let other = vec![article("llm", "Open weights", "a new open weights language model")];
    channel.prepare(&index(other.clone())).expect("prepare");
    assert_eq!(channel.cache().len(), 1);

    // Entries of another embedder sharing the cache survive.
    channel.cache().put_many(vec![CacheEntry {
        content_hash: "elsewhere".into(),
        embedder_id: "other".into(),
        vector: vec![1.0; 4],
    }]);
    channel.prepare(&index(other)).expect("prepare");
    assert_eq!(channel.cache().len(), 2);
}

#[tokio::test]
async fn slow_provider_times_out_as_channel_unavailable() {
    let mut config = Config::default();
    config.semantic.timeout_ms = 20;
    let channel = RealChannel::new(Arc::new(SlowEmbedder), &config);
    let err = channel.search(index(corpus()), "gpu").await.unwrap_err();
    assert!(matches!(err, Error::ChannelUnavailable { channel: "semantic", ref reason } if reason.contains("timed out")));
}

#[tokio::test]
async fn provider_errors_surface_as_channel_unavailable() {
    let channel = RealChannel::new(Arc::new(FailingEmbedder), &Config::default());
    let err = channel.search(index(corpus()), "gpu").await.unwrap_err();
    assert!(matches!(err, Error::ChannelUnavailable { ref reason, .. } if reason.contains("quota")));
}

#[test]
fn channel_selection_follows_config_and_provider() {
    let mut config = Config::default();
    assert!(!semantic_channel(&config, None).is_active());
    assert!(semantic_channel(&config, Some(Arc::new(HashEmbedder::default()))).is_active());
    config.semantic.enabled = false;
    assert!(!semantic_channel(&config, Some(Arc::new(HashEmbedder::default()))).is_active());
}
