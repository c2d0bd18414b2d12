use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::cmp::Ordering;
use std::sync::Arc;

use newsrank_core::config::Config;
use newsrank_core::error::{Error, Result};
use newsrank_core::traits::{Embedder, EntityExtractor, Reranker};
use newsrank_core::types::{
    Article, EvaluationResult, Persona, RankedArticle, SearchFilters, SearchResult, TopicCount,
};
use newsrank_embed::RuleBasedProvider;
use newsrank_eval::MultiLayerEvaluator;
use newsrank_text::{ArticleIndex, Bm25Params, EntityRetriever, KeywordRetriever, Tokenizer};
use newsrank_vector::{semantic_channel, SemanticChannel};

use crate::boost::apply_persona_boosts;
use crate::filters::apply_filters;
use crate::fusion::{fuse, ChannelHits};
use crate::rerank::{rerank_channel, RerankChannel};
use crate::topics::trending_topics;

/// Drives corpus ranking and query answering over one shared index.
///
/// The index is rebuilt off-lock by [`RankingEngine::index_articles`] and
/// published with a pointer swap; queries work on the snapshot they started with.
pub struct RankingEngine {
    config: Arc<Config>,
    tokenizer: Tokenizer,
    keyword: KeywordRetriever,
    entity: EntityRetriever,
    semantic: Arc<dyn SemanticChannel>,
    rerank: Arc<dyn RerankChannel>,
    evaluator: MultiLayerEvaluator,
    index: RwLock<Option<Arc<ArticleIndex>>>,
}

pub struct RankingEngineBuilder {
    config: Arc<Config>,
    embedder: Option<Arc<dyn Embedder>>,
    extractor: Option<Arc<dyn EntityExtractor>>,
    reranker: Option<Arc<dyn Reranker>>,
}

impl RankingEngineBuilder {
    pub fn embedder(mut self, embedder: Arc<dyn Embedder>) -> Self {
        self.embedder = Some(embedder);
        self
    }

    pub fn entity_extractor(mut self, extractor: Arc<dyn EntityExtractor>) -> Self {
        self.extractor = Some(extractor);
        self
    }

    pub fn reranker(mut self, reranker: Arc<dyn Reranker>) -> Self {
        self.reranker = Some(reranker);
        self
    }

    /// Use the rule-based provider for both entities and embeddings.
    pub fn rule_based(self) -> Self {
        let provider = Arc::new(RuleBasedProvider::from_config(&self.config));
        self.embedder(provider.clone()).entity_extractor(provider)
    }

    pub fn build(self) -> Result<RankingEngine> {
        self.config.validate()?;
        let config = self.config;
        let extractor: Arc<dyn EntityExtractor> = match self.extractor {
            Some(extractor) => extractor,
            None => Arc::new(RuleBasedProvider::from_config(&config)),
        };
        let semantic = semantic_channel(&config, self.embedder);
        let rerank = rerank_channel(&config, self.reranker);
        tracing::debug!(semantic = semantic.is_active(), rerank = rerank.is_active(), "ranking engine channels");
        Ok(RankingEngine {
            tokenizer: Tokenizer::new(config.search.min_token_len),
            keyword: KeywordRetriever::new(Bm25Params::from(&config.search)),
            entity: EntityRetriever::new(extractor, config.search.entity_score),
            semantic,
            rerank,
            evaluator: MultiLayerEvaluator::new(Arc::clone(&config)),
            index: RwLock::new(None),
            config,
        })
    }
}

impl RankingEngine {
    pub fn builder(config: Arc<Config>) -> RankingEngineBuilder {
        RankingEngineBuilder { config, embedder: None, extractor: None, reranker: None }
    }

    /// Keyword and rule-based entity channels only.
    pub fn new(config: Arc<Config>) -> Result<Self> { Self::builder(config).build() }

    pub fn config(&self) -> &Config { &self.config }

    pub fn evaluator(&self) -> &MultiLayerEvaluator { &self.evaluator }

    /// Build a new index and swap it in. On error the previous index stays.
    pub fn index_articles(&self, articles: Vec<Article>) -> Result<()> {
        let index = ArticleIndex::build(articles, self.tokenizer.clone())?;
        if let Err(e) = self.semantic.prepare(&index) {
            tracing::warn!(error = %e, "semantic warm-up failed; embeddings will be computed per query");
        }
        let (articles, terms) = (index.len(), index.term_count());
        *self.index.write() = Some(Arc::new(index));
        tracing::info!(articles, terms, "article index swapped in");
        Ok(())
    }

    pub fn is_indexed(&self) -> bool { self.index.read().is_some() }

    fn snapshot(&self) -> Result<Arc<ArticleIndex>> {
        self.index.read().as_ref().map(Arc::clone).ok_or(Error::IndexNotBuilt)
    }

    pub fn evaluate(&self, article: &Article, persona: &str) -> Result<EvaluationResult> {
        self.evaluator.evaluate(article, persona)
    }

    /// Evaluate and store the result in the article's evaluation map.
    pub fn evaluate_cached(&self, article: &mut Article, persona: &str) -> Result<EvaluationResult> {
        let result = self.evaluator.evaluate(article, persona)?;
        article.evaluation.insert(result.persona, result.clone());
        Ok(result)
    }

    pub fn rank_corpus(&self, articles: &[Article], persona: &str) -> Result<Vec<RankedArticle>> {
        self.rank_corpus_at(articles, persona, Utc::now())
    }

    /// Sorted by total score desc, then newest first (undated last), then id asc.
    pub fn rank_corpus_at(&self, articles: &[Article], persona: &str, now: DateTime<Utc>) -> Result<Vec<RankedArticle>> {
        let persona: Persona = persona.parse()?;
        let evaluations = self.evaluator.evaluate_many(articles, persona, now);
        let mut ranked: Vec<RankedArticle> = articles
            .iter()
            .zip(evaluations)
            .map(|(a, evaluation)| RankedArticle { article_id: a.id.clone(), published_date: a.published_date, evaluation })
            .collect();
        ranked.sort_by(|a, b| {
            b.evaluation
                .total_score
                .total_cmp(&a.evaluation.total_score)
                .then_with(|| match (a.published_date, b.published_date) {
                    (Some(da), Some(db)) => db.cmp(&da),
                    (Some(_), None) => Ordering::Less,
                    (None, Some(_)) => Ordering::Greater,
                    (None, None) => Ordering::Equal,
                })
                .then_with(|| a.article_id.cmp(&b.article_id))
        });
        tracing::info!(persona = %persona, articles = ranked.len(), "corpus ranked");
        Ok(ranked)
    }

    /// Retrieve, fuse, boost, filter, truncate to `search_top_k`, rerank,
    /// truncate to `rerank_top_k`.
    pub async fn search(&self, query: &str, filters: Option<&SearchFilters>, persona: Option<&str>) -> Result<Vec<SearchResult>> {
        let persona = persona.map(str::parse::<Persona>).transpose()?;
        self.validate_query(query)?;
        let index = self.snapshot()?;
        let results = self.run_search(&index, query, filters, persona, self.config.search.rerank_top_k).await;
        tracing::info!(query, results = results.len(), "search complete");
        Ok(results)
    }

    /// Articles similar to `article_id`, found by searching its title and
    /// main entities. The article itself is excluded. Bounded by `limit` and
    /// `search_top_k`, not by `rerank_top_k`.
    pub async fn get_related_articles(&self, article_id: &str, limit: usize) -> Result<Vec<SearchResult>> {
        let index = self.snapshot()?;
        let article = index.article(article_id).ok_or_else(|| Error::NotFound(format!("article '{article_id}'")))?;
        let query: Vec<&str> = std::iter::once(article.title.as_str())
            .chain(article.entities.companies.iter().map(String::as_str))
            .chain(article.entities.technologies.iter().map(String::as_str))
            .collect();
        let query = query.join(" ");
        if query.trim().is_empty() { return Ok(Vec::new()); }
        let mut results = self.run_search(&index, &query, None, None, limit.saturating_add(1)).await;
        results.retain(|r| r.article_id != article_id);
        results.truncate(limit);
        Ok(results)
    }

    pub fn get_trending_topics(&self, window_days: Option<u32>) -> Result<Vec<TopicCount>> {
        self.get_trending_topics_at(window_days, Utc::now())
    }

    pub fn get_trending_topics_at(&self, window_days: Option<u32>, now: DateTime<Utc>) -> Result<Vec<TopicCount>> {
        let index = self.snapshot()?;
        let window = window_days.unwrap_or(self.config.trends.window_days);
        Ok(trending_topics(index.articles(), window, now, self.config.trends.limit))
    }

    fn validate_query(&self, query: &str) -> Result<()> {
        if query.trim().is_empty() {
            return Err(Error::Validation("query must not be empty".into()));
        }
        let len = query.chars().count();
        if len > self.config.search.max_query_chars {
            return Err(Error::Validation(format!(
                "query is {len} characters, limit is {}",
                self.config.search.max_query_chars
            )));
        }
        Ok(())
    }

    async fn run_search(
        &self,
        index: &Arc<ArticleIndex>,
        query: &str,
        filters: Option<&SearchFilters>,
        persona: Option<Persona>,
        keep: usize,
    ) -> Vec<SearchResult> {
        let local = async {
            let keyword = self.keyword.search(index, query);
            let entity = self.entity.search(index, query).unwrap_or_else(|e| {
                tracing::warn!(error = %e, "entity channel unavailable; continuing without it");
                Vec::new()
            });
            (keyword, entity)
        };
        let ((keyword, entity), semantic) = futures::join!(local, self.semantic.search(Arc::clone(index), query));
        let semantic = semantic.unwrap_or_else(|e| {
            tracing::warn!(error = %e, "semantic channel unavailable; continuing without it");
            Vec::new()
        });
        tracing::debug!(keyword = keyword.len(), semantic = semantic.len(), entity = entity.len(), "channel hits");

        let mut results = fuse(ChannelHits { keyword, semantic, entity }, self.config.search.hybrid_weight);
        if let Some(persona) = persona {
            apply_persona_boosts(&mut results, index, persona, &self.config.boosts);
        }
        if let Some(filters) = filters {
            apply_filters(&mut results, index, filters, &self.config.sources);
        }
        results.truncate(self.config.search.search_top_k);

        let reranked = self.rerank.rerank(query, &results, index).await;
        let mut results = match reranked {
            Ok(reranked) => reranked,
            Err(e) => {
                tracing::warn!(error = %e, "rerank unavailable; keeping fused order");
                results
            }
        };
        results.truncate(keep);
        results
    }
}
