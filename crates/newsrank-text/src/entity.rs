use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use newsrank_core::error::{Error, Result};
use newsrank_core::traits::EntityExtractor;
use newsrank_core::types::{RelevanceType, SearchResult};

use crate::index::{normalize_entity, ArticleIndex};

/// Entity channel: extract entities from the query, look each one up
/// exactly in the entity index, emit one result per matching article.
#[derive(Clone)]
pub struct EntityRetriever {
	extractor: Arc<dyn EntityExtractor>,
	score: f64,
}

impl EntityRetriever {
	pub fn new(extractor: Arc<dyn EntityExtractor>, score: f64) -> Self {
		Self { extractor, score: score.clamp(0.0, 1.0) }
	}

	pub fn search(&self, index: &ArticleIndex, query: &str) -> Result<Vec<SearchResult>> {
		let entities = self.extractor.extract(query).map_err(|e| Error::channel("entity", e))?;
		let keys: BTreeSet<String> = entities.all().map(|e| normalize_entity(e)).filter(|k| !k.is_empty()).collect();

		let mut by_article: BTreeMap<&str, BTreeSet<String>> = BTreeMap::new();
		for key in &keys {
			if let Some(ids) = index.entity_postings(key) {
				for id in ids { by_article.entry(id.as_str()).or_default().insert(key.clone()); }
			}
		}

		let results: Vec<SearchResult> = by_article
			.into_iter()
			.map(|(id, matched_terms)| {
				let explanation = format!("Entity match: {}", matched_terms.iter().cloned().collect::<Vec<_>>().join(", "));
				SearchResult { article_id: id.to_string(), score: self.score, relevance_type: RelevanceType::Entity, matched_terms, explanation }
			})
			.collect();
		tracing::debug!(query, entities = keys.len(), hits = results.len(), "entity channel");
		Ok(results)
	}
}
