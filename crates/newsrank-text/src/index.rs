use std::collections::{BTreeMap, BTreeSet, HashMap};

use newsrank_core::error::{Error, Result};
use newsrank_core::types::{Article, ArticleId};

use crate::analyzer::Tokenizer;

/// Per-article term statistics.
#[derive(Debug, Clone, Default)]
struct DocStats {
	term_freqs: HashMap<String, u32>,
	len: usize,
}

/// Inverted index (term -> article ids) plus entity index (normalized
/// entity text -> article ids) over one batch of articles.
///
/// Built wholesale by [`ArticleIndex::build`]; never mutated afterwards.
pub struct ArticleIndex {
	tokenizer: Tokenizer,
	postings: HashMap<String, BTreeSet<ArticleId>>,
	entities: HashMap<String, BTreeSet<ArticleId>>,
	docs: HashMap<ArticleId, DocStats>,
	articles: BTreeMap<ArticleId, Article>,
	avgdl: f64,
}

impl ArticleIndex {
	pub fn build(articles: Vec<Article>, tokenizer: Tokenizer) -> Result<Self> {
		let mut by_id = BTreeMap::new();
		for article in articles {
			if article.id.trim().is_empty() { return Err(Error::Validation("article with empty id".into())); }
			if by_id.contains_key(&article.id) { return Err(Error::Validation(format!("duplicate article id '{}'", article.id))); }
			by_id.insert(article.id.clone(), article);
		}

		let mut postings: HashMap<String, BTreeSet<ArticleId>> = HashMap::new();
		let mut entities: HashMap<String, BTreeSet<ArticleId>> = HashMap::new();
		let mut docs = HashMap::with_capacity(by_id.len());
		let mut total_len = 0usize;
		for (id, article) in &by_id {
			let tokens = tokenizer.tokenize(&article.searchable_text());
			let mut stats = DocStats { len: tokens.len(), ..DocStats::default() };
			for token in tokens { *stats.term_freqs.entry(token).or_insert(0) += 1; }
			for term in stats.term_freqs.keys() { postings.entry(term.clone()).or_default().insert(id.clone()); }
			total_len += stats.len;
			docs.insert(id.clone(), stats);

			for entity in article.entities.all() {
				let key = normalize_entity(entity);
				if !key.is_empty() { entities.entry(key).or_default().insert(id.clone()); }
			}
		}
		let avgdl = if by_id.is_empty() { 0.0 } else { total_len as f64 / by_id.len() as f64 };
		tracing::debug!(articles = by_id.len(), terms = postings.len(), entities = entities.len(), avgdl, "article index built");
		Ok(Self { tokenizer, postings, entities, docs, articles: by_id, avgdl })
	}

	pub fn tokenizer(&self) -> &Tokenizer { &self.tokenizer }

	pub fn len(&self) -> usize { self.articles.len() }

	pub fn is_empty(&self) -> bool { self.articles.is_empty() }

	pub fn avgdl(&self) -> f64 { self.avgdl }

	pub fn term_count(&self) -> usize { self.postings.len() }

	pub fn postings(&self, term: &str) -> Option<&BTreeSet<ArticleId>> { self.postings.get(term) }

	pub fn doc_freq(&self, term: &str) -> usize { self.postings.get(term).map_or(0, BTreeSet::len) }

	pub fn term_freq(&self, id: &str, term: &str) -> u32 {
		self.docs.get(id).and_then(|d| d.term_freqs.get(term)).copied().unwrap_or(0)
	}

	pub fn doc_len(&self, id: &str) -> usize { self.docs.get(id).map_or(0, |d| d.len) }

	/// Exact lookup; `entity` is normalized before matching.
	pub fn entity_postings(&self, entity: &str) -> Option<&BTreeSet<ArticleId>> {
		self.entities.get(&normalize_entity(entity))
	}

	pub fn article(&self, id: &str) -> Option<&Article> { self.articles.get(id) }

	/// Articles in id order.
	pub fn articles(&self) -> impl Iterator<Item = &Article> { self.articles.values() }
}

/// Trimmed, lowercased, internal whitespace collapsed to single spaces.
pub fn normalize_entity(entity: &str) -> String {
	entity.split_whitespace().map(str::to_lowercase).collect::<Vec<_>>().join(" ")
}
