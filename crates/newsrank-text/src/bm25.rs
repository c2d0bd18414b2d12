use std::collections::{BTreeMap, BTreeSet};

use newsrank_core::config::SearchConfig;
use newsrank_core::types::{RelevanceType, SearchResult};

use crate::index::ArticleIndex;

/// Lower bound for idf so terms present in most articles still add a
/// small positive amount and raw scores never go negative.
pub const IDF_FLOOR: f64 = 0.01;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bm25Params {
	pub k1: f64,
	pub b: f64,
	pub norm: f64,
}

impl Default for Bm25Params {
	fn default() -> Self { Self { k1: 1.5, b: 0.75, norm: 10.0 } }
}

impl From<&SearchConfig> for Bm25Params {
	fn from(c: &SearchConfig) -> Self { Self { k1: c.bm25_k1, b: c.bm25_b, norm: c.bm25_norm } }
}

pub fn idf(doc_count: usize, doc_freq: usize) -> f64 {
	let n = doc_count as f64;
	let df = doc_freq as f64;
	((n - df + 0.5) / (df + 0.5)).ln().max(IDF_FLOOR)
}

/// Contribution of one query term to one document.
pub fn term_score(params: &Bm25Params, idf: f64, tf: f64, doc_len: f64, avgdl: f64) -> f64 {
	if tf <= 0.0 { return 0.0; }
	let avgdl = if avgdl > 0.0 { avgdl } else { 1.0 };
	let denom = tf + params.k1 * (1.0 - params.b + params.b * doc_len / avgdl);
	idf * tf * (params.k1 + 1.0) / denom
}

/// Keyword channel: OR-semantics candidate selection, BM25 scoring,
/// scores mapped to [0,1] via `min(raw / norm, 1)`.
#[derive(Debug, Clone)]
pub struct KeywordRetriever {
	params: Bm25Params,
}

impl KeywordRetriever {
	pub fn new(params: Bm25Params) -> Self { Self { params } }

	pub fn params(&self) -> &Bm25Params { &self.params }

	/// Unnormalized BM25 score of one article for already-tokenized terms.
	pub fn raw_score(&self, index: &ArticleIndex, id: &str, terms: &[String]) -> f64 {
		let n = index.len();
		let dl = index.doc_len(id) as f64;
		terms
			.iter()
			.map(|t| term_score(&self.params, idf(n, index.doc_freq(t)), f64::from(index.term_freq(id, t)), dl, index.avgdl()))
			.sum()
	}

	pub fn search(&self, index: &ArticleIndex, query: &str) -> Vec<SearchResult> {
		let terms = index.tokenizer().unique_terms(query);
		if terms.is_empty() || index.is_empty() { return Vec::new(); }

		let mut matched: BTreeMap<&str, BTreeSet<String>> = BTreeMap::new();
		for term in &terms {
			if let Some(ids) = index.postings(term) {
				for id in ids { matched.entry(id.as_str()).or_default().insert(term.clone()); }
			}
		}

		let mut results: Vec<SearchResult> = matched
			.into_iter()
			.map(|(id, matched_terms)| {
				let raw = self.raw_score(index, id, &terms);
				let score = (raw / self.params.norm).clamp(0.0, 1.0);
				let explanation = format!(
					"BM25 match: {} (raw {raw:.3})",
					matched_terms.iter().cloned().collect::<Vec<_>>().join(", ")
				);
				SearchResult { article_id: id.to_string(), score, relevance_type: RelevanceType::Keyword, matched_terms, explanation }
			})
			.collect();
		results.sort_by(|a, b| b.score.total_cmp(&a.score).then_with(|| a.article_id.cmp(&b.article_id)));
		tracing::debug!(query, hits = results.len(), "keyword channel");
		results
	}
}

impl Default for KeywordRetriever {
	fn default() -> Self { Self::new(Bm25Params::default()) }
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn idf_is_floored_for_common_terms() {
		assert_eq!(idf(4, 4), IDF_FLOOR);
		assert!(idf(100, 1) > idf(100, 10));
	}

	#[test]
	fn zero_tf_contributes_nothing() {
		assert_eq!(term_score(&Bm25Params::default(), 2.0, 0.0, 10.0, 10.0), 0.0);
	}

	#[test]
	fn empty_average_length_does_not_divide_by_zero() {
		let s = term_score(&Bm25Params::default(), 1.0, 1.0, 0.0, 0.0);
		assert!(s.is_finite() && s > 0.0);
	}
}
