use std::collections::{BTreeMap, BTreeSet};

use newsrank_core::types::{RelevanceType, SearchResult};

/// Per-channel result lists for one query.
#[derive(Debug, Clone, Default)]
pub struct ChannelHits {
    pub keyword: Vec<SearchResult>,
    pub semantic: Vec<SearchResult>,
    pub entity: Vec<SearchResult>,
}

/// Fusion weights, always summing to 1 over active channels (or all zero
/// when nothing is active).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChannelWeights {
    pub keyword: f64,
    pub semantic: f64,
    pub entity: f64,
}

impl ChannelWeights {
    /// Keyword gets `hybrid_weight`; the remainder is split evenly across the
    /// active non-keyword channels; inactive channels get 0. The result is
    /// renormalized over the active channels.
    pub fn for_active(hybrid_weight: f64, keyword: bool, semantic: bool, entity: bool) -> Self {
        let others = usize::from(semantic) + usize::from(entity);
        let share = if others == 0 { 0.0 } else { (1.0 - hybrid_weight) / others as f64 };
        let raw = Self {
            keyword: if keyword { hybrid_weight } else { 0.0 },
            semantic: if semantic { share } else { 0.0 },
            entity: if entity { share } else { 0.0 },
        };
        let sum = raw.sum();
        if sum > 0.0 {
            return Self { keyword: raw.keyword / sum, semantic: raw.semantic / sum, entity: raw.entity / sum };
        }
        // hybrid_weight 0 with only keyword active: equal split.
        let active = usize::from(keyword) + others;
        if active == 0 {
            return Self { keyword: 0.0, semantic: 0.0, entity: 0.0 };
        }
        let each = 1.0 / active as f64;
        Self {
            keyword: if keyword { each } else { 0.0 },
            semantic: if semantic { each } else { 0.0 },
            entity: if entity { each } else { 0.0 },
        }
    }

    pub fn sum(&self) -> f64 { self.keyword + self.semantic + self.entity }
}

#[derive(Default)]
struct Fused {
    score: f64,
    terms: BTreeSet<String>,
    explanations: Vec<String>,
    types: Vec<RelevanceType>,
}

/// Merge channel results into one list: weighted sum of channel scores per
/// article, union of matched terms, explanations in channel order. Sorted
/// by score desc, then article id asc.
pub fn fuse(hits: ChannelHits, hybrid_weight: f64) -> Vec<SearchResult> {
    let weights = ChannelWeights::for_active(
        hybrid_weight,
        !hits.keyword.is_empty(),
        !hits.semantic.is_empty(),
        !hits.entity.is_empty(),
    );
    let mut by_id: BTreeMap<String, Fused> = BTreeMap::new();
    let channels = [
        (hits.keyword, weights.keyword, RelevanceType::Keyword),
        (hits.semantic, weights.semantic, RelevanceType::Semantic),
        (hits.entity, weights.entity, RelevanceType::Entity),
    ];
    for (results, weight, kind) in channels {
        for r in dedupe(results) {
            let acc = by_id.entry(r.article_id).or_default();
            acc.score += weight * r.score.clamp(0.0, 1.0);
            acc.terms.extend(r.matched_terms);
            if !r.explanation.is_empty() { acc.explanations.push(r.explanation); }
            acc.types.push(kind);
        }
    }

    let mut fused: Vec<SearchResult> = by_id
        .into_iter()
        .map(|(article_id, acc)| SearchResult {
            article_id,
            score: acc.score.clamp(0.0, 1.0),
            relevance_type: match acc.types.as_slice() {
                [single] => *single,
                _ => RelevanceType::Combined,
            },
            matched_terms: acc.terms,
            explanation: acc.explanations.join("; "),
        })
        .collect();
    sort_results(&mut fused);
    fused
}

/// Keep the best-scoring result per article within one channel.
fn dedupe(results: Vec<SearchResult>) -> Vec<SearchResult> {
    let mut best: BTreeMap<String, SearchResult> = BTreeMap::new();
    for r in results {
        match best.get(&r.article_id) {
            Some(existing) if existing.score >= r.score => {}
            _ => { best.insert(r.article_id.clone(), r); }
        }
    }
    best.into_values().collect()
}

/// Score desc, then article id asc.
pub fn sort_results(results: &mut [SearchResult]) {
    results.sort_by(|a, b| b.score.total_cmp(&a.score).then_with(|| a.article_id.cmp(&b.article_id)));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_weights_with_all_channels_active() {
        let w = ChannelWeights::for_active(0.7, true, true, true);
        assert!((w.keyword - 0.7).abs() < 1e-12);
        assert!((w.semantic - 0.15).abs() < 1e-12);
        assert!((w.entity - 0.15).abs() < 1e-12);
    }

    #[test]
    fn keyword_only_renormalizes_to_one() {
        let w = ChannelWeights::for_active(0.7, true, false, false);
        assert_eq!(w, ChannelWeights { keyword: 1.0, semantic: 0.0, entity: 0.0 });
    }

    #[test]
    fn degenerate_hybrid_weight_splits_evenly() {
        let w = ChannelWeights::for_active(0.0, true, false, false);
        assert_eq!(w.keyword, 1.0);
        let none = ChannelWeights::for_active(0.7, false, false, false);
        assert_eq!(none.sum(), 0.0);
    }
}
