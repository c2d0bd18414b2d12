use newsrank_core::config::SourceTiers;
use newsrank_core::types::{SearchFilters, SearchResult};
use newsrank_text::ArticleIndex;

/// Drop results failing any filter. A date range excludes undated articles.
pub fn apply_filters(results: &mut Vec<SearchResult>, index: &ArticleIndex, filters: &SearchFilters, sources: &SourceTiers) {
    results.retain(|r| {
        let Some(article) = index.article(&r.article_id) else { return false };
        if let Some(tier) = filters.source_tier {
            if sources.effective_tier(article) != tier { return false; }
        }
        if let Some(min) = filters.min_score {
            if r.score < min { return false; }
        }
        if let Some(range) = &filters.date_range {
            if !article.published_date.is_some_and(|d| range.contains(d)) { return false; }
        }
        true
    });
}
