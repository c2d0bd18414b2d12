use newsrank_core::config::BoostConfig;
use newsrank_core::types::{Article, Persona, SearchResult};
use newsrank_text::ArticleIndex;

use crate::fusion::sort_results;

/// Sum of the persona boosts this article earns.
pub fn persona_boost(article: &Article, persona: Persona, boosts: &BoostConfig) -> f64 {
    let mut total = 0.0;
    match persona {
        Persona::Engineer => {
            let b = &boosts.engineer;
            if article.technical.implementation_ready { total += b.implementation_ready; }
            if article.technical.code_available { total += b.code_available; }
            if article.technical.has_paper() { total += b.paper_link; }
        }
        Persona::Business => {
            let b = &boosts.business;
            if article.business.has_roi() { total += b.roi_indicators; }
            if article.business.has_case_studies() { total += b.case_studies; }
            if article.business.has_funding() { total += b.funding_info; }
        }
    }
    total
}

/// `score *= 1 + boost`, clamped to [0,1], then re-sorted.
pub fn apply_persona_boosts(results: &mut [SearchResult], index: &ArticleIndex, persona: Persona, boosts: &BoostConfig) {
    for r in results.iter_mut() {
        let Some(article) = index.article(&r.article_id) else { continue };
        let boost = persona_boost(article, persona, boosts);
        if boost > 0.0 {
            r.score = (r.score * (1.0 + boost)).clamp(0.0, 1.0);
            r.explanation.push_str(&format!("; {persona} boost +{boost:.2}"));
        }
    }
    sort_results(results);
}
