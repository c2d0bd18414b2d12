use std::collections::BTreeMap;

use newsrank_core::types::{Article, ImplementationCost, LayerScores, Persona};

use crate::layers::{clamp01, NEUTRAL};

/// Persona-specific named sub-scores, keyed like the persona weights.
pub fn persona_breakdown(article: &Article, persona: Persona, layers: &LayerScores) -> BTreeMap<String, f64> {
    let flag = |b: bool| if b { 1.0 } else { 0.0 };
    let entries: [(&str, f64); 5] = match persona {
        Persona::Engineer => {
            let tech = &article.technical;
            let breakthrough = article.title.to_lowercase().contains("breakthrough");
            let reproducibility =
                if tech.reproducibility_score > 0.0 { tech.reproducibility_score } else { NEUTRAL };
            [
                ("technical_depth", 0.8 * layers.quality + 0.3 * flag(tech.has_paper())),
                ("implementation", 0.4 * layers.actionability + 0.3 * flag(tech.code_available)),
                ("novelty", 0.6 * layers.temporal + 0.2 * flag(breakthrough)),
                ("reproducibility", reproducibility),
                ("community_impact", 0.7 * layers.trust),
            ]
        }
        Persona::Business => {
            let biz = &article.business;
            let cost_penalty = if biz.implementation_cost == ImplementationCost::High { 0.3 } else { 0.1 };
            [
                ("business_impact", 0.8 * layers.relevance + 0.2 * flag(biz.has_case_studies())),
                ("roi_potential", if biz.has_roi() { 0.5 } else { 0.3 }),
                ("market_validation", if biz.has_funding() { 0.4 } else { 0.2 }),
                ("implementation_ease", 1.0 - cost_penalty),
                ("strategic_value", 0.6 * layers.trust + 0.4 * layers.temporal),
            ]
        }
    };
    entries.into_iter().map(|(k, v)| (k.to_string(), clamp01(v))).collect()
}

/// Weighted sum of a breakdown; keys missing from `weights` contribute nothing.
pub fn breakdown_score(breakdown: &BTreeMap<String, f64>, weights: &BTreeMap<String, f64>) -> f64 {
    clamp01(weights.iter().map(|(k, w)| breakdown.get(k).copied().unwrap_or(0.0) * w).sum())
}
