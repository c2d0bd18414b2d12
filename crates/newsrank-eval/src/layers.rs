use chrono::{DateTime, Utc};
use std::collections::HashSet;

use newsrank_core::config::Config;
use newsrank_core::types::{Article, Persona};

/// Score used wherever a signal is unknown.
pub const NEUTRAL: f64 = 0.5;

const FULL_LENGTH_CHARS: f64 = 2000.0;

pub fn clamp01(x: f64) -> f64 {
    if x.is_nan() { 0.0 } else { x.clamp(0.0, 1.0) }
}

fn flag(b: bool) -> f64 {
    if b { 1.0 } else { 0.0 }
}

/// Content length, source tier, metadata richness and title shape.
pub fn quality(article: &Article, config: &Config, tier: u8) -> f64 {
    let len = article.content.chars().count();
    let length = if len >= config.evaluation.min_content_length {
        (len as f64 / FULL_LENGTH_CHARS).min(1.0)
    } else {
        0.0
    };
    let tier_score = if tier == 1 { 1.0 } else { 0.7 };
    clamp01(0.3 * length + 0.2 * tier_score + 0.3 * metadata_richness(article) + 0.2 * title_score(&article.title))
}

fn metadata_richness(article: &Article) -> f64 {
    let signals = [
        article.technical.has_paper(),
        article.technical.has_repo(),
        article.business.has_case_studies(),
        !article.entities.companies.is_empty() || !article.entities.technologies.is_empty(),
        !article.summaries.key_takeaways.is_empty(),
    ];
    signals.iter().map(|s| 0.2 * flag(*s)).sum()
}

fn title_score(title: &str) -> f64 {
    let len = title.trim().chars().count();
    match len {
        0 => NEUTRAL,
        30..=100 => 1.0,
        l if !(30..=150).contains(&l) => 0.3,
        _ => NEUTRAL,
    }
}

pub fn relevance(article: &Article, persona: Persona, config: &Config) -> f64 {
    let words = word_set(&article.searchable_text());
    let tech = &article.technical;
    let biz = &article.business;
    match persona {
        Persona::Engineer => clamp01(
            0.25 * flag(tech.implementation_ready)
                + 0.2 * flag(tech.code_available)
                + 0.2 * flag(tech.has_paper())
                + 0.15 * flag(tech.reproducibility_score > 0.7)
                + (0.05 * keyword_hits(&words, &config.evaluation.tech_keywords) as f64).min(0.2),
        ),
        Persona::Business => clamp01(
            0.25 * flag(biz.has_roi())
                + 0.2 * flag(biz.has_case_studies())
                + 0.15 * flag(biz.has_market_size())
                + 0.1 * flag(biz.has_funding())
                + (0.06 * keyword_hits(&words, &config.evaluation.business_keywords) as f64).min(0.3),
        ),
    }
}

/// Temporal layer components. `combined = 0.6 * freshness + 0.4 * evergreen`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TemporalScore {
    pub freshness: f64,
    pub evergreen: f64,
    pub combined: f64,
}

/// `exp(-age * ln2 / half_life)`; unknown age is neutral.
pub fn freshness(age_hours: Option<f64>, half_life_hours: f64) -> f64 {
    match age_hours {
        Some(h) => clamp01((-h.max(0.0) * std::f64::consts::LN_2 / half_life_hours).exp()),
        None => NEUTRAL,
    }
}

pub fn evergreen(article: &Article, config: &Config) -> f64 {
    if let Some(score) = article.evergreen_score.filter(|s| *s > 0.0) {
        return clamp01(score);
    }
    let words = word_set(&article.searchable_text());
    let hits = keyword_hits(&words, &config.evaluation.evergreen_indicators) as f64;
    clamp01(0.3 + 0.2 * hits + 0.3 * flag(article.technical.has_paper()))
}

pub fn temporal(article: &Article, config: &Config, now: DateTime<Utc>) -> TemporalScore {
    let freshness = freshness(article.age_hours(now), config.evaluation.half_life_hours);
    let evergreen = evergreen(article, config);
    TemporalScore { freshness, evergreen, combined: clamp01(0.6 * freshness + 0.4 * evergreen) }
}

pub fn trust(article: &Article, tier: u8) -> f64 {
    let base = match tier {
        1 => 0.4,
        2 => 0.25,
        _ => 0.1,
    };
    let ev = &article.evidence;
    clamp01(
        base + 0.3 * flag(!ev.primary_sources.is_empty())
            + 0.2 * flag(!ev.citations.is_empty())
            + 0.1 * flag(ev.expert_validation),
    )
}

pub fn actionability(article: &Article, persona: Persona) -> f64 {
    let has_actions = !article.summaries.action_items.is_empty();
    match persona {
        Persona::Engineer => {
            let tech = &article.technical;
            clamp01(
                0.3 * flag(tech.code_available)
                    + 0.25 * flag(tech.implementation_ready)
                    + 0.25 * flag(has_actions)
                    + 0.2 * flag(tech.reproducibility_score > 0.6),
            )
        }
        Persona::Business => {
            let biz = &article.business;
            clamp01(
                0.3 * flag(biz.has_roi())
                    + 0.25 * flag(biz.has_case_studies())
                    + 0.25 * flag(has_actions)
                    + 0.2 * flag(biz.has_competitive_advantage()),
            )
        }
    }
}

fn word_set(text: &str) -> HashSet<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_lowercase)
        .collect()
}

/// Number of distinct keywords present as whole words.
fn keyword_hits(words: &HashSet<String>, keywords: &[String]) -> usize {
    keywords.iter().filter(|k| words.contains(&k.to_lowercase())).count()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_shape_buckets() {
        assert_eq!(title_score(""), NEUTRAL);
        assert_eq!(title_score("short"), 0.3);
        assert_eq!(title_score(&"x".repeat(30)), 1.0);
        assert_eq!(title_score(&"x".repeat(120)), NEUTRAL);
        assert_eq!(title_score(&"x".repeat(151)), 0.3);
    }

    #[test]
    fn keywords_match_whole_words_only() {
        let words = word_set("Rapid API adoption, at scale!");
        let keywords = vec!["api".to_string(), "scale".to_string(), "rapi".to_string()];
        assert_eq!(keyword_hits(&words, &keywords), 2);
    }

    #[test]
    fn clamp_maps_nan_to_zero() {
        assert_eq!(clamp01(f64::NAN), 0.0);
        assert_eq!(clamp01(1.7), 1.0);
    }
}
