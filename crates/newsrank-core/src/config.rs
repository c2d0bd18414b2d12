//! Engine configuration.
//!
//! Uses Figment to merge built-in defaults, `newsrank.toml`,
//! `newsrank.<env>.toml` and `NEWSRANK_*` env vars, then validates the
//! result so every component can assume well-formed weights.

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::env;
use std::path::Path;

use crate::error::{Error, Result};
use crate::types::{Article, Persona};

pub const ENGINEER_KEYS: [&str; 5] =
    ["technical_depth", "implementation", "novelty", "reproducibility", "community_impact"];
pub const BUSINESS_KEYS: [&str; 5] =
    ["business_impact", "roi_potential", "market_validation", "implementation_ease", "strategic_value"];

const WEIGHT_EPSILON: f64 = 1e-6;

/// Immutable engine configuration, built once and shared behind an `Arc`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub search: SearchConfig,
    pub evaluation: EvaluationConfig,
    pub boosts: BoostConfig,
    pub semantic: ChannelConfig,
    pub rerank: ChannelConfig,
    pub trends: TrendConfig,
    pub sources: SourceTiers,
    pub lexicon: Lexicon,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub bm25_k1: f64,
    pub bm25_b: f64,
    /// Raw BM25 scores are divided by this and capped at 1.
    pub bm25_norm: f64,
    pub hybrid_weight: f64,
    pub search_top_k: usize,
    pub rerank_top_k: usize,
    pub min_token_len: usize,
    pub max_query_chars: usize,
    pub semantic_threshold: f64,
    pub entity_score: f64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            bm25_k1: 1.5,
            bm25_b: 0.75,
            bm25_norm: 10.0,
            hybrid_weight: 0.7,
            search_top_k: 100,
            rerank_top_k: 20,
            min_token_len: 3,
            max_query_chars: 1000,
            semantic_threshold: 0.3,
            entity_score: 0.8,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayerWeights {
    pub quality: f64,
    pub relevance: f64,
    pub temporal: f64,
    pub trust: f64,
    pub actionability: f64,
}

impl Default for LayerWeights {
    fn default() -> Self {
        Self { quality: 0.25, relevance: 0.30, temporal: 0.15, trust: 0.15, actionability: 0.15 }
    }
}

impl LayerWeights {
    pub fn sum(&self) -> f64 {
        self.quality + self.relevance + self.temporal + self.trust + self.actionability
    }

    pub fn as_pairs(&self) -> [(&'static str, f64); 5] {
        [
            ("quality", self.quality),
            ("relevance", self.relevance),
            ("temporal", self.temporal),
            ("trust", self.trust),
            ("actionability", self.actionability),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvaluationConfig {
    pub half_life_hours: f64,
    pub min_content_length: usize,
    pub layer_weights: LayerWeights,
    pub engineer_weights: BTreeMap<String, f64>,
    pub business_weights: BTreeMap<String, f64>,
    pub tech_keywords: Vec<String>,
    pub business_keywords: Vec<String>,
    pub evergreen_indicators: Vec<String>,
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        Self {
            half_life_hours: 72.0,
            min_content_length: 500,
            layer_weights: LayerWeights::default(),
            engineer_weights: weights(&ENGINEER_KEYS, &[0.35, 0.25, 0.20, 0.15, 0.05]),
            business_weights: weights(&BUSINESS_KEYS, &[0.40, 0.25, 0.20, 0.10, 0.05]),
            tech_keywords: strings(&["algorithm", "model", "neural", "transformer", "api", "framework", "library"]),
            business_keywords: strings(&[
                "revenue", "cost", "roi", "market", "customer", "adoption", "scale", "enterprise",
            ]),
            evergreen_indicators: strings(&["tutorial", "guide", "fundamentals", "principles", "introduction"]),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineerBoosts {
    pub implementation_ready: f64,
    pub code_available: f64,
    pub paper_link: f64,
}

impl Default for EngineerBoosts {
    fn default() -> Self {
        Self { implementation_ready: 0.2, code_available: 0.3, paper_link: 0.1 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BusinessBoosts {
    pub roi_indicators: f64,
    pub case_studies: f64,
    pub funding_info: f64,
}

impl Default for BusinessBoosts {
    fn default() -> Self {
        Self { roi_indicators: 0.3, case_studies: 0.2, funding_info: 0.1 }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoostConfig {
    pub engineer: EngineerBoosts,
    pub business: BusinessBoosts,
}

/// External channel switch. A disabled channel is replaced by its null variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChannelConfig {
    pub enabled: bool,
    pub timeout_ms: u64,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self { enabled: true, timeout_ms: 2_000 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrendConfig {
    pub window_days: u32,
    pub limit: usize,
}

impl Default for TrendConfig {
    fn default() -> Self {
        Self { window_days: 7, limit: 10 }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceTiers {
    pub tier1: Vec<String>,
    pub tier2: Vec<String>,
}

impl Default for SourceTiers {
    fn default() -> Self {
        Self {
            tier1: strings(&[
                "arxiv",
                "openai",
                "anthropic",
                "deepmind",
                "papers-with-code",
                "google-ai",
                "meta-ai",
                "microsoft-research",
                "hugging-face",
            ]),
            tier2: strings(&[
                "github-trending",
                "towards-data-science",
                "techcrunch",
                "venturebeat",
                "the-information",
                "reddit-ml",
                "hackernews",
            ]),
        }
    }
}

impl SourceTiers {
    /// Tier for a source name: 1 or 2 when listed, 3 otherwise.
    pub fn tier_of(&self, source: &str) -> u8 {
        let source = source.trim();
        if self.tier1.iter().any(|s| s.eq_ignore_ascii_case(source)) {
            1
        } else if self.tier2.iter().any(|s| s.eq_ignore_ascii_case(source)) {
            2
        } else {
            3
        }
    }

    /// The article's own tier, or the configured one when it is unset (0).
    pub fn effective_tier(&self, article: &Article) -> u8 {
        if article.source_tier > 0 {
            article.source_tier
        } else {
            self.tier_of(&article.source)
        }
    }
}

/// Entity lexicon used by the rule-based extractor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Lexicon {
    pub companies: Vec<String>,
    pub technologies: Vec<String>,
    pub people: Vec<String>,
    pub concepts: Vec<String>,
    pub products: Vec<String>,
    /// Capitalized words never treated as proper nouns.
    pub stop_words: Vec<String>,
    /// Minimum length (exclusive) for a capitalized word to count as an entity.
    pub min_proper_noun_len: usize,
}

impl Default for Lexicon {
    fn default() -> Self {
        Self {
            companies: strings(&[
                "openai",
                "google",
                "microsoft",
                "meta",
                "anthropic",
                "deepmind",
                "nvidia",
                "hugging face",
                "mistral",
            ]),
            technologies: strings(&[
                "gpt",
                "bert",
                "transformer",
                "pytorch",
                "tensorflow",
                "llm",
                "nlp",
                "cv",
                "machine learning",
                "deep learning",
                "diffusion",
            ]),
            people: Vec::new(),
            concepts: strings(&["reinforcement learning", "fine-tuning", "retrieval augmented generation"]),
            products: strings(&["chatgpt", "claude", "gemini", "llama", "copilot"]),
            stop_words: strings(&["the", "and", "for", "with", "this", "that", "from", "into"]),
            min_proper_noun_len: 3,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            search: SearchConfig::default(),
            evaluation: EvaluationConfig::default(),
            boosts: BoostConfig::default(),
            semantic: ChannelConfig::default(),
            rerank: ChannelConfig::default(),
            trends: TrendConfig::default(),
            sources: SourceTiers::default(),
            lexicon: Lexicon::default(),
        }
    }
}

impl Config {
    /// Merge defaults, `newsrank.toml`, `newsrank.<env>.toml` and `NEWSRANK_*`
    /// env vars (nested keys separated by `__`). `RUST_ENV` selects the env.
    pub fn load() -> Result<Self> {
        let env_name = env::var("RUST_ENV").unwrap_or_else(|_| "dev".to_string());

        let mut figment = Figment::from(Serialized::defaults(Config::default())).merge(Toml::file("newsrank.toml"));
        match env_name.as_str() {
            "dev" | "development" => figment = figment.merge(Toml::file("newsrank.dev.toml")),
            "prod" | "production" => figment = figment.merge(Toml::file("newsrank.prod.toml")),
            "test" | "testing" => figment = figment.merge(Toml::file("newsrank.test.toml")),
            other => tracing::warn!(env = other, "unrecognized RUST_ENV; skipping env-specific config file"),
        }
        figment = figment.merge(Env::prefixed("NEWSRANK_").split("__"));

        Self::from_figment(&figment)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::InvalidConfig(format!("config file not found: {}", path.display())));
        }
        Self::from_figment(&Figment::from(Serialized::defaults(Config::default())).merge(Toml::file(path)))
    }

    pub fn from_toml_str(toml: &str) -> Result<Self> {
        Self::from_figment(&Figment::from(Serialized::defaults(Config::default())).merge(Toml::string(toml)))
    }

    fn from_figment(figment: &Figment) -> Result<Self> {
        let config: Config = figment.extract().map_err(|e| Error::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn persona_weights(&self, persona: Persona) -> &BTreeMap<String, f64> {
        match persona {
            Persona::Engineer => &self.evaluation.engineer_weights,
            Persona::Business => &self.evaluation.business_weights,
        }
    }

    pub fn persona_keys(persona: Persona) -> &'static [&'static str; 5] {
        match persona {
            Persona::Engineer => &ENGINEER_KEYS,
            Persona::Business => &BUSINESS_KEYS,
        }
    }

    pub fn validate(&self) -> Result<()> {
        let s = &self.search;
        if !is_positive(s.bm25_k1) {
            return Err(Error::InvalidConfig(format!("search.bm25_k1 must be > 0, got {}", s.bm25_k1)));
        }
        if !(0.0..=1.0).contains(&s.bm25_b) {
            return Err(Error::InvalidConfig(format!("search.bm25_b must be in [0,1], got {}", s.bm25_b)));
        }
        if !is_positive(s.bm25_norm) {
            return Err(Error::InvalidConfig(format!("search.bm25_norm must be > 0, got {}", s.bm25_norm)));
        }
        if !(0.0..=1.0).contains(&s.hybrid_weight) {
            return Err(Error::InvalidConfig(format!(
                "search.hybrid_weight must be in [0,1], got {}",
                s.hybrid_weight
            )));
        }
        if s.search_top_k == 0 || s.rerank_top_k == 0 {
            return Err(Error::InvalidConfig("search_top_k and rerank_top_k must be positive".into()));
        }
        if s.rerank_top_k > s.search_top_k {
            return Err(Error::InvalidConfig(format!(
                "rerank_top_k ({}) must not exceed search_top_k ({})",
                s.rerank_top_k, s.search_top_k
            )));
        }
        for (name, value) in [("semantic_threshold", s.semantic_threshold), ("entity_score", s.entity_score)] {
            if !(0.0..=1.0).contains(&value) {
                return Err(Error::InvalidConfig(format!("search.{name} must be in [0,1], got {value}")));
            }
        }

        let e = &self.evaluation;
        if !is_positive(e.half_life_hours) {
            return Err(Error::InvalidConfig(format!(
                "evaluation.half_life_hours must be > 0, got {}",
                e.half_life_hours
            )));
        }
        for (name, value) in e.layer_weights.as_pairs() {
            check_weight(&format!("evaluation.layer_weights.{name}"), value)?;
        }
        check_sum("evaluation.layer_weights", e.layer_weights.sum())?;
        for persona in Persona::ALL {
            let weights = self.persona_weights(persona);
            let expected: BTreeSet<&str> = Self::persona_keys(persona).iter().copied().collect();
            let actual: BTreeSet<&str> = weights.keys().map(String::as_str).collect();
            if expected != actual {
                return Err(Error::InvalidConfig(format!(
                    "{persona} weights must have keys {expected:?}, got {actual:?}"
                )));
            }
            for (name, value) in weights {
                check_weight(&format!("evaluation.{persona}_weights.{name}"), *value)?;
            }
            check_sum(&format!("evaluation.{persona}_weights"), weights.values().sum())?;
        }
        if self.trends.limit == 0 {
            return Err(Error::InvalidConfig("trends.limit must be positive".into()));
        }
        Ok(())
    }
}

fn is_positive(value: f64) -> bool {
    value.is_finite() && value > 0.0
}

/// Each weight is finite and in [0,1]; NaN fails the range check.
fn check_weight(name: &str, value: f64) -> Result<()> {
    if !(0.0..=1.0).contains(&value) {
        return Err(Error::InvalidConfig(format!("{name} must be in [0,1], got {value}")));
    }
    Ok(())
}

fn check_sum(name: &str, sum: f64) -> Result<()> {
    if (sum - 1.0).abs() > WEIGHT_EPSILON {
        return Err(Error::InvalidConfig(format!("{name} must sum to 1.0, got {sum:.6}")));
    }
    Ok(())
}

fn weights(keys: &[&str], values: &[f64]) -> BTreeMap<String, f64> {
    keys.iter().zip(values).map(|(k, v)| ((*k).to_string(), *v)).collect()
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|s| (*s).to_string()).collect()
}
