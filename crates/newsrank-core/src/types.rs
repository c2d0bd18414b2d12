//! Domain types shared by the retrieval channels, the evaluator and the engine.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

pub type ArticleId = String;

/// Named entities extracted upstream. All lists may be empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Entities {
    pub companies: Vec<String>,
    pub technologies: Vec<String>,
    pub people: Vec<String>,
    pub concepts: Vec<String>,
    pub products: Vec<String>,
}

impl Entities {
    pub fn all(&self) -> impl Iterator<Item = &String> {
        self.companies
            .iter()
            .chain(&self.technologies)
            .chain(&self.people)
            .chain(&self.concepts)
            .chain(&self.products)
    }

    pub fn is_empty(&self) -> bool {
        self.all().next().is_none()
    }
}

/// Engineering signals attached by the enrichment step.
///
/// - `reproducibility_score`: in [0,1]; 0 means "not assessed"
/// - `paper_link`/`github_repo`: absent or empty means not available
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TechnicalMetadata {
    pub implementation_ready: bool,
    pub code_available: bool,
    pub paper_link: Option<String>,
    pub github_repo: Option<String>,
    pub dependencies: Vec<String>,
    pub reproducibility_score: f64,
    pub compute_requirements: Option<String>,
}

impl TechnicalMetadata {
    pub fn has_paper(&self) -> bool {
        present(self.paper_link.as_deref())
    }

    pub fn has_repo(&self) -> bool {
        present(self.github_repo.as_deref())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImplementationCost {
    Low,
    #[default]
    Medium,
    High,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BusinessMetadata {
    pub market_size: Option<String>,
    pub growth_rate: Option<f64>,
    pub case_studies: Vec<String>,
    pub funding_info: Option<String>,
    pub implementation_cost: ImplementationCost,
    pub roi_indicators: Vec<String>,
    pub competitive_advantage: Option<String>,
}

impl BusinessMetadata {
    pub fn has_roi(&self) -> bool {
        !self.roi_indicators.is_empty()
    }

    pub fn has_case_studies(&self) -> bool {
        !self.case_studies.is_empty()
    }

    pub fn has_funding(&self) -> bool {
        present(self.funding_info.as_deref())
    }

    pub fn has_market_size(&self) -> bool {
        present(self.market_size.as_deref())
    }

    pub fn has_competitive_advantage(&self) -> bool {
        present(self.competitive_advantage.as_deref())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Evidence {
    pub primary_sources: Vec<String>,
    pub citations: Vec<String>,
    pub expert_validation: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Summaries {
    pub key_takeaways: Vec<String>,
    pub action_items: Vec<String>,
}

/// An enriched news article. Read-only input to the engine apart from
/// the `evaluation` cache.
///
/// - `source_tier`: 1 is most authoritative; 0 means "unknown" and is
///   resolved from the configured source lists
/// - `published_date`: absent dates get neutral temporal scores
/// - `embedding`: optional precomputed vector for the semantic channel
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Article {
    pub id: ArticleId,
    pub title: String,
    pub url: String,
    pub source: String,
    pub source_tier: u8,
    pub published_date: Option<DateTime<Utc>>,
    pub content: String,
    pub entities: Entities,
    pub technical: TechnicalMetadata,
    pub business: BusinessMetadata,
    pub evidence: Evidence,
    pub summaries: Summaries,
    pub evergreen_score: Option<f64>,
    pub embedding: Option<Vec<f32>>,
    pub evaluation: BTreeMap<Persona, EvaluationResult>,
}

impl Article {
    /// Text that is indexed and embedded: title followed by content.
    pub fn searchable_text(&self) -> String {
        format!("{} {}", self.title, self.content)
    }

    /// Hours since publication, floored at zero for future dates.
    pub fn age_hours(&self, now: DateTime<Utc>) -> Option<f64> {
        self.published_date.map(|published| {
            let secs = (now - published).num_seconds().max(0);
            secs as f64 / 3600.0
        })
    }
}

fn present(value: Option<&str>) -> bool {
    value.is_some_and(|v| !v.trim().is_empty())
}

/// Named scoring profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Persona {
    Engineer,
    Business,
}

impl Persona {
    pub const ALL: [Persona; 2] = [Persona::Engineer, Persona::Business];

    pub fn as_str(self) -> &'static str {
        match self {
            Persona::Engineer => "engineer",
            Persona::Business => "business",
        }
    }
}

impl fmt::Display for Persona {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Persona {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "engineer" => Ok(Persona::Engineer),
            "business" => Ok(Persona::Business),
            _ => Err(Error::unknown_persona(s)),
        }
    }
}

/// Per-layer scores, each in [0,1].
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct LayerScores {
    pub quality: f64,
    pub relevance: f64,
    pub temporal: f64,
    pub trust: f64,
    pub actionability: f64,
}

impl LayerScores {
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

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Recommendation {
    HighlyRecommended,
    Recommended,
    Consider,
    Skip,
}

impl Recommendation {
    pub fn from_score(score: f64) -> Self {
        if score >= 0.8 {
            Recommendation::HighlyRecommended
        } else if score >= 0.6 {
            Recommendation::Recommended
        } else if score >= 0.4 {
            Recommendation::Consider
        } else {
            Recommendation::Skip
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Recommendation::HighlyRecommended => "highly_recommended",
            Recommendation::Recommended => "recommended",
            Recommendation::Consider => "consider",
            Recommendation::Skip => "skip",
        }
    }
}

/// Output of the multi-layer evaluator for one (article, persona) pair.
///
/// `breakdown` keys equal the persona weight keys from the configuration;
/// `breakdown_score` is the weighted sum of the breakdown.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationResult {
    pub persona: Persona,
    pub total_score: f64,
    pub layers: LayerScores,
    pub breakdown: BTreeMap<String, f64>,
    pub breakdown_score: f64,
    pub recommendation: Recommendation,
    pub timestamp: DateTime<Utc>,
}

/// Which channel produced a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelevanceType {
    Keyword,
    Semantic,
    Entity,
    Combined,
}

impl RelevanceType {
    pub fn as_str(self) -> &'static str {
        match self {
            RelevanceType::Keyword => "keyword",
            RelevanceType::Semantic => "semantic",
            RelevanceType::Entity => "entity",
            RelevanceType::Combined => "combined",
        }
    }
}

/// The surface returned by every channel and by the engine.
///
/// `score` is always in [0,1], higher is better.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub article_id: ArticleId,
    pub score: f64,
    pub relevance_type: RelevanceType,
    pub matched_terms: BTreeSet<String>,
    pub explanation: String,
}

/// Inclusive publication-date window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl DateRange {
    pub fn contains(&self, date: DateTime<Utc>) -> bool {
        self.start <= date && date <= self.end
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchFilters {
    pub source_tier: Option<u8>,
    pub min_score: Option<f64>,
    pub date_range: Option<DateRange>,
}

/// Corpus ranking entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedArticle {
    pub article_id: ArticleId,
    pub published_date: Option<DateTime<Utc>>,
    pub evaluation: EvaluationResult,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicCount {
    pub topic: String,
    pub count: usize,
}
