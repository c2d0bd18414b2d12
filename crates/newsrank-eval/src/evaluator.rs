use chrono::{DateTime, Utc};
use rayon::prelude::*;
use std::sync::Arc;

use newsrank_core::config::Config;
use newsrank_core::error::Result;
use newsrank_core::types::{Article, EvaluationResult, LayerScores, Persona, Recommendation};

use crate::breakdown::{breakdown_score, persona_breakdown};
use crate::layers::{self, clamp01};

/// Pure per-(article, persona) scorer. Holds only the shared configuration.
#[derive(Debug, Clone)]
pub struct MultiLayerEvaluator {
    config: Arc<Config>,
}

impl MultiLayerEvaluator {
    pub fn new(config: Arc<Config>) -> Self { Self { config } }

    pub fn config(&self) -> &Config { &self.config }

    /// Evaluate against the current time. Unknown personas fail before any scoring.
    pub fn evaluate(&self, article: &Article, persona: &str) -> Result<EvaluationResult> {
        self.evaluate_at(article, persona, Utc::now())
    }

    pub fn evaluate_at(&self, article: &Article, persona: &str, now: DateTime<Utc>) -> Result<EvaluationResult> {
        let persona: Persona = persona.parse()?;
        Ok(self.evaluate_persona(article, persona, now))
    }

    pub fn evaluate_persona(&self, article: &Article, persona: Persona, now: DateTime<Utc>) -> EvaluationResult {
        let layers = self.layers(article, persona, now);
        let total_score = self.combine(&layers);
        let breakdown = persona_breakdown(article, persona, &layers);
        let breakdown_score = breakdown_score(&breakdown, self.config.persona_weights(persona));
        EvaluationResult {
            persona,
            total_score,
            layers,
            breakdown,
            breakdown_score,
            recommendation: Recommendation::from_score(total_score),
            timestamp: now,
        }
    }

    /// Evaluate many articles in parallel; output order matches input order.
    pub fn evaluate_many(&self, articles: &[Article], persona: Persona, now: DateTime<Utc>) -> Vec<EvaluationResult> {
        let results: Vec<EvaluationResult> = articles.par_iter().map(|a| self.evaluate_persona(a, persona, now)).collect();
        tracing::debug!(persona = %persona, articles = results.len(), "articles evaluated");
        results
    }

    pub fn layers(&self, article: &Article, persona: Persona, now: DateTime<Utc>) -> LayerScores {
        let config = self.config.as_ref();
        let tier = config.sources.effective_tier(article);
        LayerScores {
            quality: layers::quality(article, config, tier),
            relevance: layers::relevance(article, persona, config),
            temporal: layers::temporal(article, config, now).combined,
            trust: layers::trust(article, tier),
            actionability: layers::actionability(article, persona),
        }
    }

    pub fn temporal(&self, article: &Article, now: DateTime<Utc>) -> layers::TemporalScore {
        layers::temporal(article, &self.config, now)
    }

    fn combine(&self, layers: &LayerScores) -> f64 {
        let w = &self.config.evaluation.layer_weights;
        clamp01(
            layers.quality * w.quality
                + layers.relevance * w.relevance
                + layers.temporal * w.temporal
                + layers.trust * w.trust
                + layers.actionability * w.actionability,
        )
    }
}
