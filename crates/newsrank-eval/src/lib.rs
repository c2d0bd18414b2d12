//! Multi-layer heuristic evaluation of enriched articles.
//!
//! Five layers (quality, relevance, temporal, trust, actionability) are
//! computed per persona and combined with configured weights into one
//! bounded score, a recommendation tier and a persona breakdown.

pub mod breakdown;
pub mod evaluator;
pub mod layers;

pub use evaluator::MultiLayerEvaluator;
pub use layers::TemporalScore;
