use anyhow::{bail, Result};
use std::sync::Arc;

use newsrank_core::config::{Config, Lexicon};
use newsrank_core::traits::{Embedder, EntityExtractor};
use newsrank_core::types::Entities;

use crate::hashed::HashEmbedder;
use crate::lexicon::LexiconExtractor;

/// Default provider: lexicon entities plus hashed bag-of-words embeddings.
#[derive(Debug, Clone)]
pub struct RuleBasedProvider {
    extractor: LexiconExtractor,
    embedder: HashEmbedder,
}

impl RuleBasedProvider {
    pub fn new(lexicon: Lexicon) -> Self {
        Self { extractor: LexiconExtractor::new(lexicon), embedder: HashEmbedder::default() }
    }

    pub fn from_config(config: &Config) -> Self { Self::new(config.lexicon.clone()) }

    pub fn with_dim(mut self, dim: usize) -> Self {
        self.embedder = HashEmbedder::new(dim);
        self
    }
}

impl EntityExtractor for RuleBasedProvider {
    fn extract(&self, text: &str) -> Result<Entities> { Ok(self.extractor.extract_entities(text)) }
}

impl Embedder for RuleBasedProvider {
    fn embedder_id(&self) -> &str { self.embedder.embedder_id() }
    fn dim(&self) -> usize { self.embedder.dim() }
    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> { self.embedder.embed_batch(texts) }
}

/// Delegates to injected model backends.
///
/// Embedding output is shape-checked. When the NER model is missing or
/// fails, entities come from the lexicon instead.
pub struct ModelBackedProvider {
    embedder: Arc<dyn Embedder>,
    ner: Option<Arc<dyn EntityExtractor>>,
    fallback: LexiconExtractor,
}

impl ModelBackedProvider {
    pub fn new(embedder: Arc<dyn Embedder>, fallback: Lexicon) -> Self {
        Self { embedder, ner: None, fallback: LexiconExtractor::new(fallback) }
    }

    pub fn with_ner(mut self, ner: Arc<dyn EntityExtractor>) -> Self {
        self.ner = Some(ner);
        self
    }
}

impl Embedder for ModelBackedProvider {
    fn embedder_id(&self) -> &str { self.embedder.embedder_id() }
    fn dim(&self) -> usize { self.embedder.dim() }

    fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let vectors = self.embedder.embed_batch(texts)?;
        if vectors.len() != texts.len() {
            bail!("{} returned {} vectors for {} texts", self.embedder_id(), vectors.len(), texts.len());
        }
        if let Some(bad) = vectors.iter().find(|v| v.len() != self.dim()) {
            bail!("{} returned a {}-dim vector, expected {}", self.embedder_id(), bad.len(), self.dim());
        }
        Ok(vectors)
    }

    fn similarity(&self, a: &[f32], b: &[f32]) -> f32 { self.embedder.similarity(a, b) }
}

impl EntityExtractor for ModelBackedProvider {
    fn extract(&self, text: &str) -> Result<Entities> {
        let Some(ner) = &self.ner else { return Ok(self.fallback.extract_entities(text)) };
        match ner.extract(text) {
            Ok(entities) => Ok(entities),
            Err(err) => {
                tracing::warn!(error = %err, "NER model failed; using lexicon entities");
                Ok(self.fallback.extract_entities(text))
            }
        }
    }
}
