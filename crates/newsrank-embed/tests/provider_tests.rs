use std::sync::Arc;

use newsrank_core::config::Lexicon;
use newsrank_core::traits::{cosine_similarity, Embedder, EntityExtractor};
use newsrank_core::types::Entities;
use newsrank_embed::{HashEmbedder, ModelBackedProvider, RuleBasedProvider};

#[test]
fn lexicon_matches_whole_words_only() {
    let provider = RuleBasedProvider::new(Lexicon::default());
    let entities = provider.extract("OpenAI ships a PyTorch port; metadata is not Meta").expect("extract");
    assert_eq!(entities.companies, vec!["openai", "meta"]);
    assert_eq!(entities.technologies, vec!["pytorch"]);
    // "metadata" must not match "meta"; "cv" must not match inside words
    let entities = provider.extract("cvs and metadata").expect("extract");
    assert!(entities.companies.is_empty());
    assert!(entities.technologies.is_empty());
}

#[test]
fn multi_word_lexicon_entries_match_across_punctuation() {
    let provider = RuleBasedProvider::new(Lexicon::default());
    let entities = provider.extract("Advances in Machine-Learning? No: machine learning, at scale").expect("extract");
    assert_eq!(entities.technologies, vec!["machine learning"]);
}

#[test]
fn capitalized_unknown_words_become_concepts() {
    let provider = RuleBasedProvider::new(Lexicon::default());
    let entities = provider.extract("The Mamba paper beats Transformer baselines with Jamba").expect("extract");
    assert!(entities.concepts.contains(&"Mamba".to_string()));
    assert!(entities.concepts.contains(&"Jamba".to_string()));
    // stop word and lexicon hit are not repeated as concepts
    assert!(!entities.concepts.iter().any(|c| c == "The" || c == "Transformer"));
    assert_eq!(entities.technologies, vec!["transformer"]);
}

#[test]
fn hashed_embeddings_are_normalized_and_deterministic() {
    let e = HashEmbedder::new(64);
    let a = e.embed_text("sparse mixture of experts routing");
    let b = e.embed_text("sparse mixture of experts routing");
    assert_eq!(a, b);
    assert_eq!(a.len(), 64);
    let norm: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    assert!((norm - 1.0).abs() < 1e-5);
    assert!(e.embed_text("").iter().all(|x| *x == 0.0));
}

#[test]
fn shared_vocabulary_is_more_similar() {
    let e = RuleBasedProvider::new(Lexicon::default()).with_dim(512);
    let texts = vec![
        "diffusion models with image generation".to_string(),
        "image generation with diffusion models".to_string(),
        "quarterly revenue of cloud providers".to_string(),
    ];
    let v = e.embed_batch(&texts).expect("embed");
    let close = e.similarity(&v[0], &v[1]);
    let far = e.similarity(&v[0], &v[2]);
    assert!(close > 0.99, "same words, same bag: {close}");
    assert!(close > far);
}

struct BrokenNer;

impl EntityExtractor for BrokenNer {
    fn extract(&self, _text: &str) -> anyhow::Result<Entities> {
        anyhow::bail!("model not loaded")
    }
}

struct WrongDim;

impl Embedder for WrongDim {
    fn embedder_id(&self) -> &str {
        "wrong"
    }
    fn dim(&self) -> usize {
        8
    }
    fn embed_batch(&self, texts: &[String]) -> anyhow::Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|_| vec![1.0; 4]).collect())
    }
}

#[test]
fn model_backed_falls_back_to_lexicon_when_ner_fails() {
    let provider = ModelBackedProvider::new(Arc::new(HashEmbedder::new(16)), Lexicon::default()).with_ner(Arc::new(BrokenNer));
    let entities = provider.extract("Anthropic released a new model").expect("fallback");
    assert_eq!(entities.companies, vec!["anthropic"]);
}

#[test]
fn model_backed_rejects_wrong_dimensions() {
    let provider = ModelBackedProvider::new(Arc::new(WrongDim), Lexicon::default());
    let err = provider.embed_batch(&["x".to_string()]).unwrap_err();
    assert!(err.to_string().contains("expected 8"));
}

#[test]
fn model_backed_delegates_embedding_and_similarity() {
    let inner = Arc::new(HashEmbedder::new(32));
    let provider = ModelBackedProvider::new(inner.clone(), Lexicon::default());
    assert_eq!(provider.embedder_id(), inner.embedder_id());
    let v = provider.embed_batch(&["agents".to_string(), "agents".to_string()]).expect("embed");
    assert!((cosine_similarity(&v[0], &v[1]) - 1.0).abs() < 1e-5);
}
