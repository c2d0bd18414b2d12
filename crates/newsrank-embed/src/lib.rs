pub mod hashed;
pub mod lexicon;
pub mod provider;

pub use hashed::HashEmbedder;
pub use lexicon::LexiconExtractor;
pub use provider::{ModelBackedProvider, RuleBasedProvider};

/// Lowercased alphanumeric words; `-` is kept inside words so
/// hyphenated lexicon entries ("fine-tuning") match.
pub(crate) fn words(text: &str) -> Vec<String> {
    text.split(|c: char| !(c.is_alphanumeric() || c == '-'))
        .map(|w| w.trim_matches('-').to_lowercase())
        .filter(|w| !w.is_empty())
        .collect()
}
