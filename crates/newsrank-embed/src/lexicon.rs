use std::collections::HashSet;

use newsrank_core::config::Lexicon;
use newsrank_core::types::Entities;

use crate::words;

/// Rule-based entity recognition.
///
/// Lexicon entries match on whole-word boundaries, case-insensitively.
/// Unknown capitalized words longer than `min_proper_noun_len` that are not
/// stop words are reported as concepts; this heuristic is low-precision.
#[derive(Debug, Clone)]
pub struct LexiconExtractor {
    lexicon: Lexicon,
    stop_words: HashSet<String>,
}

impl LexiconExtractor {
    pub fn new(lexicon: Lexicon) -> Self {
        let stop_words = lexicon.stop_words.iter().map(|s| s.to_lowercase()).collect();
        Self { lexicon, stop_words }
    }

    pub fn extract_entities(&self, text: &str) -> Entities {
        let padded = format!(" {} ", words(text).join(" "));
        let mut seen = HashSet::new();
        let mut out = Entities::default();
        match_terms(&self.lexicon.companies, &padded, &mut out.companies, &mut seen);
        match_terms(&self.lexicon.technologies, &padded, &mut out.technologies, &mut seen);
        match_terms(&self.lexicon.people, &padded, &mut out.people, &mut seen);
        match_terms(&self.lexicon.concepts, &padded, &mut out.concepts, &mut seen);
        match_terms(&self.lexicon.products, &padded, &mut out.products, &mut seen);

        for raw in text.split_whitespace() {
            let word = raw.trim_matches(|c: char| !c.is_alphanumeric());
            let capitalized = word.chars().next().is_some_and(char::is_uppercase);
            if !capitalized || word.chars().count() <= self.lexicon.min_proper_noun_len { continue; }
            let lower = word.to_lowercase();
            if self.stop_words.contains(&lower) { continue; }
            if seen.insert(lower) { out.concepts.push(word.to_string()); }
        }
        out
    }
}

fn match_terms(terms: &[String], padded: &str, out: &mut Vec<String>, seen: &mut HashSet<String>) {
    for term in terms {
        let key = words(term).join(" ");
        if key.is_empty() || !padded.contains(&format!(" {key} ")) { continue; }
        for part in key.split(' ') { seen.insert(part.to_string()); }
        if !out.contains(&key) { out.push(key.clone()); }
        seen.insert(key);
    }
}
