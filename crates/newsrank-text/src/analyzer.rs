use tantivy::tokenizer::{LowerCaser, SimpleTokenizer, TextAnalyzer, TokenStream};

/// Lowercasing word tokenizer shared by indexing and querying.
///
/// Splits on any non-alphanumeric character and drops tokens shorter than
/// `min_len` characters.
#[derive(Clone)]
pub struct Tokenizer {
	analyzer: TextAnalyzer,
	min_len: usize,
}

impl Tokenizer {
	pub fn new(min_len: usize) -> Self {
		let analyzer = TextAnalyzer::builder(SimpleTokenizer::default()).filter(LowerCaser).build();
		Self { analyzer, min_len }
	}

	pub fn tokenize(&self, text: &str) -> Vec<String> {
		let mut analyzer = self.analyzer.clone();
		let mut stream = analyzer.token_stream(text);
		let mut tokens = Vec::new();
		while stream.advance() {
			let token = &stream.token().text;
			if token.chars().count() >= self.min_len { tokens.push(token.clone()); }
		}
		tokens
	}

	/// Distinct tokens in first-seen order.
	pub fn unique_terms(&self, text: &str) -> Vec<String> {
		let mut seen = std::collections::HashSet::new();
		self.tokenize(text).into_iter().filter(|t| seen.insert(t.clone())).collect()
	}
}

impl Default for Tokenizer {
	fn default() -> Self { Self::new(3) }
}
