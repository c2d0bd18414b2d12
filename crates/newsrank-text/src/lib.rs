//! newsrank-text
//!
//! In-memory inverted and entity indexes over enriched articles, with the
//! keyword (BM25) and entity retrieval channels built on top of them.

pub mod analyzer;
pub mod index;
pub mod bm25;
pub mod entity;

pub use analyzer::Tokenizer;
pub use index::{normalize_entity, ArticleIndex};
pub use bm25::{Bm25Params, KeywordRetriever};
pub use entity::EntityRetriever;
