pub mod backfill;
pub mod cache;
pub mod channel;

pub use backfill::embed_articles;
pub use cache::{hash_content, CacheEntry, EmbeddingCache};
pub use channel::{semantic_channel, NullChannel, RealChannel, SemanticChannel};
