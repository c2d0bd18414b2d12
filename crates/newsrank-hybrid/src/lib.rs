pub mod boost;
pub mod engine;
pub mod filters;
pub mod fusion;
pub mod presentation;
pub mod rerank;
pub mod topics;

pub use engine::{RankingEngine, RankingEngineBuilder};
pub use fusion::{fuse, ChannelHits, ChannelWeights};
pub use rerank::{rerank_channel, NullRerankChannel, RealRerankChannel, RerankChannel};
