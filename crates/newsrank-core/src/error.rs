use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("Validation failed: {0}")]
    Validation(String),
    #[error("Index not built: call index_articles first")]
    IndexNotBuilt,
    #[error("Channel '{channel}' unavailable: {reason}")]
    ChannelUnavailable { channel: &'static str, reason: String },
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Operation failed: {0}")]
    Operation(String),
}

impl Error {
    pub fn unknown_persona(name: &str) -> Self {
        Self::Validation(format!("unknown persona '{name}' (expected engineer or business)"))
    }

    pub fn channel(channel: &'static str, reason: impl std::fmt::Display) -> Self {
        Self::ChannelUnavailable { channel, reason: reason.to_string() }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
