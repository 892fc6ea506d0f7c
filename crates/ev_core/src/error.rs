use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Fetch error: {0}")]
    Fetch(String),

    #[error("Inference error: {0}")]
    Inference(String),

    #[error("Storage error: {0}")]
    Storage(String),

    /// A caller broke an explicit-parameter contract. Never degraded.
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("External error: {0}")]
    External(#[from] anyhow::Error),
}

impl Error {
    pub fn is_config(&self) -> bool {
        matches!(self, Error::Config(_))
    }

    /// Transient failures worth another attempt.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Error::Http(_) | Error::Inference(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
