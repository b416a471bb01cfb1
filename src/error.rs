//! Error types for the sentiment pipeline

use thiserror::Error;

#[derive(Error, Debug)]
pub enum MindshareError {
    #[error("Classifier error: {0}")]
    Classifier(String),

    #[error("Embedding error: {0}")]
    Embedder(String),

    #[error("Data source error: {0}")]
    Source(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Market not found: {0}")]
    MarketNotFound(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, MindshareError>;
