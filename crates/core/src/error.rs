use thiserror::Error;

pub type TrendResult<T> = Result<T, TrendError>;

#[derive(Error, Debug)]
pub enum TrendError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Malformed payload: {0}")]
    Payload(String),

    #[error("Unknown event type code: {0}")]
    UnknownEventType(u8),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}
