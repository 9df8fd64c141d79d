use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("KV request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("KV error: {0}")]
    Kv(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Not found")]
    NotFound,

    #[error("Configuration error: {0}")]
    Configuration(String),
}

pub type Result<T> = std::result::Result<T, StorageError>;

impl StorageError {
    pub fn is_wrong_type(&self) -> bool {
        matches!(self, StorageError::Kv(msg) if msg.starts_with("WRONGTYPE"))
    }
}
