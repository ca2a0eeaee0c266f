use thiserror::Error;

#[derive(Debug, Error)]
pub enum FactCacheError {
    #[error(transparent)]
    Storage(#[from] storage_gateway::StorageError),

    #[error("fact payload build failed: {0}")]
    Build(String),

    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

pub type FactCacheResult<T> = Result<T, FactCacheError>;
