use thiserror::Error;

#[derive(Debug, Error)]
pub enum PrMinerError {
    #[error(transparent)]
    Storage(#[from] storage_gateway::StorageError),

    #[error(transparent)]
    Cache(#[from] fact_cache::FactCacheError),

    #[error(transparent)]
    Serde(#[from] serde_json::Error),
}

pub type PrMinerResult<T> = Result<T, PrMinerError>;
