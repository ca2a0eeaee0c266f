use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReleaseMinerError {
    #[error(transparent)]
    Storage(#[from] storage_gateway::StorageError),

    #[error(transparent)]
    Prefixer(#[from] prefixer::PrefixerError),

    #[error(transparent)]
    Cache(#[from] fact_cache::FactCacheError),

    #[error(transparent)]
    Serde(#[from] serde_json::Error),
}

pub type ReleaseMinerResult<T> = Result<T, ReleaseMinerError>;
