use thiserror::Error;

#[derive(Debug, Error)]
pub enum HeaterError {
    #[error(transparent)]
    Storage(#[from] storage_gateway::StorageError),

    #[error(transparent)]
    Prefixer(#[from] prefixer::PrefixerError),

    #[error(transparent)]
    Pr(#[from] pr_miner::PrMinerError),

    #[error(transparent)]
    Release(#[from] release_miner::ReleaseMinerError),
}

pub type HeaterResult<T> = Result<T, HeaterError>;
