use thiserror::Error;

#[derive(Debug, Error)]
pub enum CheckRunMinerError {
    #[error(transparent)]
    Storage(#[from] storage_gateway::StorageError),
}

pub type CheckRunMinerResult<T> = Result<T, CheckRunMinerError>;
