use thiserror::Error;

#[derive(Debug, Error)]
pub enum PrefixerError {
    #[error(transparent)]
    Storage(#[from] storage_gateway::StorageError),

    #[error("invalid tag regex for {repository}: {source}")]
    InvalidTagRegex {
        repository: String,
        #[source]
        source: regex::Error,
    },

    #[error("invalid branch glob for {repository}: {source}")]
    InvalidBranchGlob {
        repository: String,
        #[source]
        source: globset::Error,
    },
}

pub type PrefixerResult<T> = Result<T, PrefixerError>;
