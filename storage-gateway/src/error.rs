use thiserror::Error;

/// Crate-wide error type for all four logical stores.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("transient upstream failure: {0}")]
    Transient(String),

    #[error("call to {store} timed out after {elapsed_ms}ms")]
    Timeout { store: &'static str, elapsed_ms: u64 },

    #[error("invalid query: {0}")]
    InvalidQuery(String),

    #[error("internal storage error: {0}")]
    Internal(String),
}

impl StorageError {
    /// Whether this failure is worth retrying on the outer schedule.
    ///
    /// Mirrors the source system's `measure_db_overhead_and_retry`: timeouts
    /// and explicitly transient failures are retried, everything else
    /// propagates on the first attempt.
    pub fn is_transient(&self) -> bool {
        matches!(self, StorageError::Transient(_) | StorageError::Timeout { .. })
    }
}

pub type StorageResult<T> = Result<T, StorageError>;
