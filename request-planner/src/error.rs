//! Errors surfaced by the planner. `Invalid` covers the two request-shape
//! checks SPEC_FULL §4.1 calls out explicitly (unknown metric, bad window);
//! everything else wraps a downstream miner/cache failure unchanged.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PlannerError {
    #[error("invalid metrics request: {0}")]
    Invalid(String),

    #[error(transparent)]
    Metric(#[from] metric_calculators::MetricError),

    #[error(transparent)]
    Pr(#[from] pr_miner::PrMinerError),

    #[error(transparent)]
    Release(#[from] release_miner::ReleaseMinerError),

    #[error(transparent)]
    Storage(#[from] storage_gateway::StorageError),
}

pub type PlannerResult<T> = Result<T, PlannerError>;
