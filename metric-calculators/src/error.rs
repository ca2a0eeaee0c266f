use thiserror::Error;

#[derive(Debug, Error)]
pub enum MetricError {
    #[error("unknown metric: {0}")]
    UnknownMetric(String),
}

pub type MetricResult<T> = Result<T, MetricError>;
