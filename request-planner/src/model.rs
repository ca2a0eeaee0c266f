//! Request/response shapes for `metricsCurrentValues` (SPEC_FULL §4.1).

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use storage_gateway::model::{MetricValue, TeamId, UserNodeId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimeInterval {
    pub from: DateTime<Utc>,
    pub to: DateTime<Utc>,
}

impl TimeInterval {
    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        at >= self.from && at <= self.to
    }
}

/// One caller's ask: a set of metric names, evaluated over a set of time
/// intervals, for a set of teams. Distinct callers asking for overlapping
/// slices of the same underlying data are merged by [`crate::simplify`]
/// before any mining happens.
#[derive(Debug, Clone)]
pub struct TeamMetricsRequest {
    pub metrics: Vec<String>,
    pub time_intervals: Vec<TimeInterval>,
    pub teams: HashMap<TeamId, Vec<UserNodeId>>,
}

/// `interval -> metric name -> team -> value`, the shape `_build_metrics_response`
/// walks to answer the original per-team, per-interval, per-metric grid.
pub type TeamMetricsResult = HashMap<TimeInterval, HashMap<String, HashMap<TeamId, MetricValue>>>;
