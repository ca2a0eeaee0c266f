use chrono::{DateTime, Utc};
use serde::Serialize;
use storage_gateway::model::{CheckConclusion, CheckRunStatus, PrNodeId};

/// One check run after disambiguation, status-context merge, re-run
/// splitting, and clamping (SPEC_FULL §4.4 steps 2-5). `suite_id` is
/// synthetic: it may differ from the raw `check_suite_node_id` once a
/// re-run has been split off into its own disjoint suite.
#[derive(Debug, Clone, PartialEq)]
pub struct DisambiguatedCheckRun {
    pub check_run_node_id: String,
    pub suite_id: String,
    pub repository_full_name: String,
    pub name: String,
    pub status: CheckRunStatus,
    pub conclusion: Option<CheckConclusion>,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub commit_sha: String,
    pub url: Option<String>,
    pub pull_request_node_id: Option<PrNodeId>,
}

impl DisambiguatedCheckRun {
    pub fn is_success(&self) -> bool {
        matches!(self.conclusion, Some(CheckConclusion::Success))
    }

    pub fn is_skip(&self) -> bool {
        matches!(self.conclusion, Some(CheckConclusion::Neutral))
    }

    pub fn is_failure(&self) -> bool {
        matches!(
            self.conclusion,
            Some(CheckConclusion::Failure)
                | Some(CheckConclusion::TimedOut)
                | Some(CheckConclusion::Cancelled)
                | Some(CheckConclusion::Error)
        )
    }

    pub fn execution_seconds(&self) -> Option<f64> {
        self.completed_at
            .map(|end| (end - self.started_at).num_milliseconds() as f64 / 1000.0)
    }
}

/// `total` counts every run; `prs-only` counts only runs attributed to a
/// pull request (SPEC_FULL §4.4 "Aggregation into list view").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CheckMask {
    Total,
    PrsOnly,
}

impl CheckMask {
    pub fn includes(&self, run: &DisambiguatedCheckRun) -> bool {
        match self {
            CheckMask::Total => true,
            CheckMask::PrsOnly => run.pull_request_node_id.is_some(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimelineGranularity {
    Daily,
    Weekly,
    Monthly,
}

/// One row per `(repository, name)` (the SPEC_FULL §4.4 "list view" row
/// shape): whole-window totals plus, for each of `count`, `successes`,
/// `mean_execution_time`, `median_execution_time`, a parallel per-bucket
/// timeline array aligned to the mining call's returned timeline boundaries.
/// `last_execution_time`, `last_execution_url`, and `size_groups` are
/// computed over the whole group, never per-bucket.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CheckRunGroupStats {
    pub repository_full_name: String,
    pub name: String,
    pub count: usize,
    pub successes: usize,
    pub skips: usize,
    pub flaky_count: usize,
    pub mean_execution_time: Option<f64>,
    pub median_execution_time: Option<f64>,
    pub count_timeline: Vec<usize>,
    pub successes_timeline: Vec<usize>,
    pub mean_execution_time_timeline: Vec<Option<f64>>,
    pub median_execution_time_timeline: Vec<Option<f64>>,
    pub last_execution_time: Option<DateTime<Utc>>,
    pub last_execution_url: Option<String>,
    pub size_groups: Vec<usize>,
}
