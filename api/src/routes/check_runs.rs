//! POST /v1/check-runs/filter (SPEC_FULL §6 `filterCheckRuns`).
//!
//! `jira` (restricting to check runs on PRs linked to a JIRA issue) and
//! `quantiles` (a confidence-interval cutoff for the timing stats) aren't
//! modeled by `check_run_miner`'s aggregation — both are accepted and
//! ignored here, consistent with this surface's "thin stub" scope.
//!
//! `timeline` is the mining call's own bucket-boundary sequence; `stats`
//! and `prs_only_stats` are the per-`(repository, name)` rows for the
//! `total` and `prs-only` masks, each row's `*_timeline` arrays aligned to
//! `timeline`.

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use check_run_miner::{mine_check_runs, CheckRunGroupStats, CheckRunMiningRequest};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::app_state::AppState;
use crate::error_handler::AppResult;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct FilterCheckRunsRequest {
    pub time_from: DateTime<Utc>,
    pub time_to: DateTime<Utc>,
    #[serde(default)]
    pub repositories: Vec<String>,
    #[serde(default)]
    pub pushers: Vec<String>,
    #[serde(default)]
    pub jira: Option<String>,
    #[serde(default)]
    pub quantiles: Option<[f64; 2]>,
}

#[derive(Debug, Serialize)]
pub struct FilterCheckRunsResponse {
    pub timeline: Vec<DateTime<Utc>>,
    pub stats: Vec<CheckRunGroupStats>,
    pub prs_only_stats: Vec<CheckRunGroupStats>,
}

pub async fn filter_check_runs(
    State(state): State<Arc<AppState>>,
    Json(body): Json<FilterCheckRunsRequest>,
) -> AppResult<Json<FilterCheckRunsResponse>> {
    let request = CheckRunMiningRequest {
        repositories: &body.repositories,
        pushers: &body.pushers,
        window_from: body.time_from,
        window_to: body.time_to,
    };
    let (timeline, stats, prs_only_stats) = mine_check_runs(state.metadata.as_ref(), &request).await?;
    Ok(Json(FilterCheckRunsResponse { timeline, stats, prs_only_stats }))
}
