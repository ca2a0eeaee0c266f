//! POST /v1/metrics/current-values (SPEC_FULL §6 `metricsCurrentValues`).

use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use chrono::{DateTime, Utc};
use prefixer::compile_all;
use request_planner::{calculate_team_metrics, PlannerContext, TeamMetricsRequest, TimeInterval};
use serde::{Deserialize, Serialize};
use storage_gateway::model::{flatten_team_tree, AccountId, MetricValue, TeamId};
use storage_gateway::RequestContext;

use crate::app_state::AppState;
use crate::error_handler::{AppError, AppResult};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsCurrentValuesRequest {
    pub account_id: AccountId,
    pub params: MetricsParams,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsParams {
    pub team_id: TeamId,
    pub metrics: Vec<String>,
    pub valid_from: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricValueEntry {
    pub metric: String,
    pub team_id: TeamId,
    pub value: MetricValue,
}

pub async fn metrics_current_values(
    State(state): State<Arc<AppState>>,
    Json(body): Json<MetricsCurrentValuesRequest>,
) -> AppResult<Json<Vec<MetricValueEntry>>> {
    let teams = state.state.list_teams(body.account_id).await?;
    let members: Vec<_> = flatten_team_tree(&teams, body.params.team_id).into_iter().collect();

    let interval = TimeInterval { from: body.params.valid_from, to: body.params.expires_at };
    let mut team_map = HashMap::new();
    team_map.insert(body.params.team_id, members);
    let request = TeamMetricsRequest {
        metrics: body.params.metrics.clone(),
        time_intervals: vec![interval],
        teams: team_map,
    };

    let repo_sets = state.state.list_repository_sets(body.account_id).await?;
    let repositories: Vec<String> =
        repo_sets.iter().flat_map(|rs| rs.repo_names().into_iter().map(String::from)).collect();
    let raw_settings = state.state.get_release_match_settings(body.account_id).await?;
    let release_settings = compile_all(&raw_settings).map_err(|e| AppError::RequestInvalid {
        detail: e.to_string(),
        pointer: Some("/accountId".into()),
    })?;

    let ctx = PlannerContext {
        metadata: state.metadata.clone(),
        cache: state.cache.clone(),
        request_ctx: RequestContext::new(),
        account: body.account_id,
        repositories: Arc::new(repositories),
        blacklist: Arc::new(Default::default()),
    };

    let result = calculate_team_metrics(&ctx, state.precomputed.as_ref(), &release_settings, vec![request]).await?;

    let mut entries = Vec::new();
    if let Some(by_metric) = result.get(&interval) {
        for (metric, by_team) in by_metric {
            for (team_id, value) in by_team {
                entries.push(MetricValueEntry { metric: metric.clone(), team_id: *team_id, value: *value });
            }
        }
    }
    Ok(Json(entries))
}
