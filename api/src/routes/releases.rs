//! POST /v1/releases/filter (SPEC_FULL §6 `filterReleases`).

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use chrono::{DateTime, Utc};
use prefixer::{compile_all, Prefixer};
use release_miner::{mine_releases_cached, Release};
use release_miner::ReleaseMiningRequest;
use serde::{Deserialize, Serialize};
use storage_gateway::RequestContext;

use crate::app_state::{AccountIdHeader, AppState};
use crate::error_handler::{AppError, AppResult};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct FilterReleasesRequest {
    pub date_from: DateTime<Utc>,
    pub date_to: DateTime<Utc>,
    #[serde(default, rename = "in")]
    pub repositories: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct ReleaseWithAuthors {
    #[serde(flatten)]
    pub release: Release,
    pub pr_count: usize,
    pub commit_author_logins: Vec<String>,
}

pub async fn filter_releases(
    State(state): State<Arc<AppState>>,
    AccountIdHeader(account): AccountIdHeader,
    Json(body): Json<FilterReleasesRequest>,
) -> AppResult<Json<Vec<ReleaseWithAuthors>>> {
    let raw_settings = state.state.get_release_match_settings(account).await?;
    let mut settings = compile_all(&raw_settings).map_err(|e| AppError::RequestInvalid { detail: e.to_string(), pointer: None })?;
    if !body.repositories.is_empty() {
        settings.retain(|s| body.repositories.contains(&s.repository_full_name));
    }

    let request = ReleaseMiningRequest { settings: &settings, hide_first_release: true };
    let releases = mine_releases_cached(
        state.metadata.as_ref(),
        state.precomputed.as_ref(),
        state.cache.as_ref(),
        &RequestContext::new(),
        account,
        &request,
    )
    .await?;

    let in_window: Vec<Release> =
        releases.into_iter().filter(|r| r.published_at >= body.date_from && r.published_at <= body.date_to).collect();

    let user_ids: Vec<_> = in_window.iter().flat_map(|r| r.commit_authors.iter().copied()).collect();
    let prefixer = Prefixer::load(state.metadata.as_ref(), &user_ids, &[]).await?;

    let result = in_window
        .into_iter()
        .map(|r| {
            let pr_count = r.prs.len();
            let commit_author_logins = prefixer.resolve_logins(r.commit_authors.iter().copied()).into_iter().map(String::from).collect();
            ReleaseWithAuthors { release: r, pr_count, commit_author_logins }
        })
        .collect();

    Ok(Json(result))
}
