//! POST /v1/pull-requests/filter (SPEC_FULL §6 `filterPullRequests`).
//!
//! `with` and `properties` are resolved after mining rather than folded
//! into the miner's own `ParticipantFilter`/category machinery: the miner
//! filters by node id, while this request shape names participants by
//! login, so a `Prefixer` pass over the mined set's own participants
//! resolves the join without a reverse login→id lookup the metadata store
//! doesn't expose.

use std::collections::HashSet;
use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use chrono::{DateTime, Utc};
use prefixer::Prefixer;
use pr_miner::model::LabelFilter;
use pr_miner::{mine_pull_requests_cached, MiningRequest, ParticipantFilter, PrBundle};
use serde::Deserialize;
use storage_gateway::RequestContext;

use crate::app_state::{AccountIdHeader, AppState};
use crate::error_handler::AppResult;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct FilterPullRequestsRequest {
    pub date_from: DateTime<Utc>,
    pub date_to: DateTime<Utc>,
    #[serde(default, rename = "in")]
    pub repositories: Vec<String>,
    #[serde(default)]
    pub properties: Vec<String>,
    #[serde(default)]
    pub with: std::collections::HashMap<String, Vec<String>>,
    #[serde(default)]
    pub labels_include: Vec<Vec<String>>,
    #[serde(default)]
    pub labels_exclude: Vec<String>,
    #[serde(default)]
    pub exclude_inactive: bool,
}

fn matches_properties(bundle: &PrBundle, properties: &[String]) -> bool {
    if properties.is_empty() {
        return true;
    }
    let t = &bundle.facts.timestamps;
    properties.iter().any(|p| match p.as_str() {
        "open" => t.closed.is_none(),
        "merged" => t.merged.is_some(),
        "closed" => t.closed.is_some() && t.merged.is_none(),
        _ => true,
    })
}

fn matches_with(bundle: &PrBundle, with: &std::collections::HashMap<String, Vec<String>>, prefixer: &Prefixer) -> bool {
    if with.is_empty() {
        return true;
    }
    let participants = &bundle.facts.participants;
    with.iter().any(|(role, logins)| {
        let ids: Vec<_> = match role.as_str() {
            "author" => participants.author.into_iter().collect(),
            "reviewer" => participants.reviewers.iter().copied().collect(),
            "commenter" => participants.commenters.iter().copied().collect(),
            "commit_author" => participants.commit_authors.iter().copied().collect(),
            "commit_committer" => participants.commit_committers.iter().copied().collect(),
            _ => Vec::new(),
        };
        ids.iter().filter_map(|id| prefixer.login(*id)).any(|login| logins.iter().any(|l| l == login))
    })
}

pub async fn filter_pull_requests(
    State(state): State<Arc<AppState>>,
    AccountIdHeader(account): AccountIdHeader,
    Json(body): Json<FilterPullRequestsRequest>,
) -> AppResult<Json<Vec<PrBundle>>> {
    let labels = LabelFilter { include: body.labels_include.clone(), exclude: body.labels_exclude.clone() };
    let request = MiningRequest {
        repositories: &body.repositories,
        window_from: body.date_from,
        window_to: body.date_to,
        participants: &ParticipantFilter::default(),
        labels: &labels,
        blacklist: &HashSet::new(),
        released_at: &Default::default(),
        exclude_inactive: body.exclude_inactive,
    };
    let bundles = mine_pull_requests_cached(
        state.metadata.as_ref(),
        state.cache.as_ref(),
        &RequestContext::new(),
        account,
        Vec::new(),
        request,
    )
    .await?;

    let user_ids: Vec<_> = bundles
        .iter()
        .flat_map(|b| {
            let p = &b.facts.participants;
            p.author
                .into_iter()
                .chain(p.reviewers.iter().copied())
                .chain(p.commenters.iter().copied())
                .chain(p.commit_authors.iter().copied())
                .chain(p.commit_committers.iter().copied())
        })
        .collect();
    let prefixer = Prefixer::load(state.metadata.as_ref(), &user_ids, &[]).await?;

    let filtered: Vec<PrBundle> = bundles
        .into_iter()
        .filter(|b| matches_properties(b, &body.properties) && matches_with(b, &body.with, &prefixer))
        .collect();

    Ok(Json(filtered))
}
