//! POST /v1/commits/filter (SPEC_FULL §6 `filterCommits`).
//!
//! The metadata store's interface discovers commits only through
//! PR↔commit links (`fetch_pr_commit_links`), so `bypassing_prs` — commits
//! that never went through a pull request — is always empty here; a real
//! deployment's metadata store would expose a window-scoped commit fetch
//! this stub interface does not.

use std::collections::HashSet;
use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use chrono::{DateTime, Utc};
use prefixer::Prefixer;
use serde::{Deserialize, Serialize};
use storage_gateway::model::RawCommit;

use crate::app_state::AppState;
use crate::error_handler::AppResult;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct FilterCommitsRequest {
    pub date_from: DateTime<Utc>,
    pub date_to: DateTime<Utc>,
    #[serde(default, rename = "in")]
    pub repositories: Vec<String>,
    #[serde(default = "default_property")]
    pub property: String,
    #[serde(default)]
    pub with_author: Vec<String>,
    #[serde(default)]
    pub with_committer: Vec<String>,
}

fn default_property() -> String {
    "everything".to_string()
}

#[derive(Debug, Serialize)]
pub struct CommitWithAvatars {
    #[serde(flatten)]
    pub commit: RawCommit,
    pub author_login: Option<String>,
    pub committer_login: Option<String>,
}

pub async fn filter_commits(
    State(state): State<Arc<AppState>>,
    Json(body): Json<FilterCommitsRequest>,
) -> AppResult<Json<Vec<CommitWithAvatars>>> {
    let prs = state.metadata.fetch_prs_in_window(&body.repositories, body.date_from, body.date_to).await?;
    let merge_shas: HashSet<&str> = prs.iter().filter_map(|p| p.merge_commit_sha.as_deref()).collect();
    let pr_ids: Vec<_> = prs.iter().map(|p| p.node_id).collect();
    let links = state.metadata.fetch_pr_commit_links(&pr_ids).await?;
    let shas: Vec<String> = links.into_iter().map(|l| l.commit_sha).collect();

    let commits = if body.property == "bypassing_prs" {
        Vec::new()
    } else {
        let mut commits = state.metadata.fetch_commits(&shas).await?;
        if body.property == "no_pr_merges" {
            commits.retain(|c| !merge_shas.contains(c.sha.as_str()));
        }
        commits
    };

    let user_ids: Vec<_> = commits.iter().flat_map(|c| c.author.into_iter().chain(c.committer)).collect();
    let prefixer = Prefixer::load(state.metadata.as_ref(), &user_ids, &[]).await?;

    let result = commits
        .into_iter()
        .filter(|c| {
            let author_login = c.author.and_then(|a| prefixer.login(a));
            let committer_login = c.committer.and_then(|a| prefixer.login(a));
            (body.with_author.is_empty() || author_login.is_some_and(|l| body.with_author.iter().any(|w| w == l)))
                && (body.with_committer.is_empty()
                    || committer_login.is_some_and(|l| body.with_committer.iter().any(|w| w == l)))
        })
        .map(|c| {
            let author_login = c.author.and_then(|a| prefixer.login(a)).map(String::from);
            let committer_login = c.committer.and_then(|a| prefixer.login(a)).map(String::from);
            CommitWithAvatars { commit: c, author_login, committer_login }
        })
        .collect();

    Ok(Json(result))
}
