//! Per-family mining dispatch. PR and JIRA metrics both read PR facts, so a
//! single mining call per `(interval, team)` pair feeds both families —
//! this is the one place the planner fans out concurrently, one future per
//! pair, joined at a single barrier (`futures::future::try_join_all`) per
//! simplified request, mirroring the "gather one batch call per family"
//! shape of the original planner without requiring a literal vectorized
//! batch-calculator API.

use crate::error::{PlannerError, PlannerResult};
use crate::model::TimeInterval;
use chrono::{DateTime, Utc};
use futures::future::try_join_all;
use pr_miner::model::{LabelFilter, ParticipantFilter, ParticipantRole, PrFacts};
use pr_miner::MiningRequest;
use release_miner::Release;
use std::collections::{HashMap, HashSet};
use storage_gateway::model::{AccountId, PrNodeId, TeamId, UserNodeId};
use storage_gateway::{MetadataStore, RequestContext};

#[derive(Clone)]
pub struct PlannerContext {
    pub metadata: std::sync::Arc<dyn MetadataStore>,
    pub cache: std::sync::Arc<fact_cache::FactCache>,
    pub request_ctx: RequestContext,
    pub account: AccountId,
    pub repositories: std::sync::Arc<Vec<String>>,
    pub blacklist: std::sync::Arc<HashSet<PrNodeId>>,
}

/// One mining call per `(interval, team)`, fanned out concurrently and
/// joined once. Returns the PR facts feeding both the PR and JIRA metric
/// families for this request.
pub async fn mine_pr_facts(
    ctx: &PlannerContext,
    time_intervals: &[TimeInterval],
    teams: &HashMap<TeamId, Vec<UserNodeId>>,
    released_at: &HashMap<PrNodeId, DateTime<Utc>>,
) -> PlannerResult<HashMap<(TimeInterval, TeamId), Vec<PrFacts>>> {
    let mut futures = Vec::with_capacity(time_intervals.len() * teams.len());
    for interval in time_intervals {
        for (&team_id, members) in teams {
            let interval = *interval;
            let member_set: HashSet<UserNodeId> = members.iter().copied().collect();
            let ctx = ctx.clone();
            let released_at = released_at.clone();
            futures.push(async move {
                let mut by_role = HashMap::new();
                by_role.insert(ParticipantRole::Author, member_set);
                let filter = ParticipantFilter { by_role };
                let request = MiningRequest {
                    repositories: ctx.repositories.as_slice(),
                    window_from: interval.from,
                    window_to: interval.to,
                    participants: &filter,
                    labels: &LabelFilter::default(),
                    blacklist: ctx.blacklist.as_ref(),
                    released_at: &released_at,
                    exclude_inactive: true,
                };
                let bundles = pr_miner::mine_pull_requests_cached(
                    ctx.metadata.as_ref(),
                    ctx.cache.as_ref(),
                    &ctx.request_ctx,
                    ctx.account,
                    Vec::new(),
                    request,
                )
                .await?;
                let facts = bundles.into_iter().map(|b| b.facts).collect();
                Ok::<_, PlannerError>(((interval, team_id), facts))
            });
        }
    }
    Ok(try_join_all(futures).await?.into_iter().collect())
}

/// Releases for one `(interval, team)` pair are a plain in-memory filter of
/// the account's releases mined once up front by the caller — no further
/// network access, so this needs no fan-out of its own.
pub fn releases_for<'a>(
    releases: &'a [Release],
    repositories: &[String],
    interval: TimeInterval,
    members: &[UserNodeId],
) -> Vec<&'a Release> {
    let member_set: HashSet<UserNodeId> = members.iter().copied().collect();
    releases
        .iter()
        .filter(|r| repositories.iter().any(|repo| repo == &r.repository_full_name))
        .filter(|r| interval.contains(r.published_at))
        .filter(|r| member_set.is_empty() || r.commit_authors.iter().any(|a| member_set.contains(a)))
        .collect()
}
