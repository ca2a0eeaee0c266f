//! Top-level entry point: simplify, triage, dispatch, reshape
//! (SPEC_FULL §4.1).

use crate::dispatch::{mine_pr_facts, releases_for, PlannerContext};
use crate::error::{PlannerError, PlannerResult};
use crate::model::{TeamMetricsRequest, TeamMetricsResult, TimeInterval};
use crate::simplify::simplify_requests;
use chrono::Utc;
use metric_calculators::{jira, pr, registry, release, MetricFamily};
use prefixer::CompiledReleaseSettings;
use release_miner::{mine_releases_cached, ReleaseMiningRequest};
use storage_gateway::model::PrNodeId;
use storage_gateway::PrecomputedStore;
use std::collections::HashMap;

fn validate_window(interval: &TimeInterval) -> PlannerResult<()> {
    if interval.from > interval.to {
        return Err(PlannerError::Invalid(format!(
            "valid_from {} is after expires_at {}",
            interval.from, interval.to
        )));
    }
    if interval.from > Utc::now() {
        return Err(PlannerError::Invalid(format!("valid_from {} is in the future", interval.from)));
    }
    Ok(())
}

/// Splits a request's metric names into the three families, failing the
/// whole request (pointer `.metrics`) on the first name no registry knows.
fn triage(metrics: &[String]) -> PlannerResult<(Vec<pr::PrMetric>, Vec<release::ReleaseMetric>, Vec<jira::JiraMetric>)> {
    let families = registry::triage(metrics).map_err(|e| PlannerError::Invalid(e.to_string()))?;
    let mut pr_metrics = Vec::new();
    let mut release_metrics = Vec::new();
    let mut jira_metrics = Vec::new();
    for family in families {
        match family {
            MetricFamily::Pr(m) => pr_metrics.push(m),
            MetricFamily::Release(m) => release_metrics.push(m),
            MetricFamily::Jira(m) => jira_metrics.push(m),
        }
    }
    Ok((pr_metrics, release_metrics, jira_metrics))
}

/// Runs the full pipeline for a batch of requests from possibly-unrelated
/// callers, returning one merged `interval -> metric -> team -> value` map.
pub async fn calculate_team_metrics(
    ctx: &PlannerContext,
    precomputed: &dyn PrecomputedStore,
    release_settings: &[CompiledReleaseSettings],
    requests: Vec<TeamMetricsRequest>,
) -> PlannerResult<TeamMetricsResult> {
    for request in &requests {
        for interval in &request.time_intervals {
            validate_window(interval)?;
        }
    }

    let simplified = simplify_requests(requests);

    let release_request = ReleaseMiningRequest { settings: release_settings, hide_first_release: true };
    let releases = mine_releases_cached(
        ctx.metadata.as_ref(),
        precomputed,
        ctx.cache.as_ref(),
        &ctx.request_ctx,
        ctx.account,
        &release_request,
    )
    .await?;
    let released_at: HashMap<PrNodeId, chrono::DateTime<Utc>> = releases
        .iter()
        .flat_map(|r| r.prs.iter().map(move |pr_id| (*pr_id, r.published_at)))
        .collect();

    let mut result: TeamMetricsResult = HashMap::new();

    for request in simplified {
        let (pr_metrics, release_metrics, jira_metrics) = triage(&request.metrics)?;

        let facts_by_team_interval = if pr_metrics.is_empty() && jira_metrics.is_empty() {
            HashMap::new()
        } else {
            mine_pr_facts(ctx, &request.time_intervals, &request.teams, &released_at).await?
        };

        for interval in &request.time_intervals {
            let interval_entry = result.entry(*interval).or_default();

            for (&team_id, members) in &request.teams {
                let facts = facts_by_team_interval.get(&(*interval, team_id));
                let fact_refs: Vec<&pr_miner::model::PrFacts> = facts.map(|f| f.iter().collect()).unwrap_or_default();

                for metric in &pr_metrics {
                    let value = pr::calculate(*metric, &fact_refs);
                    interval_entry.entry(metric.identifier().to_string()).or_default().insert(team_id, value);
                }
                for metric in &jira_metrics {
                    let value = jira::calculate(*metric, &fact_refs);
                    interval_entry.entry(metric.identifier().to_string()).or_default().insert(team_id, value);
                }

                if !release_metrics.is_empty() {
                    let release_refs = releases_for(&releases, &ctx.repositories, *interval, members);
                    for metric in &release_metrics {
                        let value = release::calculate(*metric, &release_refs);
                        interval_entry.entry(metric.identifier().to_string()).or_default().insert(team_id, value);
                    }
                }
            }
        }
    }

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Duration};
    use std::collections::HashSet;
    use std::sync::Arc;
    use storage_gateway::mock::{InMemoryMetadataStore, InMemoryPrecomputedStore};
    use storage_gateway::model::{RawPullRequest, RawReview, RawReviewRequest, ReviewState};

    fn t(hours: i64) -> DateTime<Utc> {
        DateTime::<Utc>::from_timestamp(1_700_000_000, 0).unwrap() + Duration::hours(hours)
    }

    fn seed(store: &InMemoryMetadataStore) {
        store.seed_pr(RawPullRequest {
            node_id: 1,
            repository_full_name: "org/repo".into(),
            number: 1,
            author: Some(100),
            merged_by: None,
            created_at: t(0),
            closed_at: None,
            merged_at: None,
            additions: 1,
            deletions: 0,
            changed_files: 1,
            merge_commit_sha: None,
            title: "fix".into(),
            body: None,
        });
        store.seed_review_requests(1, vec![RawReviewRequest { pr_node_id: 1, requested_reviewer: 200, created_at: t(1) }]);
        store.seed_reviews(1, vec![RawReview { pr_node_id: 1, author: 200, state: ReviewState::Approved, submitted_at: t(2) }]);
    }

    fn ctx(metadata: Arc<dyn storage_gateway::MetadataStore>) -> PlannerContext {
        let durable = Arc::new(InMemoryPrecomputedStore::new());
        PlannerContext {
            metadata,
            cache: Arc::new(fact_cache::FactCache::new(durable, fact_cache::CURRENT_FORMAT_VERSION)),
            request_ctx: storage_gateway::RequestContext::new(),
            account: 1,
            repositories: Arc::new(vec!["org/repo".to_string()]),
            blacklist: Arc::new(HashSet::new()),
        }
    }

    #[tokio::test]
    async fn end_to_end_pr_metric_reaches_the_requesting_team() {
        let store = InMemoryMetadataStore::new();
        seed(&store);
        let metadata: Arc<dyn storage_gateway::MetadataStore> = Arc::new(store);
        let planner_ctx = ctx(metadata);
        let precomputed = InMemoryPrecomputedStore::new();

        let request = TeamMetricsRequest {
            metrics: vec!["pr-wip-time".to_string()],
            time_intervals: vec![TimeInterval { from: t(-24), to: t(24) }],
            teams: HashMap::from([(1, vec![100])]),
        };

        let result = calculate_team_metrics(&planner_ctx, &precomputed, &[], vec![request]).await.unwrap();
        let interval = TimeInterval { from: t(-24), to: t(24) };
        let value = &result[&interval]["pr-wip-time"][&1];
        assert!(value.exists);
        assert_eq!(value.value, Some(3600.0));
    }

    #[tokio::test]
    async fn unknown_metric_is_request_invalid() {
        let metadata: Arc<dyn storage_gateway::MetadataStore> = Arc::new(InMemoryMetadataStore::new());
        let planner_ctx = ctx(metadata);
        let precomputed = InMemoryPrecomputedStore::new();

        let request = TeamMetricsRequest {
            metrics: vec!["not-a-real-metric".to_string()],
            time_intervals: vec![TimeInterval { from: t(-24), to: t(24) }],
            teams: HashMap::from([(1, vec![100])]),
        };

        let err = calculate_team_metrics(&planner_ctx, &precomputed, &[], vec![request]).await.unwrap_err();
        assert!(matches!(err, PlannerError::Invalid(_)));
    }

    #[tokio::test]
    async fn inverted_window_is_request_invalid() {
        let metadata: Arc<dyn storage_gateway::MetadataStore> = Arc::new(InMemoryMetadataStore::new());
        let planner_ctx = ctx(metadata);
        let precomputed = InMemoryPrecomputedStore::new();

        let request = TeamMetricsRequest {
            metrics: vec!["pr-wip-time".to_string()],
            time_intervals: vec![TimeInterval { from: t(24), to: t(-24) }],
            teams: HashMap::from([(1, vec![100])]),
        };

        let err = calculate_team_metrics(&planner_ctx, &precomputed, &[], vec![request]).await.unwrap_err();
        assert!(matches!(err, PlannerError::Invalid(_)));
    }
}
