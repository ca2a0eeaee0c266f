//! Orchestrates the fetch → disambiguate → aggregate pipeline
//! (SPEC_FULL §4.4).

use crate::aggregate::aggregate;
use crate::disambiguate::disambiguate;
use crate::error::CheckRunMinerResult;
use crate::model::{CheckMask, CheckRunGroupStats};
use crate::suite_override::apply_suite_override;
use crate::timeline::{bucket_boundaries, granularity_for_window};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use storage_gateway::model::PrNodeId;
use storage_gateway::MetadataStore;

pub struct CheckRunMiningRequest<'a> {
    pub repositories: &'a [String],
    pub pushers: &'a [String],
    pub window_from: DateTime<Utc>,
    pub window_to: DateTime<Utc>,
}

/// Returns the window's bucket-boundary timeline plus the `(total,
/// prs-only)` aggregated list views, each row's timeline arrays aligned to
/// that same boundary sequence.
pub async fn mine_check_runs(
    metadata: &dyn MetadataStore,
    request: &CheckRunMiningRequest<'_>,
) -> CheckRunMinerResult<(Vec<DateTime<Utc>>, Vec<CheckRunGroupStats>, Vec<CheckRunGroupStats>)> {
    let mut raw = metadata
        .fetch_check_runs_in_window(
            request.repositories,
            request.pushers,
            request.window_from,
            request.window_to,
        )
        .await?;

    let in_window_pr_ids: Vec<PrNodeId> =
        raw.iter().filter_map(|r| r.pull_request_node_id).collect();
    if !in_window_pr_ids.is_empty() {
        let outside = metadata.fetch_check_runs_for_prs(&in_window_pr_ids).await?;
        raw.extend(outside);
    }

    let pr_ids: Vec<PrNodeId> = {
        let mut ids: Vec<PrNodeId> = raw.iter().filter_map(|r| r.pull_request_node_id).collect();
        ids.sort_unstable();
        ids.dedup();
        ids
    };
    let prs = metadata.fetch_prs_by_ids(&pr_ids).await?;
    let links = metadata.fetch_pr_commit_links(&pr_ids).await?;
    let mut commit_counts: HashMap<PrNodeId, usize> = HashMap::new();
    for link in &links {
        *commit_counts.entry(link.pr_node_id).or_insert(0) += 1;
    }

    let disambiguated = apply_suite_override(disambiguate(raw, &prs, &commit_counts));

    let granularity = granularity_for_window(request.window_from, request.window_to);
    let timeline = bucket_boundaries(request.window_from, request.window_to, granularity);

    let total = aggregate(&disambiguated, CheckMask::Total, &timeline);
    let prs_only = aggregate(&disambiguated, CheckMask::PrsOnly, &timeline);
    Ok((timeline, total, prs_only))
}
