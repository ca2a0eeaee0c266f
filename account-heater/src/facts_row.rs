//! Converts a mined [`pr_miner::PrBundle`] into the durable row shape
//! SPEC_FULL §6 describes for the PR-times table.

use chrono::{DateTime, TimeZone, Utc};
use prefixer::{CompiledReleaseSettings, Prefixer};
use pr_miner::PrBundle;
use std::collections::HashMap;
use storage_gateway::model::{PrFactsCategory, PrFactsRow, UserNodeId};

pub const PR_FACTS_FORMAT_VERSION: u32 = 1;

fn category_for(bundle: &PrBundle) -> PrFactsCategory {
    if bundle.facts.timestamps.closed.is_some() {
        PrFactsCategory::Done
    } else if bundle.facts.timestamps.merged.is_some() {
        PrFactsCategory::Merged
    } else {
        PrFactsCategory::Open
    }
}

fn release_match_for<'a>(bundle: &PrBundle, settings: &'a [CompiledReleaseSettings]) -> &'a str {
    settings
        .iter()
        .find(|s| s.repository_full_name == bundle.facts.repository_full_name)
        .map(|s| s.fingerprint.as_str())
        .unwrap_or("none")
}

fn activity_days(bundle: &PrBundle) -> Vec<DateTime<Utc>> {
    let mut days: Vec<DateTime<Utc>> = std::iter::once(bundle.pr.created_at)
        .chain(bundle.pr.closed_at)
        .chain(bundle.pr.merged_at)
        .chain(bundle.reviews.iter().map(|r| r.submitted_at))
        .chain(bundle.comments.iter().map(|c| c.created_at))
        .chain(bundle.commits.iter().map(|c| c.authored_at))
        .map(|t| Utc.from_utc_datetime(&t.date_naive().and_hms_opt(0, 0, 0).unwrap()))
        .collect();
    days.sort();
    days.dedup();
    days
}

fn login_map(ids: impl IntoIterator<Item = UserNodeId>, prefixer: &Prefixer) -> HashMap<UserNodeId, String> {
    ids.into_iter()
        .filter_map(|id| prefixer.login(id).map(|login| (id, login.to_string())))
        .collect()
}

pub fn to_pr_facts_row(bundle: &PrBundle, settings: &[CompiledReleaseSettings], prefixer: &Prefixer) -> PrFactsRow {
    let payload = serde_json::to_vec(&bundle.facts).unwrap_or_default();
    let labels = bundle.facts.labels.iter().map(|l| (l.clone(), Utc::now())).collect();
    let participants = &bundle.facts.participants;

    PrFactsRow {
        pr_node_id: bundle.facts.pr_node_id,
        release_match: release_match_for(bundle, settings).to_string(),
        format_version: PR_FACTS_FORMAT_VERSION,
        category: category_for(bundle),
        payload,
        labels,
        activity_days: activity_days(bundle),
        authors: login_map(participants.author, prefixer),
        reviewers: login_map(participants.reviewers.iter().copied(), prefixer),
        commenters: login_map(participants.commenters.iter().copied(), prefixer),
        commit_authors: login_map(participants.commit_authors.iter().copied(), prefixer),
    }
}
