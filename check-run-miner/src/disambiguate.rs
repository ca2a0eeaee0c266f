//! SPEC_FULL §4.4 steps 2-5: duplicate-attribution resolution, status
//! context merging, re-run splitting, and clamping.

use crate::model::DisambiguatedCheckRun;
use chrono::Duration;
use std::collections::HashMap;
use storage_gateway::model::{CheckConclusion, PrNodeId, RawCheckRun, RawPullRequest};

/// A PR's lifetime window and the fields Pass B's tie-break needs.
struct PrContext {
    author: Option<i64>,
    created_at: chrono::DateTime<chrono::Utc>,
    closed_at: Option<chrono::DateTime<chrono::Utc>>,
    commit_count: usize,
}

/// Resolves every raw row (candidate attributions included) into at most
/// one surviving run per `check_run_node_id`, then merges status
/// contexts, splits re-runs, and clamps completion times.
pub fn disambiguate(
    raw_runs: Vec<RawCheckRun>,
    prs: &[RawPullRequest],
    commit_counts_by_pr: &HashMap<PrNodeId, usize>,
) -> Vec<DisambiguatedCheckRun> {
    let pr_ctx: HashMap<PrNodeId, PrContext> = prs
        .iter()
        .map(|pr| {
            (
                pr.node_id,
                PrContext {
                    author: pr.author,
                    created_at: pr.created_at,
                    closed_at: pr.closed_at,
                    commit_count: commit_counts_by_pr.get(&pr.node_id).copied().unwrap_or(0),
                },
            )
        })
        .collect();

    // Pass A compares a suite's start, not each run's own, against the PR
    // window (`_calculate_check_suite_started`'s groupby-min), so two runs
    // in the same suite are judged by the same timestamp.
    let mut suite_starts: HashMap<&str, chrono::DateTime<chrono::Utc>> = HashMap::new();
    for run in &raw_runs {
        suite_starts
            .entry(run.check_suite_node_id.as_str())
            .and_modify(|min| {
                if run.started_at < *min {
                    *min = run.started_at;
                }
            })
            .or_insert(run.started_at);
    }

    let mut by_run_id: HashMap<&str, Vec<&RawCheckRun>> = HashMap::new();
    for run in &raw_runs {
        by_run_id.entry(run.check_run_node_id.as_str()).or_default().push(run);
    }

    let resolved: Vec<RawCheckRun> = by_run_id
        .into_values()
        .filter_map(|candidates| resolve_one(candidates, &pr_ctx, &suite_starts))
        .collect();

    let merged = merge_status_contexts(resolved);
    let split = split_reruns(merged);
    split.into_iter().map(clamp).collect()
}

/// Pass A (lifetime filter) + Pass B (author/commit-count heuristic) for
/// one `check_run_node_id`'s candidate rows.
fn resolve_one(
    candidates: Vec<&RawCheckRun>,
    pr_ctx: &HashMap<PrNodeId, PrContext>,
    suite_starts: &HashMap<&str, chrono::DateTime<chrono::Utc>>,
) -> Option<RawCheckRun> {
    let base = candidates[0].clone();

    if candidates.len() == 1 {
        return Some(base);
    }

    // Pass A: keep candidates whose PR attribution has the run's *suite*
    // start inside [PR.created, PR.closed + 1h] (closed=None means still
    // open) — not the individual run's own start.
    let survivors: Vec<&RawCheckRun> = candidates
        .into_iter()
        .filter(|run| match run.pull_request_node_id.and_then(|id| pr_ctx.get(&id)) {
            None => false,
            Some(ctx) => {
                let upper = ctx.closed_at.map(|c| c + Duration::hours(1));
                let suite_start = suite_starts
                    .get(run.check_suite_node_id.as_str())
                    .copied()
                    .unwrap_or(run.started_at);
                suite_start >= ctx.created_at && upper.map(|u| suite_start <= u).unwrap_or(true)
            }
        })
        .collect();

    if survivors.is_empty() {
        let mut unattributed = base;
        unattributed.pull_request_node_id = None;
        return Some(unattributed);
    }
    if survivors.len() == 1 {
        return Some(survivors[0].clone());
    }

    // Pass B: prefer the PR whose author matches the run's (commit) author.
    let author_matched: Vec<&RawCheckRun> = survivors
        .iter()
        .filter(|run| {
            run.author.is_some()
                && run
                    .pull_request_node_id
                    .and_then(|id| pr_ctx.get(&id))
                    .map(|ctx| ctx.author == run.author)
                    .unwrap_or(false)
        })
        .copied()
        .collect();

    if author_matched.is_empty() {
        return None;
    }

    // Sort by the PR's created_at ascending, then pick the fewest commits
    // (stable argmin).
    let mut ordered = author_matched;
    ordered.sort_by_key(|run| {
        run.pull_request_node_id
            .and_then(|id| pr_ctx.get(&id))
            .map(|ctx| ctx.created_at)
    });
    let winner = ordered
        .into_iter()
        .min_by_key(|run| {
            run.pull_request_node_id
                .and_then(|id| pr_ctx.get(&id))
                .map(|ctx| ctx.commit_count)
                .unwrap_or(usize::MAX)
        })
        .expect("non-empty after author filter");
    Some(winner.clone())
}

/// Pairs `is_status_context` rows sharing `(suite, url)`; the earliest
/// becomes the start, the latest's status/conclusion/completion wins.
fn merge_status_contexts(runs: Vec<RawCheckRun>) -> Vec<RawCheckRun> {
    let (contexts, mut rest): (Vec<RawCheckRun>, Vec<RawCheckRun>) =
        runs.into_iter().partition(|r| r.is_status_context);

    let mut groups: HashMap<(String, Option<String>), Vec<RawCheckRun>> = HashMap::new();
    for run in contexts {
        groups
            .entry((run.check_suite_node_id.clone(), run.url.clone()))
            .or_default()
            .push(run);
    }

    for (_, mut group) in groups {
        group.sort_by_key(|r| r.started_at);
        if group.len() == 1 {
            rest.push(group.pop().unwrap());
            continue;
        }
        let finish = group.pop().unwrap();
        let mut start = group.remove(0);
        start.status = finish.status;
        start.conclusion = finish.conclusion;
        start.completed_at = finish.completed_at;
        rest.push(start);
    }
    rest
}

/// Assigns a disjoint synthetic suite id to each duplicate-name re-run
/// within a suite, ordered by start time.
fn split_reruns(runs: Vec<RawCheckRun>) -> Vec<(RawCheckRun, String)> {
    let mut by_suite_name: HashMap<(String, String), Vec<RawCheckRun>> = HashMap::new();
    for run in runs {
        by_suite_name
            .entry((run.check_suite_node_id.clone(), run.name.clone()))
            .or_default()
            .push(run);
    }

    let mut out = Vec::new();
    for ((suite, _name), mut group) in by_suite_name {
        group.sort_by_key(|r| r.started_at);
        for (idx, run) in group.into_iter().enumerate() {
            let suite_id = if idx == 0 { suite.clone() } else { format!("{suite}#{idx}") };
            out.push((run, suite_id));
        }
    }
    out
}

fn clamp((run, suite_id): (RawCheckRun, String)) -> DisambiguatedCheckRun {
    let mut completed_at = run.completed_at;
    if matches!(run.conclusion, Some(CheckConclusion::Neutral)) {
        completed_at = None;
    } else if completed_at.map(|c| c < run.started_at).unwrap_or(true) && run.completed_at.is_some() {
        completed_at = Some(run.started_at);
    }

    DisambiguatedCheckRun {
        check_run_node_id: run.check_run_node_id,
        suite_id,
        repository_full_name: run.repository_full_name,
        name: run.name,
        status: run.status,
        conclusion: run.conclusion,
        started_at: run.started_at,
        completed_at,
        commit_sha: run.commit_sha,
        url: run.url,
        pull_request_node_id: run.pull_request_node_id,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Utc};
    use storage_gateway::model::CheckRunStatus;

    fn t(offset_hours: i64) -> DateTime<Utc> {
        DateTime::<Utc>::from_timestamp(1_700_000_000, 0).unwrap() + Duration::hours(offset_hours)
    }

    fn run(id: &str, suite: &str, name: &str, pr: Option<PrNodeId>, author: Option<i64>) -> RawCheckRun {
        RawCheckRun {
            check_run_node_id: id.into(),
            check_suite_node_id: suite.into(),
            repository_full_name: "org/repo".into(),
            name: name.into(),
            status: CheckRunStatus::Completed,
            conclusion: Some(CheckConclusion::Success),
            started_at: t(0),
            completed_at: Some(t(1)),
            commit_node_id: "c1".into(),
            commit_sha: "deadbeef".into(),
            url: None,
            author,
            pull_request_node_id: pr,
            is_status_context: false,
        }
    }

    #[test]
    fn unambiguous_run_passes_through() {
        let raw = vec![run("r1", "s1", "build", Some(1), Some(100))];
        let prs = vec![RawPullRequest {
            node_id: 1,
            repository_full_name: "org/repo".into(),
            number: 1,
            author: Some(100),
            merged_by: None,
            created_at: t(-1),
            closed_at: None,
            merged_at: None,
            additions: 0,
            deletions: 0,
            changed_files: 0,
            merge_commit_sha: None,
            title: String::new(),
            body: None,
        }];
        let resolved = disambiguate(raw, &prs, &HashMap::from([(1, 1)]));
        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].pull_request_node_id, Some(1));
    }

    #[test]
    fn ambiguous_run_outside_any_pr_lifetime_is_unattributed() {
        let mut raw = run("r1", "s1", "build", Some(1), Some(100));
        raw.started_at = t(-100);
        let prs = vec![RawPullRequest {
            node_id: 1,
            repository_full_name: "org/repo".into(),
            number: 1,
            author: Some(100),
            merged_by: None,
            created_at: t(-1),
            closed_at: Some(t(2)),
            merged_at: None,
            additions: 0,
            deletions: 0,
            changed_files: 0,
            merge_commit_sha: None,
            title: String::new(),
            body: None,
        }];
        let resolved = disambiguate(vec![raw.clone(), raw], &prs, &HashMap::new());
        assert_eq!(resolved[0].pull_request_node_id, None);
    }

    #[test]
    fn lifetime_filter_uses_suite_start_not_the_individual_runs_start() {
        // s1's earliest run starts at t(0), inside the PR's window, but the
        // ambiguous run itself starts at t(5), outside ctx.closed_at + 1h.
        let mut earliest = run("r0", "s1", "lint", None, None);
        earliest.started_at = t(0);

        let mut ambiguous = run("r1", "s1", "build", Some(1), Some(100));
        ambiguous.started_at = t(5);

        let prs = vec![RawPullRequest {
            node_id: 1,
            repository_full_name: "org/repo".into(),
            number: 1,
            author: Some(100),
            merged_by: None,
            created_at: t(-1),
            closed_at: Some(t(1)),
            merged_at: None,
            additions: 0,
            deletions: 0,
            changed_files: 0,
            merge_commit_sha: None,
            title: String::new(),
            body: None,
        }];

        let resolved = disambiguate(
            vec![earliest, ambiguous.clone(), ambiguous],
            &prs,
            &HashMap::from([(1, 1)]),
        );
        let build = resolved.iter().find(|r| r.check_run_node_id == "r1").unwrap();
        assert_eq!(build.pull_request_node_id, Some(1));
    }
}
