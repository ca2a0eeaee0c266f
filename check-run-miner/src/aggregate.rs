//! SPEC_FULL §4.4 "Aggregation into list view": groups disambiguated runs
//! by `(repository, name)` and produces, per group, whole-window totals
//! plus per-bucket timeline arrays for `count`/`successes`/
//! `mean_execution_time`/`median_execution_time`.

use crate::model::{CheckMask, CheckRunGroupStats, DisambiguatedCheckRun};
use crate::timeline::bucket_for;
use chrono::{DateTime, Utc};
use std::collections::{HashMap, HashSet};

/// Trim values outside `[q_lo, q_hi]` before averaging, same as the
/// aggregation contract's `mean_execution_time` definition.
const Q_LO: f64 = 0.1;
const Q_HI: f64 = 0.9;

pub fn aggregate(
    runs: &[DisambiguatedCheckRun],
    mask: CheckMask,
    boundaries: &[DateTime<Utc>],
) -> Vec<CheckRunGroupStats> {
    let masked: Vec<&DisambiguatedCheckRun> = runs.iter().filter(|r| mask.includes(r)).collect();

    let mut groups: HashMap<(&str, &str), Vec<&DisambiguatedCheckRun>> = HashMap::new();
    for run in &masked {
        groups.entry((run.repository_full_name.as_str(), run.name.as_str())).or_default().push(run);
    }

    let mut stats: Vec<CheckRunGroupStats> = groups
        .into_iter()
        .map(|((repo, name), group)| group_stats(repo, name, &group, boundaries))
        .collect();
    stats.sort_by(|a, b| {
        (a.repository_full_name.as_str(), a.name.as_str()).cmp(&(b.repository_full_name.as_str(), b.name.as_str()))
    });
    stats
}

fn group_stats(
    repo: &str,
    name: &str,
    group: &[&DisambiguatedCheckRun],
    boundaries: &[DateTime<Utc>],
) -> CheckRunGroupStats {
    let count = group.len();
    let successes = group.iter().filter(|r| r.is_success()).count();
    let skips = group.iter().filter(|r| r.is_skip()).count();
    let flaky_count = flaky_commit_count(group);

    let mut durations: Vec<f64> = group.iter().filter_map(|r| r.execution_seconds()).collect();
    let (mean_execution_time, median_execution_time) = trimmed_mean_and_median(&mut durations);

    let last = group.iter().max_by_key(|r| r.started_at);
    let last_execution_time = last.map(|r| r.started_at);
    let last_execution_url = last.and_then(|r| r.url.clone());

    let size_groups: HashSet<usize> = group_sizes_by_suite(group);
    let mut size_groups: Vec<usize> = size_groups.into_iter().collect();
    size_groups.sort_unstable();

    let mut by_bucket: HashMap<DateTime<Utc>, Vec<&DisambiguatedCheckRun>> = HashMap::new();
    for run in group.iter().copied() {
        let bucket = bucket_for(boundaries, run.started_at);
        by_bucket.entry(bucket).or_default().push(run);
    }

    let mut count_timeline = Vec::with_capacity(boundaries.len());
    let mut successes_timeline = Vec::with_capacity(boundaries.len());
    let mut mean_execution_time_timeline = Vec::with_capacity(boundaries.len());
    let mut median_execution_time_timeline = Vec::with_capacity(boundaries.len());
    for boundary in boundaries {
        let bucket_runs: &[&DisambiguatedCheckRun] = by_bucket.get(boundary).map(Vec::as_slice).unwrap_or(&[]);
        count_timeline.push(bucket_runs.len());
        successes_timeline.push(bucket_runs.iter().filter(|r| r.is_success()).count());
        let mut bucket_durations: Vec<f64> = bucket_runs.iter().filter_map(|r| r.execution_seconds()).collect();
        let (bucket_mean, bucket_median) = trimmed_mean_and_median(&mut bucket_durations);
        mean_execution_time_timeline.push(bucket_mean);
        median_execution_time_timeline.push(bucket_median);
    }

    CheckRunGroupStats {
        repository_full_name: repo.to_string(),
        name: name.to_string(),
        count,
        successes,
        skips,
        flaky_count,
        mean_execution_time,
        median_execution_time,
        count_timeline,
        successes_timeline,
        mean_execution_time_timeline,
        median_execution_time_timeline,
        last_execution_time,
        last_execution_url,
        size_groups,
    }
}

/// A commit is "flaky" if it has at least one run that succeeded or was
/// skipped and at least one run that failed, within this group.
fn flaky_commit_count(group: &[&DisambiguatedCheckRun]) -> usize {
    let mut by_commit: HashMap<&str, (bool, bool)> = HashMap::new();
    for run in group {
        let entry = by_commit.entry(run.commit_sha.as_str()).or_insert((false, false));
        if run.is_success() || run.is_skip() {
            entry.0 = true;
        }
        if run.is_failure() {
            entry.1 = true;
        }
    }
    by_commit.values().filter(|(ok, bad)| *ok && *bad).count()
}

/// Distinct suite sizes (run counts per suite id) observed in the group.
fn group_sizes_by_suite(group: &[&DisambiguatedCheckRun]) -> HashSet<usize> {
    let mut by_suite: HashMap<&str, usize> = HashMap::new();
    for run in group {
        *by_suite.entry(run.suite_id.as_str()).or_insert(0) += 1;
    }
    by_suite.values().copied().collect()
}

fn trimmed_mean_and_median(durations: &mut [f64]) -> (Option<f64>, Option<f64>) {
    if durations.is_empty() {
        return (None, None);
    }
    durations.sort_by(|a, b| a.partial_cmp(b).unwrap());
    let median = percentile(durations, 0.5);

    let lo = percentile(durations, Q_LO);
    let hi = percentile(durations, Q_HI);
    let trimmed: Vec<f64> = durations.iter().copied().filter(|v| *v >= lo && *v <= hi).collect();
    let mean = if trimmed.is_empty() {
        Some(durations.iter().sum::<f64>() / durations.len() as f64)
    } else {
        Some(trimmed.iter().sum::<f64>() / trimmed.len() as f64)
    };
    (mean, Some(median))
}

fn percentile(sorted: &[f64], q: f64) -> f64 {
    if sorted.len() == 1 {
        return sorted[0];
    }
    let idx = (q * (sorted.len() - 1) as f64).round() as usize;
    sorted[idx.min(sorted.len() - 1)]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timeline::{bucket_boundaries, granularity_for_window};
    use chrono::Duration;
    use storage_gateway::model::{CheckConclusion, CheckRunStatus};

    fn t(offset_secs: i64) -> DateTime<Utc> {
        DateTime::<Utc>::from_timestamp(1_700_000_000, 0).unwrap() + Duration::seconds(offset_secs)
    }

    fn boundaries_for(from: DateTime<Utc>, to: DateTime<Utc>) -> Vec<DateTime<Utc>> {
        bucket_boundaries(from, to, granularity_for_window(from, to))
    }

    fn run(commit: &str, suite: &str, conclusion: CheckConclusion, start: i64, end: Option<i64>) -> DisambiguatedCheckRun {
        DisambiguatedCheckRun {
            check_run_node_id: format!("{commit}-{suite}-{start}"),
            suite_id: suite.into(),
            repository_full_name: "org/repo".into(),
            name: "build".into(),
            status: CheckRunStatus::Completed,
            conclusion: Some(conclusion),
            started_at: t(start),
            completed_at: end.map(t),
            commit_sha: commit.into(),
            url: Some(format!("https://ci/{start}")),
            pull_request_node_id: None,
        }
    }

    #[test]
    fn flaky_count_detects_mixed_outcomes_on_same_commit() {
        let runs = vec![
            run("c1", "s1", CheckConclusion::Success, 0, Some(10)),
            run("c1", "s2", CheckConclusion::Failure, 0, Some(10)),
            run("c2", "s1", CheckConclusion::Success, 0, Some(10)),
        ];
        let boundaries = boundaries_for(t(-1000), t(1000));
        let stats = aggregate(&runs, CheckMask::Total, &boundaries);
        assert_eq!(stats.len(), 1);
        assert_eq!(stats[0].flaky_count, 1);
        assert_eq!(stats[0].count, 3);
        assert_eq!(stats[0].count_timeline.iter().sum::<usize>(), 3);
    }

    #[test]
    fn prs_only_mask_excludes_unattributed_runs() {
        let runs = vec![run("c1", "s1", CheckConclusion::Success, 0, Some(10))];
        let boundaries = boundaries_for(t(-1000), t(1000));
        let stats = aggregate(&runs, CheckMask::PrsOnly, &boundaries);
        assert!(stats.is_empty());
    }

    #[test]
    fn whole_window_totals_are_not_split_across_buckets() {
        let runs = vec![
            run("c1", "s1", CheckConclusion::Success, 0, Some(10)),
            run("c2", "s2", CheckConclusion::Success, 86_400 * 20, Some(86_400 * 20 + 10)),
        ];
        let boundaries = boundaries_for(t(0), t(86_400 * 30));
        let stats = aggregate(&runs, CheckMask::Total, &boundaries);
        assert_eq!(stats.len(), 1);
        assert_eq!(stats[0].count, 2);
        assert_eq!(stats[0].count_timeline.len(), boundaries.len());
        assert_eq!(stats[0].count_timeline.iter().sum::<usize>(), 2);
    }
}
