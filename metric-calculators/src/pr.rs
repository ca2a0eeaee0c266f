//! PR-family metric calculators, grounded one-for-one on
//! `pull_request_metrics.py`'s `WorkInProgressTimeCalculator` /
//! `ReviewTimeCalculator` / `MergeTimeCalculator` / `ReleaseTimeCalculator`
//! / `LeadTimeCalculator`.

use crate::stats::median_with_iqr;
use pr_miner::model::PrFacts;
use storage_gateway::model::MetricValue;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrMetric {
    WipTime,
    ReviewTime,
    MergingTime,
    ReleaseTime,
    LeadTime,
}

impl PrMetric {
    pub fn identifier(&self) -> &'static str {
        match self {
            PrMetric::WipTime => "pr-wip-time",
            PrMetric::ReviewTime => "pr-review-time",
            PrMetric::MergingTime => "pr-merging-time",
            PrMetric::ReleaseTime => "pr-release-time",
            PrMetric::LeadTime => "pr-lead-time",
        }
    }

    pub fn from_identifier(id: &str) -> Option<Self> {
        match id {
            "pr-wip-time" => Some(PrMetric::WipTime),
            "pr-review-time" => Some(PrMetric::ReviewTime),
            "pr-merging-time" => Some(PrMetric::MergingTime),
            "pr-release-time" => Some(PrMetric::ReleaseTime),
            "pr-lead-time" => Some(PrMetric::LeadTime),
            _ => None,
        }
    }

    /// Seconds elapsed for one PR's facts, or `None` if this metric's
    /// preconditions aren't met for that PR.
    pub fn analyze(&self, facts: &PrFacts) -> Option<f64> {
        let t = &facts.timestamps;
        let seconds = match self {
            PrMetric::WipTime => t.first_review_request.zip(t.work_began),
            PrMetric::ReviewTime => {
                let closed = t.closed?;
                let _ = closed;
                let start = t.first_review_request?;
                let end = t.approved.or(t.last_review)?;
                Some((end, start))
            }
            PrMetric::MergingTime => t.closed.zip(t.approved),
            PrMetric::ReleaseTime => t.released.zip(t.merged),
            PrMetric::LeadTime => t.released.zip(t.work_began),
        }?;
        let (end, start) = seconds;
        Some((end - start).num_milliseconds() as f64 / 1000.0)
    }
}

/// Aggregates one metric's value across a team's PRs in an interval.
pub fn calculate(metric: PrMetric, facts: &[&PrFacts]) -> MetricValue {
    let samples: Vec<f64> = facts.iter().filter_map(|f| metric.analyze(f)).collect();
    median_with_iqr(samples)
}

pub const ALL: [PrMetric; 5] = [
    PrMetric::WipTime,
    PrMetric::ReviewTime,
    PrMetric::MergingTime,
    PrMetric::ReleaseTime,
    PrMetric::LeadTime,
];

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Duration, Utc};
    use pr_miner::model::{PrParticipants, PrSize, PrTimestamps};
    use std::collections::HashSet;

    fn t(offset_hours: i64) -> DateTime<Utc> {
        DateTime::<Utc>::from_timestamp(1_700_000_000, 0).unwrap() + Duration::hours(offset_hours)
    }

    fn facts() -> PrFacts {
        PrFacts {
            pr_node_id: 1,
            repository_full_name: "org/repo".into(),
            number: 1,
            timestamps: PrTimestamps {
                created: Some(t(0)),
                work_began: Some(t(0)),
                first_commit: Some(t(0)),
                last_commit_before_first_review: None,
                first_review_request: Some(t(1)),
                first_comment_on_first_review: None,
                approved: Some(t(2)),
                last_review: Some(t(2)),
                merged: Some(t(3)),
                closed: Some(t(3)),
                released: Some(t(5)),
            },
            size: PrSize { additions: 0, deletions: 0, files_changed: 0 },
            participants: PrParticipants {
                author: None,
                merger: None,
                reviewers: HashSet::new(),
                commenters: HashSet::new(),
                commit_authors: HashSet::new(),
                commit_committers: HashSet::new(),
            },
            labels: HashSet::new(),
            jira_links: HashSet::new(),
        }
    }

    #[test]
    fn wip_time_is_review_request_minus_work_began() {
        let hours = PrMetric::WipTime.analyze(&facts()).unwrap() / 3600.0;
        assert_eq!(hours, 1.0);
    }

    #[test]
    fn lead_time_is_release_minus_work_began() {
        let hours = PrMetric::LeadTime.analyze(&facts()).unwrap() / 3600.0;
        assert_eq!(hours, 5.0);
    }

    #[test]
    fn calculate_aggregates_across_facts() {
        let f = facts();
        let value = calculate(PrMetric::WipTime, &[&f]);
        assert!(value.exists);
    }
}
