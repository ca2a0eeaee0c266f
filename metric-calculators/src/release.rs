//! Release-family metric calculators. No release calculator file was
//! retrieved alongside `pull_request_metrics.py`; these follow the same
//! `MedianMetricCalculator` shape, computed over the `Release` records
//! `release-miner` already produces with first-releases hidden (spec
//! §4.3's "it would otherwise skew lead-time" note applies here too).

use crate::stats::median_with_iqr;
use release_miner::Release;
use storage_gateway::model::MetricValue;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReleaseMetric {
    Count,
    TimeBetween,
}

impl ReleaseMetric {
    pub fn identifier(&self) -> &'static str {
        match self {
            ReleaseMetric::Count => "release-count",
            ReleaseMetric::TimeBetween => "release-time-between",
        }
    }

    pub fn from_identifier(id: &str) -> Option<Self> {
        match id {
            "release-count" => Some(ReleaseMetric::Count),
            "release-time-between" => Some(ReleaseMetric::TimeBetween),
            _ => None,
        }
    }
}

pub fn calculate(metric: ReleaseMetric, releases: &[&Release]) -> MetricValue {
    match metric {
        ReleaseMetric::Count => MetricValue::exact(releases.len() as f64),
        ReleaseMetric::TimeBetween => {
            let mut sorted: Vec<&&Release> = releases.iter().collect();
            sorted.sort_by_key(|r| r.published_at);
            let gaps: Vec<f64> = sorted
                .windows(2)
                .map(|pair| (pair[1].published_at - pair[0].published_at).num_milliseconds() as f64 / 1000.0)
                .collect();
            median_with_iqr(gaps)
        }
    }
}

pub const ALL: [ReleaseMetric; 2] = [ReleaseMetric::Count, ReleaseMetric::TimeBetween];

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Duration, Utc};
    use std::collections::HashSet;
    use storage_gateway::model::ReleaseMatchKind;

    fn t(days: i64) -> DateTime<Utc> {
        DateTime::<Utc>::from_timestamp(1_700_000_000, 0).unwrap() + Duration::days(days)
    }

    fn release(days: i64) -> Release {
        Release {
            repository_full_name: "org/repo".into(),
            identity: format!("v{days}"),
            commit_sha: "a".into(),
            matched_by: ReleaseMatchKind::Tag,
            published_at: t(days),
            commit_authors: HashSet::new(),
            prs: Vec::new(),
        }
    }

    #[test]
    fn count_is_exact() {
        let releases = vec![release(0), release(10)];
        let refs: Vec<&Release> = releases.iter().collect();
        assert_eq!(calculate(ReleaseMetric::Count, &refs).value, Some(2.0));
    }

    #[test]
    fn time_between_uses_sorted_gaps() {
        let releases = vec![release(10), release(0), release(20)];
        let refs: Vec<&Release> = releases.iter().collect();
        let value = calculate(ReleaseMetric::TimeBetween, &refs);
        assert_eq!(value.value, Some(10.0 * 86400.0));
    }
}
