//! JIRA-family metric calculators. No JIRA client is in scope (DESIGN.md
//! Open Question #4): these compute over PR facts carrying a non-empty
//! `jira_links` set rather than a real JIRA issue feed, proxying issue
//! resolution by the linking PR's own lifecycle.

use crate::stats::median_with_iqr;
use pr_miner::model::PrFacts;
use storage_gateway::model::MetricValue;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JiraMetric {
    MappedPrCount,
    ResolutionTime,
}

impl JiraMetric {
    pub fn identifier(&self) -> &'static str {
        match self {
            JiraMetric::MappedPrCount => "jira-mapped-pr-count",
            JiraMetric::ResolutionTime => "jira-resolution-time",
        }
    }

    pub fn from_identifier(id: &str) -> Option<Self> {
        match id {
            "jira-mapped-pr-count" => Some(JiraMetric::MappedPrCount),
            "jira-resolution-time" => Some(JiraMetric::ResolutionTime),
            _ => None,
        }
    }
}

pub fn calculate(metric: JiraMetric, facts: &[&PrFacts]) -> MetricValue {
    let linked: Vec<&&PrFacts> = facts.iter().filter(|f| !f.jira_links.is_empty()).collect();
    match metric {
        JiraMetric::MappedPrCount => MetricValue::exact(linked.len() as f64),
        JiraMetric::ResolutionTime => {
            let samples: Vec<f64> = linked
                .iter()
                .filter_map(|f| f.timestamps.work_began.zip(f.timestamps.closed))
                .map(|(start, end)| (end - start).num_milliseconds() as f64 / 1000.0)
                .collect();
            median_with_iqr(samples)
        }
    }
}

pub const ALL: [JiraMetric; 2] = [JiraMetric::MappedPrCount, JiraMetric::ResolutionTime];

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Duration, Utc};
    use pr_miner::model::{PrParticipants, PrSize, PrTimestamps};
    use std::collections::HashSet;

    fn t(hours: i64) -> DateTime<Utc> {
        DateTime::<Utc>::from_timestamp(1_700_000_000, 0).unwrap() + Duration::hours(hours)
    }

    fn facts(jira: bool) -> PrFacts {
        PrFacts {
            pr_node_id: 1,
            repository_full_name: "org/repo".into(),
            number: 1,
            timestamps: PrTimestamps {
                created: Some(t(0)),
                work_began: Some(t(0)),
                closed: Some(t(4)),
                ..Default::default()
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
            jira_links: if jira { HashSet::from(["PROJ-1".to_string()]) } else { HashSet::new() },
        }
    }

    #[test]
    fn mapped_pr_count_only_counts_linked_prs() {
        let facts = vec![facts(true), facts(false)];
        let refs: Vec<&PrFacts> = facts.iter().collect();
        assert_eq!(calculate(JiraMetric::MappedPrCount, &refs).value, Some(1.0));
    }
}
