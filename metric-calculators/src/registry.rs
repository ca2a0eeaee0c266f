//! Metric-family triage (SPEC_FULL §4.1 "Triage"): looks a metric name up
//! across the PR/release/JIRA registries, failing the whole request on
//! the first unrecognized name.

use crate::error::{MetricError, MetricResult};
use crate::jira::JiraMetric;
use crate::pr::PrMetric;
use crate::release::ReleaseMetric;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricFamily {
    Pr(PrMetric),
    Release(ReleaseMetric),
    Jira(JiraMetric),
}

impl MetricFamily {
    pub fn identifier(&self) -> &'static str {
        match self {
            MetricFamily::Pr(m) => m.identifier(),
            MetricFamily::Release(m) => m.identifier(),
            MetricFamily::Jira(m) => m.identifier(),
        }
    }
}

/// Resolves a metric name against all three registries in turn.
pub fn resolve(name: &str) -> MetricResult<MetricFamily> {
    if let Some(m) = PrMetric::from_identifier(name) {
        return Ok(MetricFamily::Pr(m));
    }
    if let Some(m) = ReleaseMetric::from_identifier(name) {
        return Ok(MetricFamily::Release(m));
    }
    if let Some(m) = JiraMetric::from_identifier(name) {
        return Ok(MetricFamily::Jira(m));
    }
    Err(MetricError::UnknownMetric(name.to_string()))
}

/// Triages a batch of metric names into per-family groups, failing fast
/// (field-precise) on the first name no registry recognizes.
pub fn triage(names: &[String]) -> MetricResult<Vec<MetricFamily>> {
    names.iter().map(|n| resolve(n)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_one_metric_per_family() {
        assert!(matches!(resolve("pr-wip-time").unwrap(), MetricFamily::Pr(_)));
        assert!(matches!(resolve("release-count").unwrap(), MetricFamily::Release(_)));
        assert!(matches!(resolve("jira-mapped-pr-count").unwrap(), MetricFamily::Jira(_)));
    }

    #[test]
    fn unknown_metric_is_an_error() {
        assert!(resolve("does-not-exist").is_err());
    }

    #[test]
    fn triage_fails_whole_batch_on_first_unknown() {
        let names = vec!["pr-wip-time".to_string(), "nope".to_string()];
        assert!(triage(&names).is_err());
    }
}
