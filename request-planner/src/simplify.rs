//! Request-merging, ported from `_simplify_requests`: many callers can ask
//! for overlapping team/metric/interval slices of the same data, and every
//! extra request is an extra mining pass. This regroups requests in two
//! passes — first by identical interval sets, then by identical metric
//! sets — so that two callers asking the same question end up sharing one
//! request, with their team sets merged, regardless of the order the
//! metrics or teams were listed in.

use crate::model::{TeamMetricsRequest, TimeInterval};
use std::collections::{HashMap, HashSet};
use storage_gateway::model::{TeamId, UserNodeId};

pub fn simplify_requests(requests: Vec<TeamMetricsRequest>) -> Vec<TeamMetricsRequest> {
    let mut by_intervals: HashMap<Vec<TimeInterval>, HashMap<TeamId, HashSet<String>>> = HashMap::new();
    let mut team_members: HashMap<TeamId, Vec<UserNodeId>> = HashMap::new();

    for request in requests {
        let bucket = by_intervals.entry(request.time_intervals.clone()).or_default();
        for (team_id, members) in request.teams {
            team_members.insert(team_id, members);
            bucket.entry(team_id).or_default().extend(request.metrics.iter().cloned());
        }
    }

    let mut by_intervals_and_metrics: HashMap<Vec<TimeInterval>, HashMap<Vec<String>, HashSet<TeamId>>> =
        HashMap::new();
    for (intervals, team_metrics) in by_intervals {
        let bucket = by_intervals_and_metrics.entry(intervals).or_default();
        for (team_id, metrics) in team_metrics {
            let mut sorted: Vec<String> = metrics.into_iter().collect();
            sorted.sort();
            bucket.entry(sorted).or_default().insert(team_id);
        }
    }

    let mut simplified = Vec::new();
    for (intervals, metric_groups) in by_intervals_and_metrics {
        for (metrics, team_ids) in metric_groups {
            let teams = team_ids
                .into_iter()
                .map(|id| {
                    let members = team_members.get(&id).cloned().unwrap_or_default();
                    (id, members)
                })
                .collect();
            simplified.push(TeamMetricsRequest { metrics, time_intervals: intervals.clone(), teams });
        }
    }
    simplified
}

#[cfg(test)]
mod tests {
    use super::*;

    fn interval(from: i64, to: i64) -> TimeInterval {
        use chrono::{DateTime, Utc};
        TimeInterval {
            from: DateTime::<Utc>::from_timestamp(from, 0).unwrap(),
            to: DateTime::<Utc>::from_timestamp(to, 0).unwrap(),
        }
    }

    #[test]
    fn merges_requests_with_identical_intervals_and_metrics() {
        let intervals = vec![interval(0, 100)];
        let a = TeamMetricsRequest {
            metrics: vec!["pr-wip-time".into()],
            time_intervals: intervals.clone(),
            teams: HashMap::from([(1, vec![10])]),
        };
        let b = TeamMetricsRequest {
            metrics: vec!["pr-wip-time".into()],
            time_intervals: intervals,
            teams: HashMap::from([(2, vec![20])]),
        };

        let simplified = simplify_requests(vec![a, b]);
        assert_eq!(simplified.len(), 1);
        assert_eq!(simplified[0].teams.len(), 2);
    }

    #[test]
    fn keeps_requests_with_distinct_intervals_separate() {
        let a = TeamMetricsRequest {
            metrics: vec!["pr-wip-time".into()],
            time_intervals: vec![interval(0, 100)],
            teams: HashMap::from([(1, vec![10])]),
        };
        let b = TeamMetricsRequest {
            metrics: vec!["pr-wip-time".into()],
            time_intervals: vec![interval(200, 300)],
            teams: HashMap::from([(1, vec![10])]),
        };

        let simplified = simplify_requests(vec![a, b]);
        assert_eq!(simplified.len(), 2);
    }

    #[test]
    fn metric_order_does_not_prevent_merging() {
        let intervals = vec![interval(0, 100)];
        let a = TeamMetricsRequest {
            metrics: vec!["pr-wip-time".into(), "pr-review-time".into()],
            time_intervals: intervals.clone(),
            teams: HashMap::from([(1, vec![10])]),
        };
        let b = TeamMetricsRequest {
            metrics: vec!["pr-review-time".into(), "pr-wip-time".into()],
            time_intervals: intervals,
            teams: HashMap::from([(1, vec![10])]),
        };

        let simplified = simplify_requests(vec![a, b]);
        assert_eq!(simplified.len(), 1);
    }
}
