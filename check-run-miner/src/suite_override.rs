//! SPEC_FULL §4.4 step 6: suite-conclusion override.
//!
//! If a suite that would otherwise read as successful contains a run
//! concluding `TIMED_OUT`, `CANCELLED`, or `FAILURE`, the suite's
//! effective conclusion is rewritten to that one. Individual run records
//! are left untouched; this is a derived rollup consumed by aggregation.
//! Precedence among the three overriding conclusions is "last-wins by
//! listed order" (DESIGN.md Open Question #2).

use crate::model::DisambiguatedCheckRun;
use std::collections::HashMap;
use storage_gateway::model::CheckConclusion;

const OVERRIDE_PRECEDENCE: [CheckConclusion; 3] = [
    CheckConclusion::TimedOut,
    CheckConclusion::Cancelled,
    CheckConclusion::Failure,
];

/// Maps each suite id to its effective conclusion after the override rule.
pub fn suite_conclusions(runs: &[DisambiguatedCheckRun]) -> HashMap<&str, CheckConclusion> {
    let mut by_suite: HashMap<&str, Vec<&DisambiguatedCheckRun>> = HashMap::new();
    for run in runs {
        by_suite.entry(run.suite_id.as_str()).or_default().push(run);
    }

    by_suite
        .into_iter()
        .filter_map(|(suite_id, suite_runs)| {
            let present: Vec<CheckConclusion> =
                suite_runs.iter().filter_map(|r| r.conclusion).collect();
            let all_success = present.iter().all(|c| *c == CheckConclusion::Success);

            if all_success {
                return Some((suite_id, CheckConclusion::Success));
            }

            // Mixed conclusions with none of the three overriding ones
            // present (e.g. Success + Neutral) leave the suite's effective
            // conclusion unchanged — no entry means apply_suite_override
            // won't touch any run in it.
            let mut winner = None;
            for candidate in OVERRIDE_PRECEDENCE {
                if present.contains(&candidate) {
                    winner = Some(candidate);
                }
            }
            winner.map(|conclusion| (suite_id, conclusion))
        })
        .collect()
}

/// Rewrites each run's conclusion to its suite's effective conclusion when
/// the suite has been overridden away from `Success` — so aggregation
/// counts a flaky/cancelled suite as failed even where an individual run
/// inside it still reads `Success`.
pub fn apply_suite_override(mut runs: Vec<DisambiguatedCheckRun>) -> Vec<DisambiguatedCheckRun> {
    let effective: HashMap<String, CheckConclusion> = suite_conclusions(&runs)
        .into_iter()
        .map(|(suite, conclusion)| (suite.to_string(), conclusion))
        .collect();
    for run in &mut runs {
        if let Some(conclusion) = effective.get(&run.suite_id) {
            if *conclusion != CheckConclusion::Success && run.conclusion == Some(CheckConclusion::Success) {
                run.conclusion = Some(*conclusion);
            }
        }
    }
    runs
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Utc};
    use storage_gateway::model::CheckRunStatus;

    fn t() -> DateTime<Utc> {
        DateTime::<Utc>::from_timestamp(1_700_000_000, 0).unwrap()
    }

    fn run(suite: &str, conclusion: CheckConclusion) -> DisambiguatedCheckRun {
        DisambiguatedCheckRun {
            check_run_node_id: format!("{suite}-{conclusion:?}"),
            suite_id: suite.into(),
            repository_full_name: "org/repo".into(),
            name: "build".into(),
            status: CheckRunStatus::Completed,
            conclusion: Some(conclusion),
            started_at: t(),
            completed_at: Some(t()),
            commit_sha: "a".into(),
            url: None,
            pull_request_node_id: None,
        }
    }

    #[test]
    fn last_wins_by_listed_order() {
        let runs = vec![
            run("s1", CheckConclusion::Success),
            run("s1", CheckConclusion::Cancelled),
            run("s1", CheckConclusion::Failure),
        ];
        let conclusions = suite_conclusions(&runs);
        assert_eq!(conclusions["s1"], CheckConclusion::Failure);
    }

    #[test]
    fn all_success_suite_stays_success() {
        let runs = vec![run("s1", CheckConclusion::Success), run("s1", CheckConclusion::Success)];
        assert_eq!(suite_conclusions(&runs)["s1"], CheckConclusion::Success);
    }

    #[test]
    fn mixed_without_an_overriding_conclusion_is_not_forced_to_failure() {
        let runs = vec![run("s1", CheckConclusion::Success), run("s1", CheckConclusion::Neutral)];
        assert!(!suite_conclusions(&runs).contains_key("s1"));

        let applied = apply_suite_override(runs);
        assert_eq!(applied[0].conclusion, Some(CheckConclusion::Success));
        assert_eq!(applied[1].conclusion, Some(CheckConclusion::Neutral));
    }
}
