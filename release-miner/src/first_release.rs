//! Hides the very first release of each `(repository, matched_by)` pair:
//! it has no predecessor to diff against and skews "time between
//! releases" metrics (Open Question resolution in DESIGN.md).

use crate::model::Release;
use std::collections::HashMap;
use storage_gateway::model::ReleaseMatchKind;

/// Returns the `(repository_full_name, matched_by)` keys whose earliest
/// release should be excluded from metric calculations.
pub fn first_releases(releases: &[Release]) -> Vec<(String, ReleaseMatchKind, String)> {
    let mut earliest: HashMap<(String, ReleaseMatchKind), &Release> = HashMap::new();
    for release in releases {
        let key = (release.repository_full_name.clone(), release.matched_by);
        earliest
            .entry(key)
            .and_modify(|current| {
                if release.published_at < current.published_at {
                    *current = release;
                }
            })
            .or_insert(release);
    }
    earliest
        .into_iter()
        .map(|((repo, kind), release)| (repo, kind, release.identity.clone()))
        .collect()
}

/// Drops each group's earliest release in place.
pub fn hide_first_releases(releases: Vec<Release>) -> Vec<Release> {
    let hidden: std::collections::HashSet<(String, ReleaseMatchKind, String)> =
        first_releases(&releases).into_iter().collect();
    releases
        .into_iter()
        .filter(|r| !hidden.contains(&(r.repository_full_name.clone(), r.matched_by, r.identity.clone())))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn release(identity: &str, hours_ago: i64) -> Release {
        Release {
            repository_full_name: "org/repo".into(),
            identity: identity.into(),
            commit_sha: identity.into(),
            matched_by: ReleaseMatchKind::Tag,
            published_at: Utc::now() - Duration::hours(hours_ago),
            commit_authors: Default::default(),
            prs: Vec::new(),
        }
    }

    #[test]
    fn hides_only_the_earliest_per_group() {
        let releases = vec![release("v1", 100), release("v2", 50), release("v3", 10)];
        let remaining = hide_first_releases(releases);
        assert_eq!(remaining.len(), 2);
        assert!(remaining.iter().all(|r| r.identity != "v1"));
    }
}
