//! Links PRs to releases by walking the commit DAG. No live git access:
//! the DAG is the HEAD→ROOT adjacency map already mined into the
//! metadata/precomputed store (SPEC_FULL §4.3 "Persisted layouts").

use crate::model::Release;
use std::collections::{HashMap, HashSet};
use storage_gateway::model::{CommitDag, PrNodeId, RawCommit, RawPrCommitLink};

/// Starting from each release's commit, walks parent edges toward the
/// root, collecting every commit not already claimed by an earlier
/// (closer-to-HEAD) release of the same repository. A PR is linked to a
/// release if one of its merge commits falls in that release's
/// collected set. Releases are visited nearest-to-HEAD first, approximated
/// by `published_at` descending — "nearest-release-wins".
pub fn link_prs_to_releases(
    releases: &mut [Release],
    dag: &CommitDag,
    pr_commit_links: &[RawPrCommitLink],
    commits: &[RawCommit],
) {
    let mut order: Vec<usize> = (0..releases.len()).collect();
    order.sort_by(|&a, &b| releases[b].published_at.cmp(&releases[a].published_at));

    let commit_to_prs = index_commit_to_prs(pr_commit_links);

    let mut claimed: HashSet<String> = HashSet::new();
    for idx in order {
        let collected = walk_unclaimed_ancestors(&releases[idx].commit_sha, dag, &claimed);
        let mut author_ids = HashSet::new();
        let mut linked_prs: HashSet<PrNodeId> = HashSet::new();
        for sha in &collected {
            if let Some(commit) = commits.iter().find(|c| &c.sha == sha) {
                if let Some(author) = commit.author {
                    author_ids.insert(author);
                }
            }
            if let Some(prs) = commit_to_prs.get(sha.as_str()) {
                linked_prs.extend(prs.iter().copied());
            }
        }
        releases[idx].commit_authors = author_ids;
        releases[idx].prs = linked_prs.into_iter().collect();
        releases[idx].prs.sort_unstable();
        claimed.extend(collected);
    }
}

fn index_commit_to_prs(links: &[RawPrCommitLink]) -> HashMap<&str, Vec<PrNodeId>> {
    let mut map: HashMap<&str, Vec<PrNodeId>> = HashMap::new();
    for link in links {
        map.entry(link.commit_sha.as_str()).or_default().push(link.pr_node_id);
    }
    map
}

/// Breadth-first walk from `start_sha` toward the root, stopping at any
/// commit already claimed by a nearer release or already visited.
fn walk_unclaimed_ancestors(
    start_sha: &str,
    dag: &CommitDag,
    claimed: &HashSet<String>,
) -> HashSet<String> {
    let mut collected = HashSet::new();
    let mut frontier = vec![start_sha.to_string()];
    while let Some(sha) = frontier.pop() {
        if claimed.contains(&sha) || !collected.insert(sha.clone()) {
            continue;
        }
        if let Some(parents) = dag.parents.get(&sha) {
            frontier.extend(parents.iter().cloned());
        }
    }
    collected
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use storage_gateway::model::ReleaseMatchKind;

    fn release(sha: &str, hours_ago: i64) -> Release {
        Release {
            repository_full_name: "org/repo".into(),
            identity: sha.into(),
            commit_sha: sha.into(),
            matched_by: ReleaseMatchKind::Tag,
            published_at: Utc::now() - Duration::hours(hours_ago),
            commit_authors: HashSet::new(),
            prs: Vec::new(),
        }
    }

    #[test]
    fn nearer_release_claims_shared_ancestors_first() {
        // root <- c1 <- c2 (release B, older) <- c3 (release A, newer, HEAD)
        let mut parents = HashMap::new();
        parents.insert("c3".to_string(), vec!["c2".to_string()]);
        parents.insert("c2".to_string(), vec!["c1".to_string()]);
        parents.insert("c1".to_string(), vec![]);
        let dag = CommitDag {
            repository_full_name: "org/repo".into(),
            parents,
            head: Some("c3".to_string()),
        };

        let mut releases = vec![release("c3", 1), release("c2", 10)];
        let mk = |sha: &str, author: i64, parents: Vec<&str>| RawCommit {
            sha: sha.into(),
            repository_full_name: "org/repo".into(),
            author: Some(author),
            committer: Some(author),
            authored_at: Utc::now(),
            committed_at: Utc::now(),
            parents: parents.into_iter().map(String::from).collect(),
            message: String::new(),
        };
        let commits = vec![
            mk("c1", 1, vec![]),
            mk("c2", 2, vec!["c1"]),
            mk("c3", 3, vec!["c2"]),
        ];
        let links = vec![
            RawPrCommitLink { pr_node_id: 100, commit_sha: "c2".into() },
            RawPrCommitLink { pr_node_id: 200, commit_sha: "c3".into() },
        ];

        link_prs_to_releases(&mut releases, &dag, &links, &commits);

        let by_sha = |sha: &str| releases.iter().find(|r| r.commit_sha == sha).unwrap();
        assert_eq!(by_sha("c3").prs, vec![200]);
        assert_eq!(by_sha("c2").prs, vec![100]);
        assert!(by_sha("c3").commit_authors.contains(&3));
        assert!(!by_sha("c2").commit_authors.contains(&3), "c3 already claimed by the newer release");
    }
}
