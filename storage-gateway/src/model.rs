//! Raw entity shapes read straight out of the four logical stores, before
//! any mining or fact derivation happens. Derived facts (PR facts, release
//! facts, mined check runs) live in their owning crates, not here.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

pub type AccountId = i64;
pub type RepositorySetId = i64;
pub type TeamId = i64;
pub type UserNodeId = i64;
pub type RepoNodeId = i64;
pub type PrNodeId = i64;

/// Tenant identifier. Every store access is scoped by this id; callers must
/// never cross it (see SPEC_FULL §3 invariant).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub id: AccountId,
    pub expires_at: DateTime<Utc>,
    pub repository_sets: Vec<RepositorySetId>,
    pub jira_installation: Option<String>,
    pub feature_flags: HashSet<String>,
}

impl Account {
    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        self.expires_at > now
    }

    /// Near-expiry per SPEC_FULL §4.6: within a 7-day lookahead window.
    pub fn is_near_expiry(&self, now: DateTime<Utc>) -> bool {
        self.is_active(now) && self.expires_at - now <= chrono::Duration::days(7)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepoIdentity {
    pub node_id: RepoNodeId,
    pub full_name: String,
}

/// Ordered, versioned set of repositories an account mines over.
///
/// Invariant: `node_id`s are immutable once assigned; only `full_name` and
/// `updates_count` change across refreshes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepositorySet {
    pub id: RepositorySetId,
    pub account_id: AccountId,
    pub repositories: Vec<RepoIdentity>,
    pub updates_count: u64,
    pub precomputed: bool,
}

impl RepositorySet {
    pub fn repo_names(&self) -> Vec<&str> {
        self.repositories.iter().map(|r| r.full_name.as_str()).collect()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Team {
    pub id: TeamId,
    pub account_id: AccountId,
    pub name: String,
    pub parent_id: Option<TeamId>,
    pub members: Vec<UserNodeId>,
}

/// Flattens a team tree rooted at `root_id` into the union of member sets
/// of the root and every descendant.
///
/// Invariant (SPEC_FULL §3): the descendant set of a root is acyclic; this
/// function guards against a malformed cycle anyway by tracking visited ids,
/// since the data originates from an upstream store outside this crate's
/// control.
pub fn flatten_team_tree(teams: &[Team], root_id: TeamId) -> HashSet<UserNodeId> {
    let mut members = HashSet::new();
    let mut visited = HashSet::new();
    let mut stack = vec![root_id];
    while let Some(id) = stack.pop() {
        if !visited.insert(id) {
            continue;
        }
        if let Some(team) = teams.iter().find(|t| t.id == id) {
            members.extend(team.members.iter().copied());
            stack.extend(teams.iter().filter(|t| t.parent_id == Some(id)).map(|t| t.id));
        }
    }
    members
}

/// Raw pull request row as read from the metadata store, before mining.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawPullRequest {
    pub node_id: PrNodeId,
    pub repository_full_name: String,
    pub number: u64,
    pub author: Option<UserNodeId>,
    pub merged_by: Option<UserNodeId>,
    pub created_at: DateTime<Utc>,
    pub closed_at: Option<DateTime<Utc>>,
    pub merged_at: Option<DateTime<Utc>>,
    pub additions: u32,
    pub deletions: u32,
    pub changed_files: u32,
    pub merge_commit_sha: Option<String>,
    pub title: String,
    pub body: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReviewState {
    Approved,
    ChangesRequested,
    Commented,
    Dismissed,
    Pending,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawReview {
    pub pr_node_id: PrNodeId,
    pub author: UserNodeId,
    pub state: ReviewState,
    pub submitted_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawReviewRequest {
    pub pr_node_id: PrNodeId,
    pub requested_reviewer: UserNodeId,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawComment {
    pub pr_node_id: PrNodeId,
    pub author: UserNodeId,
    pub created_at: DateTime<Utc>,
    pub is_review_comment: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawCommit {
    pub sha: String,
    pub repository_full_name: String,
    pub author: Option<UserNodeId>,
    pub committer: Option<UserNodeId>,
    pub authored_at: DateTime<Utc>,
    pub committed_at: DateTime<Utc>,
    pub parents: Vec<String>,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawPrCommitLink {
    pub pr_node_id: PrNodeId,
    pub commit_sha: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawLabel {
    pub pr_node_id: PrNodeId,
    pub name: String,
}

/// HEAD→ROOT commit adjacency for one repository, as persisted in the
/// commit-history table described in SPEC_FULL §6 (`(repository_full_name,
/// format_version)` primary key, payload is the adjacency map). Release and
/// PR miners walk this directly; neither ever performs a live git clone.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CommitDag {
    pub repository_full_name: String,
    /// commit sha -> parent shas
    pub parents: std::collections::HashMap<String, Vec<String>>,
    pub head: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawTag {
    pub repository_full_name: String,
    pub name: String,
    pub target_sha: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawBranch {
    pub repository_full_name: String,
    pub name: String,
    pub head_sha: String,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CheckRunStatus {
    Queued,
    InProgress,
    Completed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CheckConclusion {
    Success,
    Failure,
    Neutral,
    Cancelled,
    TimedOut,
    ActionRequired,
    Stale,
    Error,
}

/// Raw check run or status-context row as read from the metadata store,
/// before disambiguation (SPEC_FULL §4.4).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawCheckRun {
    pub check_run_node_id: String,
    pub check_suite_node_id: String,
    pub repository_full_name: String,
    pub name: String,
    pub status: CheckRunStatus,
    pub conclusion: Option<CheckConclusion>,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub commit_node_id: String,
    pub commit_sha: String,
    pub url: Option<String>,
    pub author: Option<UserNodeId>,
    pub pull_request_node_id: Option<PrNodeId>,
    /// `true` for a status-context row lacking an explicit completion record.
    pub is_status_context: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReleaseMatchKind {
    Tag,
    Branch,
    Event,
}

/// Per-repository release-match configuration, one of tag/branch/event/
/// tag_or_branch (SPEC_FULL §6).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawReleaseMatchConfig {
    pub repository_full_name: String,
    pub match_kind: ReleaseMatchKind,
    pub tag_regex: Option<String>,
    pub branch_glob: Option<String>,
    /// Only meaningful when `match_kind` is conceptually `tag_or_branch`;
    /// when `true`, tag matching is attempted before falling back to branch.
    pub tag_or_branch: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PrFactsCategory {
    Open,
    Merged,
    Done,
}

/// Durable row in the PR-times table (SPEC_FULL §6): primary key
/// `(pr_node_id, release_match, format_version)`, four HSTORE-like
/// participant maps, a timestamp array, and an opaque payload blob.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrFactsRow {
    pub pr_node_id: PrNodeId,
    pub release_match: String,
    pub format_version: u32,
    pub category: PrFactsCategory,
    pub payload: Vec<u8>,
    pub labels: std::collections::HashMap<String, DateTime<Utc>>,
    pub activity_days: Vec<DateTime<Utc>>,
    pub authors: std::collections::HashMap<UserNodeId, String>,
    pub reviewers: std::collections::HashMap<UserNodeId, String>,
    pub commenters: std::collections::HashMap<UserNodeId, String>,
    pub commit_authors: std::collections::HashMap<UserNodeId, String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawDeploymentEvent {
    pub repository_full_name: String,
    pub commit_sha: String,
    pub environment: String,
    pub finished_at: DateTime<Utc>,
}

/// Durable fact-cache row. `format_version` mismatches are treated as a
/// miss at the cache layer, never here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FactCacheEntry {
    pub fingerprint: String,
    pub payload: Vec<u8>,
    pub format_version: u32,
    pub updated_at: DateTime<Utc>,
}

/// A single numeric metric outcome, with a derived confidence score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricValue {
    pub exists: bool,
    pub value: Option<f64>,
    pub confidence_min: Option<f64>,
    pub confidence_max: Option<f64>,
}

impl MetricValue {
    pub fn absent() -> Self {
        MetricValue {
            exists: false,
            value: None,
            confidence_min: None,
            confidence_max: None,
        }
    }

    pub fn exact(value: f64) -> Self {
        MetricValue {
            exists: true,
            value: Some(value),
            confidence_min: Some(value),
            confidence_max: Some(value),
        }
    }

    pub fn with_interval(value: f64, lo: f64, hi: f64) -> Self {
        MetricValue {
            exists: true,
            value: Some(value),
            confidence_min: Some(lo),
            confidence_max: Some(hi),
        }
    }

    /// `100 − min(100, 100·(hi−lo)/value)` when the value exists, else 0.
    pub fn confidence_score(&self) -> f64 {
        if !self.exists {
            return 0.0;
        }
        let (Some(value), Some(lo), Some(hi)) = (self.value, self.confidence_min, self.confidence_max) else {
            return 0.0;
        };
        if value == 0.0 {
            return 100.0;
        }
        100.0 - (100.0 * (hi - lo) / value).min(100.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn confidence_score_is_zero_when_absent() {
        assert_eq!(MetricValue::absent().confidence_score(), 0.0);
    }

    #[test]
    fn confidence_score_is_hundred_for_exact_value() {
        assert_eq!(MetricValue::exact(3.0).confidence_score(), 100.0);
    }

    #[test]
    fn flatten_team_tree_unions_descendants() {
        let teams = vec![
            Team { id: 1, account_id: 1, name: "root".into(), parent_id: None, members: vec![10] },
            Team { id: 2, account_id: 1, name: "child".into(), parent_id: Some(1), members: vec![20] },
            Team { id: 3, account_id: 1, name: "grandchild".into(), parent_id: Some(2), members: vec![30] },
        ];
        let members = flatten_team_tree(&teams, 1);
        assert_eq!(members, HashSet::from([10, 20, 30]));
    }
}
