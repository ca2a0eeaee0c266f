//! Per-PR bundles and their derived lifecycle facts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use storage_gateway::model::{
    PrNodeId, RawComment, RawCommit, RawLabel, RawPullRequest, RawReview, RawReviewRequest,
    UserNodeId,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ParticipantRole {
    Author,
    Reviewer,
    CommitAuthor,
    CommitCommitter,
    Commenter,
    Merger,
}

/// `with: {role -> logins}` from SPEC_FULL §6. A PR passes when it matches
/// at least one populated role (disjunction across roles); an empty filter
/// passes everything.
#[derive(Debug, Clone, Default)]
pub struct ParticipantFilter {
    pub by_role: std::collections::HashMap<ParticipantRole, HashSet<UserNodeId>>,
}

impl ParticipantFilter {
    pub fn is_empty(&self) -> bool {
        self.by_role.values().all(|s| s.is_empty())
    }
}

/// `labels_include` / `labels_exclude`, applied after mining (SPEC_FULL
/// §4.2 step 4). `include` is a conjunction of disjunctions: every group
/// must contribute at least one matching label.
#[derive(Debug, Clone, Default)]
pub struct LabelFilter {
    pub include: Vec<Vec<String>>,
    pub exclude: Vec<String>,
}

impl LabelFilter {
    pub fn matches(&self, labels: &HashSet<String>) -> bool {
        if self.exclude.iter().any(|l| labels.contains(l)) {
            return false;
        }
        self.include
            .iter()
            .all(|group| group.iter().any(|l| labels.contains(l)))
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PrSize {
    pub additions: u32,
    pub deletions: u32,
    pub files_changed: u32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PrTimestamps {
    pub created: Option<DateTime<Utc>>,
    pub work_began: Option<DateTime<Utc>>,
    pub first_commit: Option<DateTime<Utc>>,
    pub last_commit_before_first_review: Option<DateTime<Utc>>,
    pub first_review_request: Option<DateTime<Utc>>,
    pub first_comment_on_first_review: Option<DateTime<Utc>>,
    pub approved: Option<DateTime<Utc>>,
    pub last_review: Option<DateTime<Utc>>,
    pub merged: Option<DateTime<Utc>>,
    pub closed: Option<DateTime<Utc>>,
    pub released: Option<DateTime<Utc>>,
}

impl PrTimestamps {
    /// SPEC_FULL §3 / §8 quantified invariants, checked whenever every
    /// timestamp on the relevant chain exists.
    pub fn satisfies_invariants(&self) -> bool {
        let chain_ok = match (
            self.created,
            self.first_review_request,
            self.first_comment_on_first_review,
            self.last_review,
        ) {
            (Some(c), Some(frr), Some(fc), Some(lr)) => c <= frr && frr <= fc && fc <= lr,
            (Some(c), Some(frr), Some(fc), None) => c <= frr && frr <= fc,
            (Some(c), Some(frr), None, _) => c <= frr,
            _ => true,
        };
        let approval_chain_ok = match (self.approved, self.merged, self.released) {
            (Some(a), Some(m), Some(r)) => a <= m && m <= r,
            (Some(a), Some(m), None) => a <= m,
            _ => true,
        };
        let released_implies_merged = self.released.is_none() || self.merged.is_some();
        let last_commit_ok = match (self.first_commit, self.last_commit_before_first_review) {
            (Some(first), Some(last)) => last >= first,
            _ => true,
        };
        chain_ok && approval_chain_ok && released_implies_merged && last_commit_ok
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PrParticipants {
    pub author: Option<UserNodeId>,
    pub merger: Option<UserNodeId>,
    pub reviewers: HashSet<UserNodeId>,
    pub commenters: HashSet<UserNodeId>,
    pub commit_authors: HashSet<UserNodeId>,
    pub commit_committers: HashSet<UserNodeId>,
}

/// Derived, cacheable facts for one PR (SPEC_FULL §3 "PR facts").
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrFacts {
    pub pr_node_id: PrNodeId,
    pub repository_full_name: String,
    pub number: u64,
    pub timestamps: PrTimestamps,
    pub size: PrSize,
    pub participants: PrParticipants,
    pub labels: HashSet<String>,
    pub jira_links: HashSet<String>,
}

/// The full per-PR bundle the miner's contract promises (SPEC_FULL §4.2):
/// `{pr, reviews, review_comments, review_requests, comments, commits,
/// releases, labels}` plus the derived facts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrBundle {
    pub pr: RawPullRequest,
    pub reviews: Vec<RawReview>,
    pub review_requests: Vec<RawReviewRequest>,
    pub comments: Vec<RawComment>,
    pub commits: Vec<RawCommit>,
    pub labels: Vec<RawLabel>,
    pub facts: PrFacts,
}

impl PrBundle {
    pub fn review_comments(&self) -> impl Iterator<Item = &RawComment> {
        self.comments.iter().filter(|c| c.is_review_comment)
    }
}
