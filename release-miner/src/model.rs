use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use storage_gateway::model::{PrNodeId, ReleaseMatchKind, UserNodeId};

/// One resolved release and the facts the miner attaches to it
/// (SPEC_FULL §3/§4.3): a tuple of `(repository, identity, commit,
/// matched_by, published_at, commit authors, PRs)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Release {
    pub repository_full_name: String,
    /// Tag name for `Tag` matches, branch name for `Branch` matches.
    pub identity: String,
    pub commit_sha: String,
    pub matched_by: ReleaseMatchKind,
    pub published_at: DateTime<Utc>,
    pub commit_authors: HashSet<UserNodeId>,
    pub prs: Vec<PrNodeId>,
}
