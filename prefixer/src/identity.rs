//! Per-account identity maps: user-node → login, repo-node → full-name.

use std::collections::HashMap;
use storage_gateway::model::{RepoNodeId, UserNodeId};
use storage_gateway::{MetadataStore, StorageResult};

#[derive(Debug, Clone, Default)]
pub struct Prefixer {
    user_login: HashMap<UserNodeId, String>,
    repo_full_name: HashMap<RepoNodeId, String>,
}

impl Prefixer {
    /// Loads the identity maps for exactly the ids the caller names; callers
    /// are expected to collect the ids they need from an earlier mining pass
    /// rather than loading an account's entire identity space up front.
    pub async fn load(
        metadata: &dyn MetadataStore,
        user_ids: &[UserNodeId],
        repo_ids: &[RepoNodeId],
    ) -> StorageResult<Self> {
        let user_login = metadata.fetch_user_logins(user_ids).await?;
        let repo_full_name = metadata.fetch_repo_full_names(repo_ids).await?;
        Ok(Self {
            user_login,
            repo_full_name,
        })
    }

    pub fn login(&self, user: UserNodeId) -> Option<&str> {
        self.user_login.get(&user).map(|s| s.as_str())
    }

    pub fn repo_name(&self, repo: RepoNodeId) -> Option<&str> {
        self.repo_full_name.get(&repo).map(|s| s.as_str())
    }

    pub fn resolve_logins<'a>(&'a self, users: impl IntoIterator<Item = UserNodeId> + 'a) -> Vec<&'a str> {
        users.into_iter().filter_map(|u| self.login(u)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolves_known_logins_and_skips_unknown() {
        let mut p = Prefixer::default();
        p.user_login.insert(1, "alice".into());
        let logins = p.resolve_logins([1, 2]);
        assert_eq!(logins, vec!["alice"]);
    }
}
