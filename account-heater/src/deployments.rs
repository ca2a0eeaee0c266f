//! Deployment mining join (SPEC_FULL §4.6 "supplemental, narrow"): for
//! accounts with at least one `event`-matched repository, attaches the
//! environment label from recorded deployment events to the releases the
//! heater pass already mined. No deployment-specific metric family is
//! produced — this is only the join a complete heater pass would perform.

use crate::error::HeaterResult;
use prefixer::CompiledReleaseSettings;
use release_miner::Release;
use std::collections::HashMap;
use storage_gateway::model::ReleaseMatchKind;
use storage_gateway::PersistentDataStore;

/// `(repository, commit sha) -> environment`, joined only for releases
/// belonging to a repository whose settings name `event` matching.
pub async fn join_deployment_environments(
    persistentdata: &dyn PersistentDataStore,
    settings: &[CompiledReleaseSettings],
    releases: &[Release],
) -> HeaterResult<HashMap<(String, String), String>> {
    let event_repos: Vec<&str> = settings
        .iter()
        .filter(|s| s.match_kind == ReleaseMatchKind::Event)
        .map(|s| s.repository_full_name.as_str())
        .collect();
    if event_repos.is_empty() {
        return Ok(HashMap::new());
    }

    let mut environments = HashMap::new();
    for release in releases {
        if !event_repos.contains(&release.repository_full_name.as_str()) {
            continue;
        }
        let events = persistentdata
            .fetch_deployment_events(&release.repository_full_name, std::slice::from_ref(&release.commit_sha))
            .await?;
        if let Some(event) = events.into_iter().max_by_key(|e| e.finished_at) {
            environments.insert((release.repository_full_name.clone(), release.commit_sha.clone()), event.environment);
        }
    }
    Ok(environments)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use std::collections::HashSet;
    use storage_gateway::mock::InMemoryPersistentDataStore;
    use storage_gateway::model::RawDeploymentEvent;

    fn settings(match_kind: ReleaseMatchKind) -> CompiledReleaseSettings {
        CompiledReleaseSettings {
            repository_full_name: "org/repo".into(),
            match_kind,
            tag_regex: None,
            branch_glob: None,
            tag_or_branch: false,
            fingerprint: "fp".into(),
        }
    }

    fn release() -> Release {
        Release {
            repository_full_name: "org/repo".into(),
            identity: "v1".into(),
            commit_sha: "deadbeef".into(),
            matched_by: storage_gateway::model::ReleaseMatchKind::Event,
            published_at: Utc::now(),
            commit_authors: HashSet::new(),
            prs: vec![],
        }
    }

    #[tokio::test]
    async fn joins_environment_for_event_matched_repos() {
        let store = InMemoryPersistentDataStore::new();
        store.seed_deployment(RawDeploymentEvent {
            repository_full_name: "org/repo".into(),
            commit_sha: "deadbeef".into(),
            environment: "production".into(),
            finished_at: Utc::now(),
        });

        let joined = join_deployment_environments(&store, &[settings(ReleaseMatchKind::Event)], &[release()])
            .await
            .unwrap();
        assert_eq!(joined.get(&("org/repo".to_string(), "deadbeef".to_string())), Some(&"production".to_string()));
    }

    #[tokio::test]
    async fn skips_repos_without_event_matching() {
        let store = InMemoryPersistentDataStore::new();
        let joined = join_deployment_environments(&store, &[settings(ReleaseMatchKind::Tag)], &[release()])
            .await
            .unwrap();
        assert!(joined.is_empty());
    }
}
