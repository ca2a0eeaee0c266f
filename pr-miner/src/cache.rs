//! Caches the output of [`crate::mining::mine_pull_requests`] keyed by the
//! fingerprint of its inputs (SPEC_FULL §4.2 "Caching").

use crate::error::PrMinerResult;
use crate::mining::{mine_pull_requests, MiningRequest};
use crate::model::PrBundle;
use fact_cache::{FactCache, FingerprintInput};
use storage_gateway::{MetadataStore, RequestContext};

const TOPIC: &str = "pr_facts";

pub async fn mine_pull_requests_cached(
    metadata: &dyn MetadataStore,
    cache: &FactCache,
    ctx: &RequestContext,
    account: i64,
    release_match_fingerprints: Vec<String>,
    request: MiningRequest<'_>,
) -> PrMinerResult<Vec<PrBundle>> {
    let filters = serde_json::json!({
        "repositories": request.repositories,
        "participants": format!("{:?}", request.participants.by_role.keys().collect::<Vec<_>>()),
        "labels_include": request.labels.include,
        "labels_exclude": request.labels.exclude,
        "blacklist": request.blacklist.iter().collect::<Vec<_>>(),
        "exclude_inactive": request.exclude_inactive,
    });
    let fingerprint = fact_cache::compute_fingerprint(&FingerprintInput {
        account,
        window_from: request.window_from,
        window_to: request.window_to,
        filters,
        release_match_fingerprints,
        format_version: fact_cache::CURRENT_FORMAT_VERSION,
    });

    if let Some(bytes) = cache.get(ctx, TOPIC, &fingerprint).await? {
        return Ok(serde_json::from_slice(&bytes)?);
    }

    let bundles = mine_pull_requests(metadata, request).await?;
    let bytes = serde_json::to_vec(&bundles)?;
    cache.put(&fingerprint, bytes).await?;
    Ok(bundles)
}
