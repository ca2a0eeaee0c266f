//! Caches [`crate::mining::mine_releases`] output keyed by the fingerprint
//! of the compiled match settings it ran against.

use crate::error::ReleaseMinerResult;
use crate::mining::{mine_releases, ReleaseMiningRequest, FORMAT_VERSION};
use crate::model::Release;
use fact_cache::{FactCache, FingerprintInput};
use storage_gateway::{MetadataStore, PrecomputedStore, RequestContext};

const TOPIC: &str = "releases";

pub async fn mine_releases_cached(
    metadata: &dyn MetadataStore,
    precomputed: &dyn PrecomputedStore,
    cache: &FactCache,
    ctx: &RequestContext,
    account: i64,
    request: &ReleaseMiningRequest<'_>,
) -> ReleaseMinerResult<Vec<Release>> {
    // Release mining has no time window of its own (it walks the full DAG
    // per repository), so both bounds are pinned to the epoch; only the
    // account, match settings, and flags vary the fingerprint.
    let epoch = chrono::DateTime::<chrono::Utc>::from_timestamp(0, 0).unwrap();
    let release_match_fingerprints: Vec<String> =
        request.settings.iter().map(|s| s.fingerprint.clone()).collect();
    let fingerprint = fact_cache::compute_fingerprint(&FingerprintInput {
        account,
        window_from: epoch,
        window_to: epoch,
        filters: serde_json::json!({ "hide_first_release": request.hide_first_release }),
        release_match_fingerprints,
        format_version: FORMAT_VERSION,
    });

    if let Some(bytes) = cache.get(ctx, TOPIC, &fingerprint).await? {
        return Ok(serde_json::from_slice(&bytes)?);
    }

    let releases = mine_releases(metadata, precomputed, request).await?;
    let bytes = serde_json::to_vec(&releases)?;
    cache.put(&fingerprint, bytes).await?;
    Ok(releases)
}
