//! Thin HTTP surface (SPEC_FULL §6, "stub, out of scope for deep
//! implementation"): an axum router exposing the five request shapes as
//! POST endpoints under `/v1/...`, each deserializing its body, calling
//! into the planner/miners, and serializing either the success payload or
//! the problem-document envelope. No authentication, OpenAPI generation,
//! or GraphQL surface — those stay named-but-unimplemented.

pub mod app_state;
pub mod config;
pub mod error_handler;
pub mod routes;

use std::sync::Arc;

use axum::routing::post;
use axum::Router;
use fact_cache::{FactCache, CURRENT_FORMAT_VERSION};
use storage_gateway::mock::{InMemoryMetadataStore, InMemoryPersistentDataStore, InMemoryPrecomputedStore, InMemoryStateStore};
use tracing::info;

use crate::app_state::AppState;
use crate::config::ApiConfig;
use crate::error_handler::AppError;

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/v1/metrics/current-values", post(routes::metrics::metrics_current_values))
        .route("/v1/pull-requests/filter", post(routes::pull_requests::filter_pull_requests))
        .route("/v1/commits/filter", post(routes::commits::filter_commits))
        .route("/v1/releases/filter", post(routes::releases::filter_releases))
        .route("/v1/check-runs/filter", post(routes::check_runs::filter_check_runs))
        .with_state(state)
}

/// Boots the stub API surface. Real DB driver glue is out of scope (SPEC_FULL
/// §1 Non-goals), so the stores behind this router are in-memory until a
/// production deployment supplies real ones.
pub async fn start() -> Result<(), AppError> {
    let config = ApiConfig::from_env()?;

    let precomputed: Arc<dyn storage_gateway::PrecomputedStore> = Arc::new(InMemoryPrecomputedStore::new());
    let state = Arc::new(AppState {
        state: Arc::new(InMemoryStateStore::new()),
        metadata: Arc::new(InMemoryMetadataStore::new()),
        precomputed: precomputed.clone(),
        persistentdata: Arc::new(InMemoryPersistentDataStore::new()),
        cache: Arc::new(FactCache::new(precomputed, CURRENT_FORMAT_VERSION)),
    });

    let app = router(state);
    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await.map_err(AppError::Bind)?;
    info!(addr = %config.bind_addr, "api listening");
    axum::serve(listener, app).await.map_err(AppError::Server)?;
    Ok(())
}
