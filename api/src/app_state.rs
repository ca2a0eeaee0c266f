//! Shared handler state and the `X-Account-Id` pass-through extractor
//! (SPEC_FULL §6): auth, GraphQL, and OpenAPI generation are out of scope,
//! so this header is the entire "who is asking" surface the stub exposes.

use std::sync::Arc;

use axum::extract::{FromRequestParts, State};
use axum::http::request::Parts;
use fact_cache::FactCache;
use storage_gateway::model::AccountId;
use storage_gateway::{MetadataStore, PersistentDataStore, PrecomputedStore, StateStore};

use crate::error_handler::AppError;

#[derive(Clone)]
pub struct AppState {
    pub state: Arc<dyn StateStore>,
    pub metadata: Arc<dyn MetadataStore>,
    pub precomputed: Arc<dyn PrecomputedStore>,
    pub persistentdata: Arc<dyn PersistentDataStore>,
    pub cache: Arc<FactCache>,
}

pub type SharedState = State<Arc<AppState>>;

/// Extracts the account id from `X-Account-Id`. No token is verified —
/// real authentication is out of scope (SPEC_FULL §1 Non-goals).
pub struct AccountIdHeader(pub AccountId);

impl<S> FromRequestParts<S> for AccountIdHeader
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let raw = parts
            .headers
            .get("X-Account-Id")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| AppError::RequestInvalid {
                detail: "missing X-Account-Id header".into(),
                pointer: None,
            })?;
        let account = raw.parse::<AccountId>().map_err(|_| AppError::RequestInvalid {
            detail: format!("X-Account-Id header is not a valid account id: {raw}"),
            pointer: None,
        })?;
        Ok(AccountIdHeader(account))
    }
}
