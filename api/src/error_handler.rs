//! Converts whatever error reached a handler into the problem-document
//! envelope (SPEC_FULL §6/§7): `{type, title, status, detail, instance?,
//! pointer?}`. Of §7's seven kinds, only four have an error source on this
//! stub surface — request-invalid, not-found, upstream-unavailable,
//! internal; access-denied, conflict, and rate-limited all need auth/state-
//! mutation/cooldown machinery this surface doesn't implement.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

use crate::config::ConfigError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to bind listener")]
    Bind(#[source] std::io::Error),

    #[error("server error")]
    Server(#[source] std::io::Error),

    /// Field-level validation failure; `pointer` is a JSON-pointer into the
    /// request body naming the offending field.
    #[error("{detail}")]
    RequestInvalid { detail: String, pointer: Option<String> },

    #[error("not found")]
    NotFound,

    #[error(transparent)]
    Planner(#[from] request_planner::PlannerError),

    #[error(transparent)]
    Pr(#[from] pr_miner::PrMinerError),

    #[error(transparent)]
    Release(#[from] release_miner::ReleaseMinerError),

    #[error(transparent)]
    CheckRun(#[from] check_run_miner::CheckRunMinerError),

    #[error(transparent)]
    Storage(#[from] storage_gateway::StorageError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ProblemKind {
    RequestInvalid,
    NotFound,
    UpstreamUnavailable,
    Internal,
}

impl AppError {
    fn kind(&self) -> ProblemKind {
        match self {
            AppError::Config(_) | AppError::Bind(_) | AppError::Server(_) => ProblemKind::Internal,
            AppError::RequestInvalid { .. } => ProblemKind::RequestInvalid,
            AppError::NotFound => ProblemKind::NotFound,
            AppError::Planner(request_planner::PlannerError::Invalid(_)) => ProblemKind::RequestInvalid,
            AppError::Planner(_) => ProblemKind::Internal,
            AppError::Pr(_) | AppError::Release(_) | AppError::CheckRun(_) => ProblemKind::UpstreamUnavailable,
            AppError::Storage(_) => ProblemKind::UpstreamUnavailable,
        }
    }

    fn status(&self) -> StatusCode {
        match self.kind() {
            ProblemKind::RequestInvalid => StatusCode::BAD_REQUEST,
            ProblemKind::NotFound => StatusCode::NOT_FOUND,
            ProblemKind::UpstreamUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            ProblemKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn problem_type(&self) -> &'static str {
        match self.kind() {
            ProblemKind::RequestInvalid => "https://errors.example/request-invalid",
            ProblemKind::NotFound => "https://errors.example/not-found",
            ProblemKind::UpstreamUnavailable => "https://errors.example/upstream-unavailable",
            ProblemKind::Internal => "https://errors.example/internal",
        }
    }

    fn title(&self) -> &'static str {
        match self.kind() {
            ProblemKind::RequestInvalid => "Request invalid",
            ProblemKind::NotFound => "Not found",
            ProblemKind::UpstreamUnavailable => "Upstream unavailable",
            ProblemKind::Internal => "Internal error",
        }
    }

    fn pointer(&self) -> Option<String> {
        match self {
            AppError::RequestInvalid { pointer, .. } => pointer.clone(),
            _ => None,
        }
    }
}

#[derive(Serialize)]
struct ProblemDocument {
    r#type: &'static str,
    title: &'static str,
    status: u16,
    detail: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    instance: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pointer: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let retry_after = matches!(self.kind(), ProblemKind::UpstreamUnavailable).then_some("1");
        let body = ProblemDocument {
            r#type: self.problem_type(),
            title: self.title(),
            status: status.as_u16(),
            detail: self.to_string(),
            instance: None,
            pointer: self.pointer(),
        };
        let mut response = (status, Json(body)).into_response();
        if let Some(v) = retry_after {
            response.headers_mut().insert(axum::http::header::RETRY_AFTER, axum::http::HeaderValue::from_static(v));
        }
        response
    }
}

pub type AppResult<T> = Result<T, AppError>;

impl From<axum::extract::rejection::JsonRejection> for AppError {
    fn from(err: axum::extract::rejection::JsonRejection) -> Self {
        AppError::RequestInvalid { detail: err.to_string(), pointer: None }
    }
}

impl From<axum::extract::rejection::QueryRejection> for AppError {
    fn from(err: axum::extract::rejection::QueryRejection) -> Self {
        AppError::RequestInvalid { detail: err.to_string(), pointer: None }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_planner_requests_map_to_bad_request() {
        let err = AppError::Planner(request_planner::PlannerError::Invalid("bad window".into()));
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn not_found_maps_to_404() {
        assert_eq!(AppError::NotFound.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn request_invalid_carries_its_pointer() {
        let err = AppError::RequestInvalid { detail: "bad".into(), pointer: Some("/params/teamId".into()) };
        assert_eq!(err.pointer(), Some("/params/teamId".to_string()));
    }
}
