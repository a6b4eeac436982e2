// SPDX-FileCopyrightText: 2026 Recap Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP request handlers for the gateway.
//!
//! Handles GET /health, GET /v1/groups, and unknown routes.

use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use recap_core::{GroupStats, HealthStatus, PluginAdapter, RecapError, StorageAdapter};
use serde::Serialize;
use tracing::error;

use crate::server::GatewayState;

/// Response body for GET /health.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// Response body for GET /v1/groups.
#[derive(Debug, Serialize)]
pub struct GroupListResponse {
    pub groups: Vec<GroupStats>,
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: &'static str,
}

pub(crate) const NOT_FOUND: &str = "Resource not found";
pub(crate) const INTERNAL_ERROR: &str = "Internal server error";
pub(crate) const UNAUTHORIZED: &str = "Unauthorized";

/// A handler failure. Always rendered as a fixed 500 body; the cause is
/// only logged.
#[derive(Debug)]
pub struct ApiError(RecapError);

impl From<RecapError> for ApiError {
    fn from(e: RecapError) -> Self {
        Self(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        error!(error = %self.0, "request failed");
        internal_error()
    }
}

pub(crate) fn internal_error() -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse {
            error: INTERNAL_ERROR,
        }),
    )
        .into_response()
}

pub(crate) fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(ErrorResponse {
            error: UNAUTHORIZED,
        }),
    )
        .into_response()
}

/// GET /health
///
/// With `check_storage` enabled the store must answer a ping.
pub async fn get_health(
    State(state): State<GatewayState>,
) -> Result<Json<HealthResponse>, ApiError> {
    if state.check_storage {
        match state.storage.health_check().await? {
            HealthStatus::Healthy | HealthStatus::Degraded(_) => {}
            HealthStatus::Unhealthy(reason) => {
                return Err(ApiError(RecapError::Storage {
                    source: reason.into(),
                }));
            }
        }
    }
    Ok(Json(HealthResponse { status: "healthy" }))
}

/// GET /v1/groups
///
/// Lists known groups with their stored message counts.
pub async fn get_groups(
    State(state): State<GatewayState>,
) -> Result<Json<GroupListResponse>, ApiError> {
    let groups = state.storage.list_groups().await?;
    Ok(Json(GroupListResponse { groups }))
}

/// Fallback for unknown routes.
pub async fn not_found() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse { error: NOT_FOUND }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn health_response_serializes() {
        let json = serde_json::to_value(HealthResponse { status: "healthy" }).unwrap();
        assert_eq!(json, serde_json::json!({"status": "healthy"}));
    }

    #[test]
    fn api_error_is_opaque_500() {
        let response = ApiError(RecapError::Internal("secret detail".into())).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
