// SPDX-FileCopyrightText: 2026 Recap Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Bearer-token authentication for admin routes.
//!
//! When no secret key is configured, all admin requests are rejected
//! (fail-closed). A blank key counts as not configured. `/health` never
//! passes through this middleware. Rejections carry a JSON error body.

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use crate::handlers;

/// Authentication configuration for the gateway.
#[derive(Clone, Default)]
pub struct AuthConfig {
    /// Expected bearer token. `None` disables admin routes.
    pub bearer_token: Option<String>,
}

impl AuthConfig {
    /// Builds the config from a configured key, dropping blank keys.
    pub fn new(secret_key: Option<String>) -> Self {
        Self {
            bearer_token: secret_key.filter(|key| !key.trim().is_empty()),
        }
    }

    fn expected_token(&self) -> Option<&str> {
        self.bearer_token
            .as_deref()
            .filter(|key| !key.trim().is_empty())
    }
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field(
                "bearer_token",
                &self.bearer_token.as_ref().map(|_| "[redacted]"),
            )
            .finish()
    }
}

/// Middleware that validates `Authorization: Bearer <token>`.
pub async fn auth_middleware(
    State(auth): State<AuthConfig>,
    request: Request,
    next: Next,
) -> Response {
    let Some(expected) = auth.expected_token() else {
        tracing::warn!("gateway has no secret key configured -- rejecting admin request");
        return handlers::unauthorized();
    };

    let presented = request
        .headers()
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "));

    match presented {
        Some(token) if token == expected => next.run(request).await,
        _ => {
            tracing::debug!(path = %request.uri().path(), "admin request rejected");
            handlers::unauthorized()
        }
    }
}
