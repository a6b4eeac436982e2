// SPDX-FileCopyrightText: 2026 Recap Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Gateway HTTP server built on axum.
//!
//! Sets up routes, middleware, and shared state for the gateway.

use std::any::Any;
use std::sync::Arc;

use axum::{Router, middleware as axum_middleware, response::Response, routing::get};
use recap_config::model::GatewayConfig;
use recap_core::{RecapError, StorageAdapter};
use tokio_util::sync::CancellationToken;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::trace::TraceLayer;

use crate::auth::{AuthConfig, auth_middleware};
use crate::handlers;

/// Shared state for axum request handlers.
#[derive(Clone)]
pub struct GatewayState {
    pub storage: Arc<dyn StorageAdapter>,
    /// Whether `/health` pings the store.
    pub check_storage: bool,
    pub auth: AuthConfig,
}

impl GatewayState {
    pub fn new(storage: Arc<dyn StorageAdapter>, config: &GatewayConfig) -> Self {
        Self {
            storage,
            check_storage: config.check_storage,
            auth: AuthConfig::new(config.secret_key.clone()),
        }
    }
}

/// Routes without the outer middleware stack.
///
/// - GET /health (public)
/// - GET /v1/groups (bearer auth)
/// - anything else: 404
pub fn routes(state: GatewayState) -> Router {
    let public_routes = Router::new()
        .route("/health", get(handlers::get_health))
        .with_state(state.clone());

    let admin_routes = Router::new()
        .route("/v1/groups", get(handlers::get_groups))
        .route_layer(axum_middleware::from_fn_with_state(
            state.auth.clone(),
            auth_middleware,
        ))
        .with_state(state);

    Router::new()
        .merge(public_routes)
        .merge(admin_routes)
        .fallback(handlers::not_found)
}

/// Adds panic recovery and request tracing to `router`.
pub fn with_middleware(router: Router) -> Router {
    router
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(TraceLayer::new_for_http())
}

/// The complete application router.
pub fn router(state: GatewayState) -> Router {
    with_middleware(routes(state))
}

fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = err
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| err.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    tracing::error!(detail, "request handler panicked");
    handlers::internal_error()
}

/// Binds `host:port` and serves until `cancel` fires.
pub async fn serve(
    config: &GatewayConfig,
    state: GatewayState,
    cancel: CancellationToken,
) -> Result<(), RecapError> {
    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| RecapError::Internal(format!("failed to bind gateway to {addr}: {e}")))?;

    tracing::info!(addr = addr.as_str(), "gateway listening");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(async move { cancel.cancelled().await })
        .await
        .map_err(|e| RecapError::Internal(format!("gateway server error: {e}")))?;

    tracing::info!("gateway stopped");
    Ok(())
}
