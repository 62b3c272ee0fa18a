// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! HTTP server: application state, router, and serving

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::api::detect::detect_handler;
use crate::classifier::ClassifyColor;
use crate::detector::Detect;
use crate::vision::image_utils::MAX_UPLOAD_SIZE;

/// Shared application state: the two model handles, loaded once at startup
/// and treated as read-only for the life of the process.
#[derive(Clone)]
pub struct AppState {
    pub detector: Arc<dyn Detect>,
    pub classifier: Arc<dyn ClassifyColor>,
}

impl AppState {
    pub fn new(detector: Arc<dyn Detect>, classifier: Arc<dyn ClassifyColor>) -> Self {
        Self {
            detector,
            classifier,
        }
    }
}

/// Build the service router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        // Liveness check
        .route("/", get(home_handler))
        // Detection endpoint
        .route("/detect", post(detect_handler))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_SIZE))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind and serve until the process exits
pub async fn start_server(addr: SocketAddr, state: AppState) -> anyhow::Result<()> {
    let app = build_router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;

    tracing::info!("API server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

async fn home_handler() -> &'static str {
    "Backend is running!"
}
