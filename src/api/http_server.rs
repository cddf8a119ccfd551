// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use std::future::Future;
use std::net::SocketAddr;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use super::handlers::{classes_handler, health_handler, root_handler};
use super::predict::{batch_predict_handler, predict_handler};
use crate::vision::{ModelManager, MAX_BATCH_SIZE};

/// Default cap on a request body (a full batch of large photos fits)
pub const DEFAULT_MAX_BODY_BYTES: usize = 50 * 1024 * 1024;

/// Shared state handed to every handler
#[derive(Debug, Clone)]
pub struct AppState {
    pub model_manager: ModelManager,
    pub max_batch_size: usize,
    pub max_body_bytes: usize,
}

impl AppState {
    pub fn new(model_manager: ModelManager, max_batch_size: usize, max_body_bytes: usize) -> Self {
        Self {
            model_manager,
            max_batch_size,
            max_body_bytes,
        }
    }

    /// State with an empty model slot and default limits
    pub fn new_for_test() -> Self {
        Self::new(ModelManager::new(), MAX_BATCH_SIZE, DEFAULT_MAX_BODY_BYTES)
    }
}

pub fn create_app(state: AppState) -> Router {
    Router::new()
        .route("/", get(root_handler))
        .route("/health", get(health_handler))
        .route("/classes", get(classes_handler))
        .route("/predict", post(predict_handler))
        .route("/batch-predict", post(batch_predict_handler))
        .layer(DefaultBodyLimit::max(state.max_body_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Serve until `shutdown` resolves
pub async fn start_server<F>(addr: SocketAddr, state: AppState, shutdown: F) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let app = create_app(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;

    info!("API server listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;

    Ok(())
}
