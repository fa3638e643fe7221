// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::{anyhow, Context, Result};
use axum::{
    routing::get,
    Router,
};
use std::sync::Arc;
use tokio::signal;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use super::detect::detect_handler;
use super::handlers::health_handler;
use crate::config::{DetectorConfig, ServerConfig};
use crate::vision::{DetectionPipeline, ImageFetcher, ObjectDetector};

/// Path that serves the function outside the Functions host
pub const STANDALONE_ROUTE: &str = "/detect";

/// Shared, read-only request state
#[derive(Clone, Debug)]
pub struct AppState {
    pub pipeline: Arc<DetectionPipeline>,
    pub fetcher: Arc<ImageFetcher>,
}

impl AppState {
    pub fn new(pipeline: DetectionPipeline, fetcher: ImageFetcher) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
            fetcher: Arc::new(fetcher),
        }
    }

    /// Wire a loaded detector to the configured pipeline and HTTP client
    pub fn from_config(detector: Arc<dyn ObjectDetector>, config: &DetectorConfig) -> Result<Self> {
        let fetcher = ImageFetcher::new(config.fetch_timeout(), config.max_image_bytes)
            .context("Failed to build HTTP client")?;
        let pipeline = DetectionPipeline::from_config(detector, config);
        Ok(Self::new(pipeline, fetcher))
    }
}

/// Build the router
///
/// The function is served at `function_route` (GET and POST, as bound by
/// the HTTP trigger) and at `/detect`.
pub fn create_router(state: AppState, function_route: &str) -> Router {
    let mut router = Router::new()
        .route("/health", get(health_handler))
        .route(function_route, get(detect_handler).post(detect_handler));

    if function_route != STANDALONE_ROUTE {
        router = router.route(STANDALONE_ROUTE, get(detect_handler));
    }

    router
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Serve until Ctrl+C / SIGTERM
pub async fn start_server(config: &ServerConfig, state: AppState) -> Result<()> {
    let addr = config.socket_addr().map_err(|e| anyhow!(e))?;
    let app = create_router(state, &config.function_route);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!("API server listening on {}", addr);
    info!("Detection function at {}", config.function_route);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("API server failed")?;

    info!("API server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
