// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Detection endpoint handler

use axum::{
    extract::{Query, State},
    http::header,
    response::{IntoResponse, Response},
};
use tracing::{debug, info, warn};

use super::request::DetectQuery;
use crate::api::errors::ApiError;
use crate::api::server::AppState;

/// GET /api/lucent?imageUrl=... - Annotate an image with detections
///
/// Downloads the image, runs the fixed-caption detector over it and
/// returns the annotated image.
///
/// # Response
/// - 200 `image/png`: annotated image
///
/// # Errors (plain text)
/// - 400: missing/invalid `imageUrl`, or the image could not be loaded
/// - 500: detection or PNG encoding failed
pub async fn detect_handler(
    State(state): State<AppState>,
    Query(query): Query<DetectQuery>,
) -> Result<Response, ApiError> {
    info!("Detection request received");

    let image_url = query.validate().map_err(|e| {
        warn!("Detection request rejected: {}", e);
        e
    })?;

    let bytes = state.fetcher.fetch(image_url).await.map_err(|e| {
        warn!("Failed to fetch image from {}: {}", image_url, e);
        ApiError::from(e)
    })?;
    debug!("Downloaded {} bytes from {}", bytes.len(), image_url);

    let pipeline = state.pipeline.clone();
    let output = tokio::task::spawn_blocking(move || pipeline.run(&bytes))
        .await
        .map_err(|e| {
            warn!("Detection task panicked: {}", e);
            ApiError::DetectionFailed
        })?
        .map_err(|e| {
            warn!("Detection pipeline failed: {}", e);
            ApiError::from(e)
        })?;

    info!(
        "Image annotated: {}x{}, {} detections, {}ms",
        output.width,
        output.height,
        output.detections.len(),
        output.processing_time_ms
    );

    Ok(([(header::CONTENT_TYPE, "image/png")], output.png).into_response())
}
