// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::api::server::AppState;
use crate::version;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    pub model: String,
    /// Execution provider of the detector (`cuda` or `cpu`)
    pub device: String,
    pub caption: String,
    pub box_threshold: f32,
    pub text_threshold: f32,
    pub version: String,
}

/// GET /health - liveness plus the active detector settings
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    let thresholds = state.pipeline.thresholds();
    Json(HealthResponse {
        status: "ok".to_string(),
        model: state.pipeline.detector_name().to_string(),
        device: state.pipeline.detector_device().to_string(),
        caption: state.pipeline.caption().to_string(),
        box_threshold: thresholds.box_threshold,
        text_threshold: thresholds.text_threshold,
        version: version::VERSION_NUMBER.to_string(),
    })
}
