// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
// Health endpoint reports the active detector settings

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
};
use image::RgbImage;
use lucent::api::HealthResponse;
use lucent::vision::{Detection, DetectionThresholds, ObjectDetector};
use std::sync::Arc;
use tower::ServiceExt;

use crate::common::{test_router, StubDetector, CAPTION};

#[tokio::test]
async fn test_health_reports_detector() {
    let response = test_router(Arc::new(StubDetector::default()))
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let bytes = to_bytes(response.into_body(), 64 * 1024).await.unwrap();
    let health: HealthResponse = serde_json::from_slice(&bytes).unwrap();

    assert_eq!(health.status, "ok");
    assert_eq!(health.model, "stub-detector");
    assert_eq!(health.device, "cpu");
    assert_eq!(health.caption, CAPTION);
    assert!((health.box_threshold - 0.30).abs() < 1e-6);
    assert!((health.text_threshold - 0.25).abs() < 1e-6);
    assert_eq!(health.version, env!("CARGO_PKG_VERSION"));
}

struct GpuDetector;

impl ObjectDetector for GpuDetector {
    fn name(&self) -> &str {
        "gpu-detector"
    }

    fn device(&self) -> &str {
        "cuda"
    }

    fn predict(
        &self,
        _image: &RgbImage,
        _caption: &str,
        _thresholds: DetectionThresholds,
    ) -> anyhow::Result<Vec<Detection>> {
        Ok(Vec::new())
    }
}

#[tokio::test]
async fn test_health_reports_execution_device() {
    let response = test_router(Arc::new(GpuDetector))
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    let bytes = to_bytes(response.into_body(), 64 * 1024).await.unwrap();
    let health: HealthResponse = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(health.model, "gpu-detector");
    assert_eq!(health.device, "cuda");
}

#[tokio::test]
async fn test_unknown_route_is_404() {
    let response = test_router(Arc::new(StubDetector::default()))
        .oneshot(Request::builder().uri("/api/other").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
