// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Shared fixtures for integration tests

#![allow(dead_code)]

use axum::{http::header, routing::get, Router};
use image::{Rgb, RgbImage};
use lucent::{
    api::{create_router, AppState},
    vision::{
        encode_png, BoundingBox, Detection, DetectionPipeline, DetectionThresholds,
        ImageFetcher, ObjectDetector,
    },
};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const CAPTION: &str = "wound. ulcer. callus.";
pub const FUNCTION_ROUTE: &str = "/api/lucent";

/// Detector returning canned detections and recording what it was given
#[derive(Default)]
pub struct StubDetector {
    pub detections: Vec<Detection>,
    pub fail: bool,
    pub calls: Mutex<Vec<(u32, u32, String)>>,
}

impl StubDetector {
    pub fn with_detections(detections: Vec<Detection>) -> Self {
        Self {
            detections,
            ..Default::default()
        }
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

impl ObjectDetector for StubDetector {
    fn name(&self) -> &str {
        "stub-detector"
    }

    fn predict(
        &self,
        image: &RgbImage,
        caption: &str,
        _thresholds: DetectionThresholds,
    ) -> anyhow::Result<Vec<Detection>> {
        self.calls
            .lock()
            .unwrap()
            .push((image.width(), image.height(), caption.to_string()));
        if self.fail {
            anyhow::bail!("stub inference failure");
        }
        Ok(self.detections.clone())
    }
}

pub fn wound_detection() -> Detection {
    Detection {
        bbox: BoundingBox {
            x1: 8.0,
            y1: 30.0,
            x2: 56.0,
            y2: 60.0,
        },
        confidence: 0.52,
        phrase: "wound".to_string(),
    }
}

/// Solid white PNG
pub fn white_png(width: u32, height: u32) -> Vec<u8> {
    encode_png(&RgbImage::from_pixel(width, height, Rgb([255, 255, 255]))).unwrap()
}

/// Serve fixture content on an ephemeral local port
///
/// - `/image.png` - 64x64 white PNG
/// - `/page.html` - HTML served as an image would be
/// - `/missing.png` - 404
pub async fn spawn_fixture_server() -> SocketAddr {
    let png = white_png(64, 64);

    let app = Router::new()
        .route(
            "/image.png",
            get(move || {
                let png = png.clone();
                async move { ([(header::CONTENT_TYPE, "image/png")], png) }
            }),
        )
        .route(
            "/page.html",
            get(|| async { ([(header::CONTENT_TYPE, "text/html")], "<html>not an image</html>") }),
        )
        .route(
            "/missing.png",
            get(|| async { (axum::http::StatusCode::NOT_FOUND, "gone") }),
        );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

pub fn test_state(detector: Arc<dyn ObjectDetector>) -> AppState {
    let pipeline = DetectionPipeline::new(
        detector,
        CAPTION,
        DetectionThresholds::default(),
        lucent::vision::image_utils::MAX_IMAGE_SIZE,
    );
    let fetcher = ImageFetcher::new(Duration::from_secs(5), 1024 * 1024).unwrap();
    AppState::new(pipeline, fetcher)
}

pub fn test_router(detector: Arc<dyn ObjectDetector>) -> Router {
    create_router(test_state(detector), FUNCTION_ROUTE)
}
