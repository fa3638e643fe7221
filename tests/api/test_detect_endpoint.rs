// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
// Detection endpoint over HTTP: query handling, status codes, PNG output

use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    response::Response,
};
use std::sync::Arc;
use tower::ServiceExt;

use crate::common::{
    spawn_fixture_server, test_router, wound_detection, StubDetector, CAPTION, FUNCTION_ROUTE,
};

const BODY_LIMIT: usize = 16 * 1024 * 1024;

async fn get(router: axum::Router, uri: &str) -> Response {
    router
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap()
}

async fn body_text(response: Response) -> String {
    let bytes = to_bytes(response.into_body(), BODY_LIMIT).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

#[tokio::test]
async fn test_missing_image_url_returns_400() {
    let detector = Arc::new(StubDetector::default());
    let response = get(test_router(detector.clone()), FUNCTION_ROUTE).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_text(response).await,
        "Please pass an imageUrl in the query string"
    );
    assert_eq!(detector.call_count(), 0);
}

#[tokio::test]
async fn test_empty_image_url_returns_400() {
    let detector = Arc::new(StubDetector::default());
    let response = get(test_router(detector), &format!("{}?imageUrl=", FUNCTION_ROUTE)).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_unsupported_scheme_returns_400() {
    let detector = Arc::new(StubDetector::default());
    let response = get(
        test_router(detector.clone()),
        &format!("{}?imageUrl=file:///etc/passwd", FUNCTION_ROUTE),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(body_text(response).await.starts_with("Invalid imageUrl"));
    assert_eq!(detector.call_count(), 0);
}

#[tokio::test]
async fn test_non_image_content_returns_400() {
    let addr = spawn_fixture_server().await;
    let detector = Arc::new(StubDetector::default());
    let uri = format!("{}?imageUrl=http://{}/page.html", FUNCTION_ROUTE, addr);

    let response = get(test_router(detector.clone()), &uri).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_text(response).await, "Failed to load image from URL");
    assert_eq!(detector.call_count(), 0);
}

#[tokio::test]
async fn test_remote_404_returns_400() {
    let addr = spawn_fixture_server().await;
    let detector = Arc::new(StubDetector::default());
    let uri = format!("{}?imageUrl=http://{}/missing.png", FUNCTION_ROUTE, addr);

    let response = get(test_router(detector), &uri).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_text(response).await, "Failed to load image from URL");
}

#[tokio::test]
async fn test_unreachable_host_returns_400() {
    let detector = Arc::new(StubDetector::default());
    let closed = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap()
    };
    let uri = format!("{}?imageUrl=http://{}/image.png", FUNCTION_ROUTE, closed);

    let response = get(test_router(detector), &uri).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_valid_image_returns_annotated_png() {
    let addr = spawn_fixture_server().await;
    let detector = Arc::new(StubDetector::with_detections(vec![wound_detection()]));
    let uri = format!("{}?imageUrl=http://{}/image.png", FUNCTION_ROUTE, addr);

    let response = get(test_router(detector.clone()), &uri).await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "image/png");

    let bytes = to_bytes(response.into_body(), BODY_LIMIT).await.unwrap();
    let annotated = image::load_from_memory(&bytes).unwrap().to_rgb8();
    assert_eq!(annotated.dimensions(), (64, 64));
    // Left edge of the box is drawn over the white source
    assert_ne!(annotated.get_pixel(8, 45), &image::Rgb([255, 255, 255]));

    let calls = detector.calls.lock().unwrap();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0], (64, 64, CAPTION.to_string()));
}

#[tokio::test]
async fn test_no_detections_returns_unchanged_image() {
    let addr = spawn_fixture_server().await;
    let detector = Arc::new(StubDetector::default());
    let uri = format!("{}?imageUrl=http://{}/image.png", FUNCTION_ROUTE, addr);

    let response = get(test_router(detector), &uri).await;
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = to_bytes(response.into_body(), BODY_LIMIT).await.unwrap();
    let annotated = image::load_from_memory(&bytes).unwrap().to_rgb8();
    assert!(annotated.pixels().all(|p| p.0 == [255, 255, 255]));
}

#[tokio::test]
async fn test_detector_failure_returns_500() {
    let addr = spawn_fixture_server().await;
    let detector = Arc::new(StubDetector::failing());
    let uri = format!("{}?imageUrl=http://{}/image.png", FUNCTION_ROUTE, addr);

    let response = get(test_router(detector), &uri).await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body_text(response).await, "Failed to run detection");
}

#[tokio::test]
async fn test_standalone_route_serves_function() {
    let addr = spawn_fixture_server().await;
    let detector = Arc::new(StubDetector::default());
    let uri = format!("/detect?imageUrl=http://{}/image.png", addr);

    let response = get(test_router(detector), &uri).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "image/png");
}

#[tokio::test]
async fn test_post_with_query_is_accepted() {
    let addr = spawn_fixture_server().await;
    let detector = Arc::new(StubDetector::default());
    let uri = format!("{}?imageUrl=http://{}/image.png", FUNCTION_ROUTE, addr);

    let response = test_router(detector)
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}
