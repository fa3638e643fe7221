// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
// Image download against a local fixture server

use lucent::vision::{FetchError, ImageFetcher};
use std::time::Duration;

use crate::common::{spawn_fixture_server, white_png};

#[tokio::test]
async fn test_fetch_png() {
    let addr = spawn_fixture_server().await;
    let fetcher = ImageFetcher::new(Duration::from_secs(5), 1024 * 1024).unwrap();

    let bytes = fetcher
        .fetch(&format!("http://{}/image.png", addr))
        .await
        .unwrap();
    assert_eq!(bytes.as_ref(), white_png(64, 64).as_slice());
}

#[tokio::test]
async fn test_fetch_non_success_status() {
    let addr = spawn_fixture_server().await;
    let fetcher = ImageFetcher::new(Duration::from_secs(5), 1024 * 1024).unwrap();

    let err = fetcher
        .fetch(&format!("http://{}/missing.png", addr))
        .await
        .unwrap_err();
    assert!(matches!(err, FetchError::Status(404)));
    assert!(!err.is_invalid_url());
}

#[tokio::test]
async fn test_fetch_enforces_size_cap() {
    let addr = spawn_fixture_server().await;
    let fetcher = ImageFetcher::new(Duration::from_secs(5), 16).unwrap();

    let err = fetcher
        .fetch(&format!("http://{}/image.png", addr))
        .await
        .unwrap_err();
    assert!(matches!(err, FetchError::TooLarge(16)));
}

#[tokio::test]
async fn test_fetch_connection_refused() {
    let closed = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap()
    };
    let fetcher = ImageFetcher::new(Duration::from_secs(5), 1024).unwrap();

    let err = fetcher
        .fetch(&format!("http://{}/image.png", closed))
        .await
        .unwrap_err();
    assert!(matches!(err, FetchError::Request(_)));
}
