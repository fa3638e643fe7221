// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Remote image download

use bytes::{Bytes, BytesMut};
use std::time::Duration;
use thiserror::Error;
use tracing::debug;
use url::Url;

/// Default download timeout in seconds
pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Unsupported URL scheme '{0}', expected http or https")]
    UnsupportedScheme(String),

    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Remote server returned status {0}")]
    Status(u16),

    #[error("Image exceeds maximum size of {0} bytes")]
    TooLarge(usize),
}

impl FetchError {
    /// Whether the caller supplied a URL that could never be fetched
    pub fn is_invalid_url(&self) -> bool {
        matches!(
            self,
            FetchError::InvalidUrl { .. } | FetchError::UnsupportedScheme(_)
        )
    }
}

/// Parse and check a user-supplied image URL
pub fn parse_image_url(raw: &str) -> Result<Url, FetchError> {
    let url = Url::parse(raw.trim()).map_err(|e| FetchError::InvalidUrl {
        url: raw.to_string(),
        reason: e.to_string(),
    })?;

    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(FetchError::UnsupportedScheme(other.to_string())),
    }
}

/// HTTP client for downloading source images
#[derive(Debug, Clone)]
pub struct ImageFetcher {
    client: reqwest::Client,
    max_bytes: usize,
}

impl ImageFetcher {
    pub fn new(timeout: Duration, max_bytes: usize) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("lucent/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self { client, max_bytes })
    }

    pub fn max_bytes(&self) -> usize {
        self.max_bytes
    }

    /// Download the body at `raw_url`
    ///
    /// Non-2xx responses are failures. The size cap is checked against
    /// `Content-Length` up front and again while streaming, since servers
    /// may omit or misreport it.
    pub async fn fetch(&self, raw_url: &str) -> Result<Bytes, FetchError> {
        let url = parse_image_url(raw_url)?;
        debug!("Fetching image from {}", url);

        let mut response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        if let Some(length) = response.content_length() {
            if length as usize > self.max_bytes {
                return Err(FetchError::TooLarge(self.max_bytes));
            }
        }

        let mut body = BytesMut::new();
        while let Some(chunk) = response.chunk().await? {
            if body.len() + chunk.len() > self.max_bytes {
                return Err(FetchError::TooLarge(self.max_bytes));
            }
            body.extend_from_slice(&chunk);
        }

        debug!("Fetched {} bytes", body.len());
        Ok(body.freeze())
    }
}
