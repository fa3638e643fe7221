// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use std::fmt;

use crate::vision::{FetchError, PipelineError};

/// Errors surfaced by the detection function
///
/// Every variant renders as a plain-text body; messages are meant for the
/// caller and never include internal detail.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiError {
    MissingImageUrl,
    InvalidImageUrl(String),
    ImageLoadFailed,
    DetectionFailed,
    EncodeFailed,
}

impl ApiError {
    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::MissingImageUrl
            | ApiError::InvalidImageUrl(_)
            | ApiError::ImageLoadFailed => 400,
            ApiError::DetectionFailed | ApiError::EncodeFailed => 500,
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::MissingImageUrl => {
                write!(f, "Please pass an imageUrl in the query string")
            }
            ApiError::InvalidImageUrl(reason) => write!(f, "Invalid imageUrl: {}", reason),
            ApiError::ImageLoadFailed => write!(f, "Failed to load image from URL"),
            ApiError::DetectionFailed => write!(f, "Failed to run detection"),
            ApiError::EncodeFailed => write!(f, "Failed to encode image"),
        }
    }
}

impl std::error::Error for ApiError {}

impl From<FetchError> for ApiError {
    fn from(err: FetchError) -> Self {
        if err.is_invalid_url() {
            ApiError::InvalidImageUrl(err.to_string())
        } else {
            ApiError::ImageLoadFailed
        }
    }
}

impl From<PipelineError> for ApiError {
    fn from(err: PipelineError) -> Self {
        match err {
            PipelineError::Decode(_) => ApiError::ImageLoadFailed,
            PipelineError::Inference(_) => ApiError::DetectionFailed,
            PipelineError::Encode(_) => ApiError::EncodeFailed,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (
            status,
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            self.to_string(),
        )
            .into_response()
    }
}
