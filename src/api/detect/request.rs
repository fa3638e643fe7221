// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Detection request parameters

use serde::Deserialize;

use crate::api::errors::ApiError;

/// Query string of the detection function
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DetectQuery {
    /// URL of the image to annotate
    #[serde(rename = "imageUrl", default)]
    pub image_url: Option<String>,
}

impl DetectQuery {
    /// Return the trimmed image URL, or `MissingImageUrl`
    pub fn validate(&self) -> Result<&str, ApiError> {
        match self.image_url.as_deref().map(str::trim) {
            Some(url) if !url.is_empty() => Ok(url),
            _ => Err(ApiError::MissingImageUrl),
        }
    }
}
