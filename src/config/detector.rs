// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Configuration for the detection pipeline

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::vision::detector::{DEFAULT_BOX_THRESHOLD, DEFAULT_TEXT_THRESHOLD};
use crate::vision::fetch::DEFAULT_FETCH_TIMEOUT_SECS;
use crate::vision::image_utils::MAX_IMAGE_SIZE;

/// Caption the function detects by default
pub const DEFAULT_CAPTION: &str = "wound. ulcer. callus.";

pub const DEFAULT_MODEL_PATH: &str = "./models/groundingdino-onnx/groundingdino_swint_ogc.onnx";
pub const DEFAULT_TOKENIZER_PATH: &str = "./models/groundingdino-onnx/tokenizer.json";

/// Detector, prompt and download settings
#[derive(Debug, Clone, PartialEq)]
pub struct DetectorConfig {
    /// Exported Grounding DINO graph
    pub model_path: PathBuf,
    /// bert-base-uncased `tokenizer.json`
    pub tokenizer_path: PathBuf,
    /// Text prompt, `.`-separated phrases
    pub caption: String,
    pub box_threshold: f32,
    pub text_threshold: f32,
    /// TTF/OTF font overriding the bundled label font
    pub font_path: Option<PathBuf>,
    /// Source image download timeout
    pub fetch_timeout_secs: u64,
    /// Cap on downloaded and decoded image size
    pub max_image_bytes: usize,
}

impl DetectorConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup
    ///
    /// Unparseable numeric values fall back to their defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        Self {
            model_path: lookup("GDINO_MODEL_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.model_path),
            tokenizer_path: lookup("GDINO_TOKENIZER_PATH")
                .map(PathBuf::from)
                .unwrap_or(defaults.tokenizer_path),
            caption: lookup("DETECTION_CAPTION")
                .filter(|v| !v.trim().is_empty())
                .unwrap_or(defaults.caption),
            box_threshold: lookup("BOX_THRESHOLD")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.box_threshold),
            text_threshold: lookup("TEXT_THRESHOLD")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.text_threshold),
            font_path: lookup("LABEL_FONT_PATH")
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from),
            fetch_timeout_secs: lookup("IMAGE_FETCH_TIMEOUT_SECS")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.fetch_timeout_secs),
            max_image_bytes: lookup("MAX_IMAGE_BYTES")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.max_image_bytes),
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.caption.trim().is_empty() {
            return Err("Detection caption must not be empty".to_string());
        }
        if !(0.0..=1.0).contains(&self.box_threshold) {
            return Err(format!(
                "Box threshold must be within [0, 1], got {}",
                self.box_threshold
            ));
        }
        if !(0.0..=1.0).contains(&self.text_threshold) {
            return Err(format!(
                "Text threshold must be within [0, 1], got {}",
                self.text_threshold
            ));
        }
        if self.fetch_timeout_secs == 0 {
            return Err("Image fetch timeout must be greater than 0".to_string());
        }
        if self.max_image_bytes == 0 {
            return Err("Maximum image size must be greater than 0".to_string());
        }
        Ok(())
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from(DEFAULT_MODEL_PATH),
            tokenizer_path: PathBuf::from(DEFAULT_TOKENIZER_PATH),
            caption: DEFAULT_CAPTION.to_string(),
            box_threshold: DEFAULT_BOX_THRESHOLD,
            text_threshold: DEFAULT_TEXT_THRESHOLD,
            font_path: None,
            fetch_timeout_secs: DEFAULT_FETCH_TIMEOUT_SECS,
            max_image_bytes: MAX_IMAGE_SIZE,
        }
    }
}
