// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Decode → detect → annotate → encode

use ab_glyph::FontVec;
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;
use tracing::{debug, info, warn};

use super::annotate::{annotate, default_font, load_font};
use super::detector::{Detection, DetectionThresholds, ObjectDetector};
use super::image_utils::{decode_image_bytes, encode_png, ImageError};
use crate::config::DetectorConfig;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Failed to load image: {0}")]
    Decode(ImageError),

    #[error("Detection failed: {0}")]
    Inference(String),

    #[error("Failed to encode image: {0}")]
    Encode(ImageError),
}

/// Result of one pipeline run
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    /// Annotated image as PNG
    pub png: Vec<u8>,
    pub detections: Vec<Detection>,
    pub width: u32,
    pub height: u32,
    pub processing_time_ms: u64,
}

/// Fixed-caption detection pipeline around a shared detector
pub struct DetectionPipeline {
    detector: Arc<dyn ObjectDetector>,
    caption: String,
    thresholds: DetectionThresholds,
    font: Option<Arc<FontVec>>,
    max_image_bytes: usize,
}

impl std::fmt::Debug for DetectionPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DetectionPipeline")
            .field("detector", &self.detector.name())
            .field("caption", &self.caption)
            .field("thresholds", &self.thresholds)
            .field("has_font", &self.font.is_some())
            .field("max_image_bytes", &self.max_image_bytes)
            .finish()
    }
}

impl DetectionPipeline {
    pub fn new(
        detector: Arc<dyn ObjectDetector>,
        caption: impl Into<String>,
        thresholds: DetectionThresholds,
        max_image_bytes: usize,
    ) -> Self {
        let font = match default_font() {
            Ok(font) => Some(Arc::new(font)),
            Err(e) => {
                warn!("⚠️ Bundled label font unavailable, drawing boxes only: {:#}", e);
                None
            }
        };

        Self {
            detector,
            caption: caption.into(),
            thresholds,
            font,
            max_image_bytes,
        }
    }

    /// Build a pipeline from configuration
    ///
    /// Labels use the bundled font unless `font_path` names another one.
    /// A configured font that fails to load is logged and the bundled font
    /// is kept.
    pub fn from_config(detector: Arc<dyn ObjectDetector>, config: &DetectorConfig) -> Self {
        let pipeline = Self::new(
            detector,
            config.caption.clone(),
            DetectionThresholds::new(config.box_threshold, config.text_threshold),
            config.max_image_bytes,
        );

        match config.font_path.as_ref() {
            Some(path) => match load_font(path) {
                Ok(font) => {
                    info!("Loaded label font from {}", path.display());
                    pipeline.with_font(font)
                }
                Err(e) => {
                    warn!("⚠️ Label font unavailable, using bundled font: {:#}", e);
                    pipeline
                }
            },
            None => pipeline,
        }
    }

    pub fn with_font(mut self, font: FontVec) -> Self {
        self.font = Some(Arc::new(font));
        self
    }

    pub fn caption(&self) -> &str {
        &self.caption
    }

    pub fn thresholds(&self) -> DetectionThresholds {
        self.thresholds
    }

    pub fn detector_name(&self) -> &str {
        self.detector.name()
    }

    pub fn detector_device(&self) -> &str {
        self.detector.device()
    }

    pub fn max_image_bytes(&self) -> usize {
        self.max_image_bytes
    }

    /// Run the full pipeline over raw image bytes
    ///
    /// Blocking: decoding, inference and encoding are CPU bound. Async
    /// callers should use `spawn_blocking`.
    pub fn run(&self, bytes: &[u8]) -> Result<PipelineOutput, PipelineError> {
        let start = Instant::now();

        let (image, info) =
            decode_image_bytes(bytes, self.max_image_bytes).map_err(PipelineError::Decode)?;
        debug!(
            "Decoded {:?} image: {}x{}, {} bytes",
            info.format, info.width, info.height, info.size_bytes
        );

        let detections = self
            .detector
            .predict(&image, &self.caption, self.thresholds)
            .map_err(|e| PipelineError::Inference(format!("{:#}", e)))?;

        let annotated = annotate(&image, &detections, self.font.as_deref());
        let png = encode_png(&annotated).map_err(PipelineError::Encode)?;

        Ok(PipelineOutput {
            png,
            detections,
            width: info.width,
            height: info.height,
            processing_time_ms: start.elapsed().as_millis() as u64,
        })
    }
}
