// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Detector abstraction shared by the HTTP handler and the CLI
//!
//! The concrete backend is Grounding DINO (see `grounding_dino`), but the
//! request path only depends on `ObjectDetector` so it can run against any
//! implementation, including test stubs.

use image::RgbImage;
use serde::Serialize;

/// Default minimum box confidence for a query to be kept
pub const DEFAULT_BOX_THRESHOLD: f32 = 0.30;

/// Default minimum token probability for a token to join a phrase
pub const DEFAULT_TEXT_THRESHOLD: f32 = 0.25;

/// Axis-aligned box in absolute pixel coordinates of the source image
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BoundingBox {
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
}

impl BoundingBox {
    pub fn width(&self) -> f32 {
        (self.x2 - self.x1).max(0.0)
    }

    pub fn height(&self) -> f32 {
        (self.y2 - self.y1).max(0.0)
    }

    pub fn area(&self) -> f32 {
        self.width() * self.height()
    }

    /// Boxes collapsed to a line or point carry nothing to draw
    pub fn is_valid(&self) -> bool {
        self.width() > 0.0 && self.height() > 0.0
    }
}

/// A single detection produced by the model
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Detection {
    /// Location in source image pixels
    pub bbox: BoundingBox,
    /// Maximum token probability for this query (0.0-1.0)
    pub confidence: f32,
    /// Caption phrase matched by this query
    pub phrase: String,
}

impl Detection {
    /// Overlay label text, e.g. `"wound 0.47"`
    pub fn label(&self) -> String {
        if self.phrase.is_empty() {
            format!("{:.2}", self.confidence)
        } else {
            format!("{} {:.2}", self.phrase, self.confidence)
        }
    }
}

/// Score cut-offs applied to raw model output
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DetectionThresholds {
    pub box_threshold: f32,
    pub text_threshold: f32,
}

impl Default for DetectionThresholds {
    fn default() -> Self {
        Self {
            box_threshold: DEFAULT_BOX_THRESHOLD,
            text_threshold: DEFAULT_TEXT_THRESHOLD,
        }
    }
}

impl DetectionThresholds {
    pub fn new(box_threshold: f32, text_threshold: f32) -> Self {
        Self {
            box_threshold: box_threshold.clamp(0.0, 1.0),
            text_threshold: text_threshold.clamp(0.0, 1.0),
        }
    }
}

/// Open-vocabulary detector: finds regions matching free-text phrases
///
/// Implementations must be shareable across request tasks; inference is
/// invoked from blocking worker threads.
pub trait ObjectDetector: Send + Sync {
    /// Short model identifier reported by `/health`
    fn name(&self) -> &str;

    /// Execution device the detector runs on
    fn device(&self) -> &str {
        "cpu"
    }

    /// Run detection over `image` for the phrases in `caption`
    fn predict(
        &self,
        image: &RgbImage,
        caption: &str,
        thresholds: DetectionThresholds,
    ) -> anyhow::Result<Vec<Detection>>;
}
