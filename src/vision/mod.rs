// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Vision processing for the detection function
//!
//! This module provides:
//! - Image download and decoding
//! - Open-vocabulary detection via Grounding DINO (ONNX, CUDA or CPU)
//! - Overlay rendering of detections
//!
//! `DetectionPipeline` ties these together for a single fixed caption.

pub mod annotate;
pub mod detector;
pub mod fetch;
pub mod grounding_dino;
pub mod image_utils;
pub mod pipeline;

pub use detector::{BoundingBox, Detection, DetectionThresholds, ObjectDetector};
pub use fetch::{FetchError, ImageFetcher};
pub use grounding_dino::GroundingDinoModel;
pub use image_utils::{decode_image_bytes, detect_format, encode_png, ImageError, ImageInfo};
pub use pipeline::{DetectionPipeline, PipelineError, PipelineOutput};
