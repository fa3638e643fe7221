// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Grounding DINO open-vocabulary detection
//!
//! Components:
//! - `preprocessing` - Resize and normalize images for the vision backbone
//! - `text` - Caption normalization and sub-sentence attention masks
//! - `postprocessing` - Threshold filtering, phrase selection, box conversion
//! - `model` - ONNX Runtime session wrapping the exported graph

pub mod model;
pub mod postprocessing;
pub mod preprocessing;
pub mod text;

pub use model::{GroundingDinoModel, MODEL_NAME};
pub use postprocessing::RawPrediction;
pub use text::{preprocess_caption, TextInputs};
