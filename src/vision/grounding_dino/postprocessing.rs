// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Grounding DINO output decoding
//!
//! The model emits, per object query, one logit per caption token and a
//! normalized `(cx, cy, w, h)` box. A query survives when its best token
//! probability clears the box threshold; its phrase is assembled from the
//! tokens that clear the text threshold.

use ndarray::ArrayView2;

use super::text::MAX_TEXT_LEN;
use crate::vision::detector::{BoundingBox, DetectionThresholds};

/// A query that passed the box threshold, before phrase decoding
#[derive(Debug, Clone, PartialEq)]
pub struct RawPrediction {
    /// Object query index
    pub query: usize,
    /// Maximum token probability
    pub score: f32,
    /// Caption token ids above the text threshold
    pub phrase_token_ids: Vec<u32>,
    /// Normalized `(cx, cy, w, h)`
    pub cxcywh: [f32; 4],
}

pub fn sigmoid(x: f32) -> f32 {
    1.0 / (1.0 + (-x).exp())
}

/// Select token ids whose probability exceeds `text_threshold`
///
/// The first position (`[CLS]`) and everything from position 255 onward
/// never contribute to a phrase.
pub fn phrase_token_ids(probs: &[f32], ids: &[u32], text_threshold: f32) -> Vec<u32> {
    probs
        .iter()
        .enumerate()
        .take(ids.len().min(MAX_TEXT_LEN - 1))
        .skip(1)
        .filter(|(_, p)| **p > text_threshold)
        .map(|(i, _)| ids[i])
        .collect()
}

/// Filter raw model output down to confident queries
///
/// - `logits`: `[num_queries, 256]` raw (pre-sigmoid) token logits
/// - `boxes`: `[num_queries, 4]` normalized cxcywh boxes
/// - `ids`: caption token ids as fed to the model
pub fn filter_predictions(
    logits: ArrayView2<f32>,
    boxes: ArrayView2<f32>,
    ids: &[u32],
    thresholds: DetectionThresholds,
) -> Vec<RawPrediction> {
    let mut predictions = Vec::new();

    for (query, (row, bbox)) in logits.outer_iter().zip(boxes.outer_iter()).enumerate() {
        let probs: Vec<f32> = row.iter().map(|&v| sigmoid(v)).collect();
        let score = probs.iter().copied().fold(f32::MIN, f32::max);

        if score <= thresholds.box_threshold || bbox.len() < 4 {
            continue;
        }

        predictions.push(RawPrediction {
            query,
            score,
            phrase_token_ids: phrase_token_ids(&probs, ids, thresholds.text_threshold),
            cxcywh: [bbox[0], bbox[1], bbox[2], bbox[3]],
        });
    }

    predictions
}

/// Convert a normalized cxcywh box to pixel xyxy, clamped to the image
pub fn cxcywh_to_xyxy(cxcywh: [f32; 4], width: u32, height: u32) -> BoundingBox {
    let (w, h) = (width as f32, height as f32);
    let [cx, cy, bw, bh] = cxcywh;

    BoundingBox {
        x1: ((cx - bw / 2.0) * w).clamp(0.0, w),
        y1: ((cy - bh / 2.0) * h).clamp(0.0, h),
        x2: ((cx + bw / 2.0) * w).clamp(0.0, w),
        y2: ((cy + bh / 2.0) * h).clamp(0.0, h),
    }
}

/// Drop delimiter dots from a decoded phrase
///
/// Whitespace is kept as decoded, so `"wound ."` becomes `"wound "`.
pub fn clean_phrase(decoded: &str) -> String {
    decoded.replace('.', "")
}
