// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Image preprocessing for Grounding DINO

use image::imageops::FilterType;
use image::RgbImage;
use ndarray::Array4;

/// Target length of the shorter image side
pub const SHORT_SIDE: u32 = 800;

/// Upper bound on the longer image side after resizing
pub const MAX_SIDE: u32 = 1333;

/// Mean values for normalization (ImageNet)
pub const MEAN: [f32; 3] = [0.485, 0.456, 0.406];

/// Std values for normalization (ImageNet)
pub const STD: [f32; 3] = [0.229, 0.224, 0.225];

/// Compute the model input size `(width, height)` for a source image
///
/// The shorter side becomes `SHORT_SIDE` unless that would push the
/// longer side past `MAX_SIDE`, in which case the shorter side shrinks so
/// the longer one lands on `MAX_SIDE`. The derived side is truncated.
pub fn target_size(width: u32, height: u32) -> (u32, u32) {
    if width == 0 || height == 0 {
        return (width.max(1), height.max(1));
    }

    let (w, h) = (width as f64, height as f64);
    let min_side = w.min(h);
    let max_side = w.max(h);

    let mut size = SHORT_SIDE as f64;
    if max_side / min_side * size > MAX_SIDE as f64 {
        size = (MAX_SIDE as f64 * min_side / max_side).round_ties_even();
    }
    let size = size as u32;

    if (width <= height && width == size) || (height <= width && height == size) {
        return (width, height);
    }

    if width < height {
        (size, ((size as f64 * h / w) as u32).max(1))
    } else {
        (((size as f64 * w / h) as u32).max(1), size)
    }
}

/// Resize and normalize an image into an NCHW tensor `[1, 3, H, W]`
///
/// Steps:
/// 1. Bilinear resize to `target_size`
/// 2. Scale to [0, 1]
/// 3. Normalize with ImageNet mean/std
pub fn preprocess_image(image: &RgbImage) -> Array4<f32> {
    let (target_w, target_h) = target_size(image.width(), image.height());

    let resized = if (target_w, target_h) == image.dimensions() {
        image.clone()
    } else {
        image::imageops::resize(image, target_w, target_h, FilterType::Triangle)
    };

    let (w, h) = (target_w as usize, target_h as usize);
    let mut tensor = Array4::zeros((1, 3, h, w));

    for (x, y, pixel) in resized.enumerate_pixels() {
        for c in 0..3 {
            tensor[[0, c, y as usize, x as usize]] =
                (pixel[c] as f32 / 255.0 - MEAN[c]) / STD[c];
        }
    }

    tensor
}
