// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Detection overlay rendering

use ab_glyph::{FontVec, PxScale};
use anyhow::{anyhow, Context, Result};
use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_filled_rect_mut, draw_hollow_rect_mut, draw_text_mut, text_size};
use imageproc::rect::Rect;
use std::path::Path;
use tracing::debug;

use super::detector::Detection;

/// Box colours, cycled by detection index
pub const PALETTE: [Rgb<u8>; 10] = [
    Rgb([163, 81, 251]),
    Rgb([255, 64, 64]),
    Rgb([255, 161, 160]),
    Rgb([255, 118, 51]),
    Rgb([255, 182, 51]),
    Rgb([209, 212, 53]),
    Rgb([76, 251, 18]),
    Rgb([64, 222, 138]),
    Rgb([0, 214, 193]),
    Rgb([0, 196, 255]),
];

/// Box outline thickness in pixels
pub const BOX_THICKNESS: u32 = 2;

/// Label text height in pixels
pub const TEXT_SCALE: f32 = 16.0;

/// Padding around label text
pub const TEXT_PADDING: u32 = 5;

const TEXT_COLOR: Rgb<u8> = Rgb([0, 0, 0]);

/// Approximate glyph cell used to size the label bar when no font is loaded
const FALLBACK_GLYPH_SIZE: (u32, u32) = (8, 12);

/// DejaVu Sans, bundled so labels render without any font on the host
pub const DEFAULT_FONT: &[u8] = include_bytes!("../../assets/fonts/DejaVuSans.ttf");

/// Parse the bundled label font
pub fn default_font() -> Result<FontVec> {
    FontVec::try_from_vec(DEFAULT_FONT.to_vec())
        .map_err(|e| anyhow!("Invalid bundled font: {}", e))
}

/// Load a TrueType/OpenType font for label text
pub fn load_font<P: AsRef<Path>>(path: P) -> Result<FontVec> {
    let path = path.as_ref();
    let bytes = std::fs::read(path)
        .with_context(|| format!("Failed to read font file {}", path.display()))?;
    FontVec::try_from_vec(bytes).map_err(|e| anyhow!("Invalid font {}: {}", path.display(), e))
}

pub fn color_for(index: usize) -> Rgb<u8> {
    PALETTE[index % PALETTE.len()]
}

/// Draw detections onto a copy of `image`
///
/// Each detection gets an outlined box and a filled label bar with
/// `"{phrase} {score}"`. The bar sits above the box, or just inside it
/// when the box touches the top edge. Without a font only the bar is
/// drawn.
pub fn annotate(image: &RgbImage, detections: &[Detection], font: Option<&FontVec>) -> RgbImage {
    let mut canvas = image.clone();

    for (index, detection) in detections.iter().enumerate() {
        if !detection.bbox.is_valid() {
            debug!("Skipping degenerate box for '{}'", detection.phrase);
            continue;
        }

        let color = color_for(index);
        let x1 = detection.bbox.x1.round() as i32;
        let y1 = detection.bbox.y1.round() as i32;
        let width = (detection.bbox.width().round() as u32).max(1);
        let height = (detection.bbox.height().round() as u32).max(1);

        for t in 0..BOX_THICKNESS {
            if width <= 2 * t || height <= 2 * t {
                break;
            }
            let rect = Rect::at(x1 + t as i32, y1 + t as i32).of_size(width - 2 * t, height - 2 * t);
            draw_hollow_rect_mut(&mut canvas, rect, color);
        }

        draw_label(&mut canvas, &detection.label(), x1, y1, color, font);
    }

    canvas
}

fn draw_label(
    canvas: &mut RgbImage,
    label: &str,
    x: i32,
    box_top: i32,
    color: Rgb<u8>,
    font: Option<&FontVec>,
) {
    let scale = PxScale::from(TEXT_SCALE);
    let (text_w, text_h) = match font {
        Some(font) => text_size(scale, font, label),
        None => (
            FALLBACK_GLYPH_SIZE.0 * label.chars().count() as u32,
            FALLBACK_GLYPH_SIZE.1,
        ),
    };

    let bar_w = (text_w + 2 * TEXT_PADDING).max(1);
    let bar_h = (text_h + 2 * TEXT_PADDING).max(1);

    let bar_y = if box_top >= bar_h as i32 {
        box_top - bar_h as i32
    } else {
        box_top
    };

    draw_filled_rect_mut(canvas, Rect::at(x, bar_y).of_size(bar_w, bar_h), color);

    if let Some(font) = font {
        draw_text_mut(
            canvas,
            TEXT_COLOR,
            x + TEXT_PADDING as i32,
            bar_y + TEXT_PADDING as i32,
            scale,
            font,
            label,
        );
    }
}
