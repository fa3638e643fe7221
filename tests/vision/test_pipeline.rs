// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
// End-to-end pipeline runs with a stub detector

use image::{ImageFormat, Rgb, RgbImage};
use lucent::vision::{
    BoundingBox, Detection, DetectionPipeline, DetectionThresholds, ImageError, PipelineError,
};
use std::io::Cursor;
use std::sync::Arc;

use crate::common::{wound_detection, StubDetector, CAPTION};

fn pipeline(detector: Arc<StubDetector>, max_bytes: usize) -> DetectionPipeline {
    DetectionPipeline::new(detector, CAPTION, DetectionThresholds::default(), max_bytes)
}

fn jpeg(width: u32, height: u32) -> Vec<u8> {
    let image = RgbImage::from_pixel(width, height, Rgb([120, 90, 80]));
    let mut out = Cursor::new(Vec::new());
    image.write_to(&mut out, ImageFormat::Jpeg).unwrap();
    out.into_inner()
}

#[test]
fn test_jpeg_input_returns_png_output() {
    let detector = Arc::new(StubDetector::with_detections(vec![wound_detection()]));
    let output = pipeline(detector.clone(), 1024 * 1024)
        .run(&jpeg(80, 70))
        .unwrap();

    assert_eq!(&output.png[..8], b"\x89PNG\r\n\x1a\n");
    assert_eq!((output.width, output.height), (80, 70));
    assert_eq!(output.detections, vec![wound_detection()]);
    assert_eq!(detector.call_count(), 1);
}

#[test]
fn test_multiple_detections_use_distinct_colours() {
    let detections = vec![
        Detection {
            bbox: BoundingBox {
                x1: 4.0,
                y1: 40.0,
                x2: 30.0,
                y2: 70.0,
            },
            confidence: 0.4,
            phrase: "ulcer".to_string(),
        },
        Detection {
            bbox: BoundingBox {
                x1: 50.0,
                y1: 40.0,
                x2: 76.0,
                y2: 70.0,
            },
            confidence: 0.35,
            phrase: "callus".to_string(),
        },
    ];
    let detector = Arc::new(StubDetector::with_detections(detections));
    let output = pipeline(detector, 1024 * 1024).run(&jpeg(80, 80)).unwrap();

    let annotated = image::load_from_memory(&output.png).unwrap().to_rgb8();
    assert_ne!(annotated.get_pixel(4, 55), annotated.get_pixel(50, 55));
}

#[test]
fn test_oversized_input_is_decode_error() {
    let detector = Arc::new(StubDetector::default());
    let err = pipeline(detector.clone(), 32).run(&jpeg(80, 70)).unwrap_err();

    assert!(matches!(err, PipelineError::Decode(ImageError::TooLarge(..))));
    assert_eq!(detector.call_count(), 0);
}

#[test]
fn test_truncated_image_is_decode_error() {
    let noisy = RgbImage::from_fn(96, 96, |x, y| {
        Rgb([(x * 37 % 251) as u8, (y * 53 % 241) as u8, ((x ^ y) * 29 % 239) as u8])
    });
    let bytes = lucent::vision::encode_png(&noisy).unwrap();

    let detector = Arc::new(StubDetector::default());
    let err = pipeline(detector.clone(), 1024 * 1024)
        .run(&bytes[..bytes.len() / 3])
        .unwrap_err();

    assert!(matches!(err, PipelineError::Decode(_)));
    assert_eq!(detector.call_count(), 0);
}
