// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
// Version information for Lucent

/// Full version string with feature description
pub const VERSION: &str = "v0.1.0-groundingdino-onnx";

/// Semantic version number
pub const VERSION_NUMBER: &str = env!("CARGO_PKG_VERSION");

/// Supported features in this version
pub const FEATURES: &[&str] = &[
    "open-vocabulary-detection",
    "groundingdino-onnx",
    "url-image-fetch",
    "png-annotation",
    "azure-functions-custom-handler",
];
