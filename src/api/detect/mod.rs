// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Detection function endpoint
//!
//! Serves the HTTP trigger that annotates a remote image.

pub mod handler;
pub mod request;

pub use handler::detect_handler;
pub use request::DetectQuery;
