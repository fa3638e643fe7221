// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Environment-driven configuration

pub mod detector;
pub mod server;

pub use detector::{DetectorConfig, DEFAULT_CAPTION};
pub use server::{ServerConfig, DEFAULT_FUNCTION_ROUTE};
