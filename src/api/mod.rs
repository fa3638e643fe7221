// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod detect;
pub mod errors;
pub mod handlers;
pub mod server;

pub use errors::ApiError;
pub use handlers::HealthResponse;
pub use server::{create_router, start_server, AppState};
