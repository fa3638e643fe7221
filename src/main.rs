// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::{anyhow, Context, Result};
use lucent::{
    api::{start_server, AppState},
    config::{DetectorConfig, ServerConfig},
    vision::{GroundingDinoModel, ObjectDetector},
};
use std::{env, sync::Arc};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "info");
    }
    tracing_subscriber::fmt::init();

    info!("🚀 Starting Lucent {}", lucent::version::VERSION);

    let server_config = ServerConfig::from_env();
    server_config
        .validate()
        .map_err(|e| anyhow!("Invalid server configuration: {}", e))?;

    let detector_config = DetectorConfig::from_env();
    detector_config
        .validate()
        .map_err(|e| anyhow!("Invalid detector configuration: {}", e))?;

    info!("🧠 Loading detection model...");
    let model = GroundingDinoModel::new(&detector_config.model_path, &detector_config.tokenizer_path)
        .await
        .context("Failed to load Grounding DINO model")?;
    let detector: Arc<dyn ObjectDetector> = Arc::new(model);

    info!(
        "✅ Model {} ready - caption: \"{}\", box threshold: {}, text threshold: {}",
        detector.name(),
        detector_config.caption,
        detector_config.box_threshold,
        detector_config.text_threshold
    );

    let state = AppState::from_config(detector, &detector_config)?;
    start_server(&server_config, state).await
}
