// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::{anyhow, Context, Result};
use clap::Args;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

use crate::config::DetectorConfig;
use crate::vision::{DetectionPipeline, GroundingDinoModel, ImageFetcher};

/// Arguments for the detect command
#[derive(Args, Debug)]
pub struct DetectArgs {
    /// Image URL to download
    #[arg(long, conflicts_with = "file", required_unless_present = "file")]
    pub image_url: Option<String>,

    /// Local image file
    #[arg(long, conflicts_with = "image_url")]
    pub file: Option<PathBuf>,

    /// Where to write the annotated PNG
    #[arg(long, short)]
    pub output: PathBuf,

    /// Caption override (defaults to DETECTION_CAPTION or the built-in prompt)
    #[arg(long)]
    pub caption: Option<String>,

    #[arg(long)]
    pub box_threshold: Option<f32>,

    #[arg(long)]
    pub text_threshold: Option<f32>,

    /// Grounding DINO ONNX graph
    #[arg(long, env = "GDINO_MODEL_PATH")]
    pub model_path: Option<PathBuf>,

    /// bert-base-uncased tokenizer.json
    #[arg(long, env = "GDINO_TOKENIZER_PATH")]
    pub tokenizer_path: Option<PathBuf>,

    /// Print detections as JSON to stdout
    #[arg(long)]
    pub json: bool,
}

impl DetectArgs {
    /// Overlay command-line values on an environment-derived config
    pub fn apply_to(&self, mut config: DetectorConfig) -> DetectorConfig {
        if let Some(caption) = &self.caption {
            config.caption = caption.clone();
        }
        if let Some(threshold) = self.box_threshold {
            config.box_threshold = threshold;
        }
        if let Some(threshold) = self.text_threshold {
            config.text_threshold = threshold;
        }
        if let Some(path) = &self.model_path {
            config.model_path = path.clone();
        }
        if let Some(path) = &self.tokenizer_path {
            config.tokenizer_path = path.clone();
        }
        config
    }
}

pub async fn run_detect(args: DetectArgs) -> Result<()> {
    let config = args.apply_to(DetectorConfig::from_env());
    config.validate().map_err(|e| anyhow!(e))?;

    let bytes = match (&args.image_url, &args.file) {
        (Some(url), _) => {
            let fetcher = ImageFetcher::new(config.fetch_timeout(), config.max_image_bytes)?;
            info!("Downloading {}", url);
            fetcher
                .fetch(url)
                .await
                .with_context(|| format!("Failed to load image from {}", url))?
                .to_vec()
        }
        (None, Some(path)) => tokio::fs::read(path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?,
        (None, None) => anyhow::bail!("Either --image-url or --file is required"),
    };

    let model = GroundingDinoModel::new(&config.model_path, &config.tokenizer_path).await?;
    let pipeline = DetectionPipeline::from_config(Arc::new(model), &config);

    let output = tokio::task::spawn_blocking(move || pipeline.run(&bytes))
        .await
        .context("Detection task failed")??;

    tokio::fs::write(&args.output, &output.png)
        .await
        .with_context(|| format!("Failed to write {}", args.output.display()))?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&output.detections)?);
    } else {
        println!(
            "✅ {} detections in {}ms → {}",
            output.detections.len(),
            output.processing_time_ms,
            args.output.display()
        );
        for detection in &output.detections {
            println!(
                "   {:<20} {:.2}  [{:.0}, {:.0}, {:.0}, {:.0}]",
                detection.phrase,
                detection.confidence,
                detection.bbox.x1,
                detection.bbox.y1,
                detection.bbox.x2,
                detection.bbox.y2
            );
        }
    }

    Ok(())
}
