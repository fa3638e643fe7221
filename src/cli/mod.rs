// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
pub mod detect;

use anyhow::Result;
use clap::{Parser, Subcommand};

/// Lucent CLI
#[derive(Parser, Debug)]
#[command(name = "lucent-cli")]
#[command(version)]
#[command(about = "Run open-vocabulary detection on an image and save the annotated result", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Detect objects in an image from a URL or local file
    Detect(detect::DetectArgs),
}

/// Execute CLI command
pub async fn execute(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Detect(args) => detect::run_detect(args).await,
    }
}
