// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Grounding DINO ONNX model wrapper

use anyhow::{anyhow, Context, Result};
use image::RgbImage;
use ndarray::{Axis, Ix2};
use ort::execution_providers::{CPUExecutionProvider, CUDAExecutionProvider};
use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;
use ort::value::Value;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Instant;
use tokenizers::Tokenizer;
use tracing::{debug, info, warn};

use super::postprocessing::{clean_phrase, cxcywh_to_xyxy, filter_predictions, RawPrediction};
use super::preprocessing::preprocess_image;
use super::text::{preprocess_caption, TextInputs, SPECIAL_TOKENS};
use crate::vision::detector::{Detection, DetectionThresholds, ObjectDetector};

/// Model name reported by the service
pub const MODEL_NAME: &str = "groundingdino-swint-ogc";

/// Execution provider names reported by `ObjectDetector::device`
pub const DEVICE_CUDA: &str = "cuda";
pub const DEVICE_CPU: &str = "cpu";

/// Graph input names of the exported model
pub const INPUT_IMAGE: &str = "img";
pub const INPUT_IDS: &str = "input_ids";
pub const INPUT_ATTENTION_MASK: &str = "attention_mask";
pub const INPUT_POSITION_IDS: &str = "position_ids";
pub const INPUT_TOKEN_TYPE_IDS: &str = "token_type_ids";
pub const INPUT_TEXT_TOKEN_MASK: &str = "text_token_mask";

/// Graph output names of the exported model
pub const OUTPUT_LOGITS: &str = "logits";
pub const OUTPUT_BOXES: &str = "boxes";

/// Grounding DINO open-vocabulary detector
///
/// Runs through ONNX Runtime on CUDA when available, otherwise on CPU.
/// The session is loaded once and shared; concurrent `predict` calls are
/// serialized on the session lock.
#[derive(Clone)]
pub struct GroundingDinoModel {
    /// ONNX Runtime session (thread-safe)
    session: Arc<Mutex<Session>>,
    /// BERT tokenizer for the caption
    tokenizer: Arc<Tokenizer>,
    /// Vocabulary ids of the sub-sentence delimiters
    special_ids: Vec<u32>,
    model_path: PathBuf,
    /// Execution provider the session was committed with
    device: &'static str,
}

impl std::fmt::Debug for GroundingDinoModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GroundingDinoModel")
            .field("model_path", &self.model_path)
            .field("special_ids", &self.special_ids)
            .field("device", &self.device)
            .finish_non_exhaustive()
    }
}

impl GroundingDinoModel {
    /// Load the ONNX graph and its tokenizer
    ///
    /// # Arguments
    /// - `model_path`: exported Grounding DINO graph (`.onnx`)
    /// - `tokenizer_path`: `tokenizer.json` for bert-base-uncased
    ///
    /// # Errors
    /// Returns error if either file is missing, the tokenizer lacks the
    /// delimiter tokens, or ONNX Runtime rejects the graph.
    pub async fn new<P: AsRef<Path>>(model_path: P, tokenizer_path: P) -> Result<Self> {
        let model_path = model_path.as_ref();
        let tokenizer_path = tokenizer_path.as_ref();

        if !model_path.exists() {
            anyhow::bail!("Grounding DINO model not found: {}", model_path.display());
        }
        if !tokenizer_path.exists() {
            anyhow::bail!("Tokenizer file not found: {}", tokenizer_path.display());
        }

        info!("Loading Grounding DINO model from {}", model_path.display());

        info!("   Attempting CUDA execution provider...");
        // Registration fails when CUDA is missing, so the whole chain falls back
        let cuda_result = (|| -> Result<Session> {
            Ok(Session::builder()?
                .with_execution_providers([CUDAExecutionProvider::default()
                    .build()
                    .error_on_failure()])?
                .with_optimization_level(GraphOptimizationLevel::Level3)?
                .with_intra_threads(4)?
                .commit_from_file(model_path)?)
        })();

        let (session, device) = match cuda_result {
            Ok(session) => {
                info!("✅ CUDA execution provider initialized successfully!");
                (session, DEVICE_CUDA)
            }
            Err(e) => {
                warn!("⚠️  CUDA execution provider failed: {:#}", e);
                warn!("   Falling back to CPU execution provider");
                let session = Session::builder()
                    .context("Failed to create session builder")?
                    .with_execution_providers([CPUExecutionProvider::default().build()])
                    .context("Failed to set CPU execution provider")?
                    .with_optimization_level(GraphOptimizationLevel::Level3)
                    .context("Failed to set optimization level")?
                    .with_intra_threads(4)
                    .context("Failed to set intra threads")?
                    .commit_from_file(model_path)
                    .context(format!(
                        "Failed to load Grounding DINO model from {}",
                        model_path.display()
                    ))?;
                (session, DEVICE_CPU)
            }
        };

        for input in &session.inputs {
            debug!("Model input {}: {:?}", input.name, input.input_type);
        }

        let tokenizer = Tokenizer::from_file(tokenizer_path)
            .map_err(|e| anyhow!("Failed to load tokenizer: {}", e))?;

        let special_ids: Vec<u32> = SPECIAL_TOKENS
            .iter()
            .filter_map(|token| tokenizer.token_to_id(token))
            .collect();
        if special_ids.len() != SPECIAL_TOKENS.len() {
            anyhow::bail!(
                "Tokenizer at {} is missing delimiter tokens {:?}",
                tokenizer_path.display(),
                SPECIAL_TOKENS
            );
        }

        info!("✅ Grounding DINO model loaded successfully ({})", device);

        Ok(Self {
            session: Arc::new(Mutex::new(session)),
            tokenizer: Arc::new(tokenizer),
            special_ids,
            model_path: model_path.to_path_buf(),
            device,
        })
    }

    /// Tokenize a caption into ids and model-ready text inputs
    pub fn encode_caption(&self, caption: &str) -> Result<(Vec<u32>, TextInputs)> {
        let caption = preprocess_caption(caption);
        let encoding = self
            .tokenizer
            .encode(caption.as_str(), true)
            .map_err(|e| anyhow!("Failed to tokenize caption: {}", e))?;

        let inputs = TextInputs::from_ids(encoding.get_ids(), &self.special_ids);
        let ids = encoding.get_ids()[..inputs.len()].to_vec();
        Ok((ids, inputs))
    }

    fn decode_phrase(&self, prediction: &RawPrediction) -> Result<String> {
        let decoded = self
            .tokenizer
            .decode(&prediction.phrase_token_ids, false)
            .map_err(|e| anyhow!("Failed to decode phrase: {}", e))?;
        Ok(clean_phrase(&decoded))
    }

    fn run_session(
        &self,
        image: &RgbImage,
        ids: &[u32],
        text: TextInputs,
        thresholds: DetectionThresholds,
    ) -> Result<Vec<RawPrediction>> {
        let pixels = preprocess_image(image);
        debug!("Image tensor shape: {:?}", pixels.shape());

        let mut session = self
            .session
            .lock()
            .map_err(|_| anyhow!("Grounding DINO session lock poisoned"))?;

        let outputs = session
            .run(ort::inputs![
                INPUT_IMAGE => Value::from_array(pixels).context("Failed to create image tensor")?,
                INPUT_IDS => Value::from_array(text.input_ids).context("Failed to create input_ids tensor")?,
                INPUT_ATTENTION_MASK => Value::from_array(text.attention_mask).context("Failed to create attention_mask tensor")?,
                INPUT_POSITION_IDS => Value::from_array(text.position_ids).context("Failed to create position_ids tensor")?,
                INPUT_TOKEN_TYPE_IDS => Value::from_array(text.token_type_ids).context("Failed to create token_type_ids tensor")?,
                INPUT_TEXT_TOKEN_MASK => Value::from_array(text.text_token_mask).context("Failed to create text_token_mask tensor")?
            ])
            .context("Grounding DINO inference failed")?;

        let logits = outputs[OUTPUT_LOGITS]
            .try_extract_array::<f32>()
            .context("Failed to extract logits tensor")?;
        let boxes = outputs[OUTPUT_BOXES]
            .try_extract_array::<f32>()
            .context("Failed to extract boxes tensor")?;

        debug!(
            "Output shapes - logits: {:?}, boxes: {:?}",
            logits.shape(),
            boxes.shape()
        );

        if logits.ndim() != 3 || boxes.ndim() != 3 {
            anyhow::bail!(
                "Unexpected output shapes: logits {:?}, boxes {:?}",
                logits.shape(),
                boxes.shape()
            );
        }

        let logits = logits
            .index_axis(Axis(0), 0)
            .into_dimensionality::<Ix2>()
            .context("Failed to reshape logits")?;
        let boxes = boxes
            .index_axis(Axis(0), 0)
            .into_dimensionality::<Ix2>()
            .context("Failed to reshape boxes")?;

        Ok(filter_predictions(logits, boxes, ids, thresholds))
    }
}

impl ObjectDetector for GroundingDinoModel {
    fn name(&self) -> &str {
        MODEL_NAME
    }

    fn device(&self) -> &str {
        self.device
    }

    fn predict(
        &self,
        image: &RgbImage,
        caption: &str,
        thresholds: DetectionThresholds,
    ) -> Result<Vec<Detection>> {
        let start = Instant::now();
        let (ids, text) = self.encode_caption(caption)?;
        let raw = self.run_session(image, &ids, text, thresholds)?;

        let detections = raw
            .iter()
            .map(|prediction| {
                Ok(Detection {
                    bbox: cxcywh_to_xyxy(prediction.cxcywh, image.width(), image.height()),
                    confidence: prediction.score,
                    phrase: self.decode_phrase(prediction)?,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        info!(
            "Detected {} objects in {}ms",
            detections.len(),
            start.elapsed().as_millis()
        );
        Ok(detections)
    }
}
