// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Classifier adapter
//!
//! The pipeline only depends on the [`Classifier`] trait: one normalized
//! tensor in, one score per class out. [`OnnxClassifier`] is the production
//! implementation, running the exported Keras model through ONNX Runtime.

use anyhow::{Context, Result};
use ort::execution_providers::{CPUExecutionProvider, CUDAExecutionProvider};
use ort::session::builder::GraphOptimizationLevel;
use ort::session::Session;
use ort::value::Value;
use std::path::Path;
use std::sync::Mutex;
use tracing::{info, warn};

use super::labels::ClassLabel;
use super::preprocessing::NormalizedTensor;

/// Ordered per-class scores, aligned with [`ClassLabel::ALL`]
pub type ScoreVector = Vec<f32>;

/// A loaded model that scores one image at a time.
///
/// Calls are synchronous and may take a while; async callers must run them
/// on a blocking thread. Implementations are shared read-only across
/// requests.
pub trait Classifier: Send + Sync {
    fn classify(&self, input: &NormalizedTensor) -> Result<ScoreVector>;
}

/// Numerically stable softmax
pub fn softmax(scores: &[f32]) -> ScoreVector {
    let max = scores.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    let exps: Vec<f32> = scores.iter().map(|s| (s - max).exp()).collect();
    let sum: f32 = exps.iter().sum();
    exps.into_iter().map(|e| e / sum).collect()
}

/// ONNX Runtime backed classifier
///
/// Feeds the tensor to the model's first input and reads the first output,
/// so it works regardless of the names the exporter picked.
pub struct OnnxClassifier {
    /// ort needs `&mut Session` to run, so runs are serialized here
    session: Mutex<Session>,
    input_name: String,
    apply_softmax: bool,
}

impl std::fmt::Debug for OnnxClassifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OnnxClassifier")
            .field("input_name", &self.input_name)
            .field("apply_softmax", &self.apply_softmax)
            .finish_non_exhaustive()
    }
}

impl OnnxClassifier {
    /// Load an ONNX model from disk.
    ///
    /// Tries the CUDA execution provider first and falls back to CPU. Runs one
    /// all-black inference to check the model emits one score per class.
    pub fn load<P: AsRef<Path>>(
        model_path: P,
        intra_threads: usize,
        apply_softmax: bool,
    ) -> Result<Self> {
        let model_path = model_path.as_ref();
        if !model_path.exists() {
            anyhow::bail!("Model file not found: {}", model_path.display());
        }

        let cuda_result = Session::builder()
            .context("Failed to create session builder")?
            .with_execution_providers([CUDAExecutionProvider::default().build()])
            .context("Failed to set CUDA execution provider")?
            .with_optimization_level(GraphOptimizationLevel::Level3)
            .context("Failed to set optimization level")?
            .with_intra_threads(intra_threads)
            .context("Failed to set intra threads")?
            .commit_from_file(model_path);

        let session = match cuda_result {
            Ok(s) => {
                info!("CUDA execution provider initialized");
                s
            }
            Err(e) => {
                warn!("CUDA execution provider failed: {}", e);
                warn!("Falling back to CPU execution provider");
                Session::builder()
                    .context("Failed to create session builder")?
                    .with_execution_providers([CPUExecutionProvider::default().build()])
                    .context("Failed to set CPU execution provider")?
                    .with_optimization_level(GraphOptimizationLevel::Level3)
                    .context("Failed to set optimization level")?
                    .with_intra_threads(intra_threads)
                    .context("Failed to set intra threads")?
                    .commit_from_file(model_path)
                    .with_context(|| {
                        format!("Failed to load ONNX model from {}", model_path.display())
                    })?
            }
        };

        let input_name = session
            .inputs
            .first()
            .map(|input| input.name.clone())
            .context("Model declares no inputs")?;

        let classifier = Self {
            session: Mutex::new(session),
            input_name,
            apply_softmax,
        };

        let probe = classifier
            .classify(&NormalizedTensor::zeros())
            .context("Model validation inference failed")?;
        if probe.len() != ClassLabel::COUNT {
            anyhow::bail!(
                "Model outputs {} scores (expected {})",
                probe.len(),
                ClassLabel::COUNT
            );
        }

        info!(
            "ONNX classifier loaded from {} (input '{}')",
            model_path.display(),
            classifier.input_name
        );
        Ok(classifier)
    }
}

impl Classifier for OnnxClassifier {
    fn classify(&self, input: &NormalizedTensor) -> Result<ScoreVector> {
        let value = Value::from_array(input.clone().into_array())
            .context("Failed to create input tensor")?;

        let mut session = self
            .session
            .lock()
            .map_err(|_| anyhow::anyhow!("Classifier session lock poisoned"))?;
        let outputs = session.run(ort::inputs![self.input_name.as_str() => value])?;

        // Keras exports emit [batch, classes]; take the single batch row
        let output = outputs[0]
            .try_extract_array::<f32>()
            .context("Failed to extract output tensor")?;
        let scores: ScoreVector = output.iter().copied().collect();

        Ok(if self.apply_softmax {
            softmax(&scores)
        } else {
            scores
        })
    }
}
