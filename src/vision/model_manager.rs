// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Classifier loading and the process-wide model slot

use anyhow::{Context, Result};
use std::path::PathBuf;
use std::sync::{Arc, OnceLock};
use thiserror::Error;
use tracing::info;

use super::classifier::{Classifier, OnnxClassifier};
use super::predictor::Predictor;

/// Configuration for loading the classifier
#[derive(Debug, Clone)]
pub struct ClassifierModelConfig {
    /// Path to the exported ONNX model
    pub model_path: PathBuf,
    /// ONNX Runtime intra-op threads
    pub intra_threads: usize,
    /// Apply softmax to the raw model output
    pub apply_softmax: bool,
}

impl Default for ClassifierModelConfig {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from("best_model.onnx"),
            intra_threads: 4,
            apply_softmax: false,
        }
    }
}

/// Check the model file exists and load it.
///
/// Logs the file size so deployments can spot a truncated upload.
pub fn load_classifier(config: &ClassifierModelConfig) -> Result<Arc<dyn Classifier>> {
    let metadata = std::fs::metadata(&config.model_path).with_context(|| {
        format!("Model file not found: {}", config.model_path.display())
    })?;
    let size_mb = metadata.len() as f64 / (1024.0 * 1024.0);
    info!(
        "Model found: {} ({:.1} MB)",
        config.model_path.display(),
        size_mb
    );

    let classifier = OnnxClassifier::load(
        &config.model_path,
        config.intra_threads,
        config.apply_softmax,
    )?;
    Ok(Arc::new(classifier))
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Classifier model is already loaded")]
pub struct AlreadyLoaded;

/// Holder for the one classifier the process serves.
///
/// Starts empty, is filled exactly once at startup and is read-only after
/// that. Readers before the fill see "not loaded". Clones share the slot.
#[derive(Debug, Clone, Default)]
pub struct ModelManager {
    slot: Arc<OnceLock<Predictor>>,
}

impl ModelManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Manager with a classifier already installed
    pub fn with_classifier(classifier: Arc<dyn Classifier>) -> Self {
        Self {
            slot: Arc::new(OnceLock::from(Predictor::new(classifier))),
        }
    }

    /// Fill the slot. Fails if it was filled before.
    pub fn install(&self, classifier: Arc<dyn Classifier>) -> Result<(), AlreadyLoaded> {
        self.slot
            .set(Predictor::new(classifier))
            .map_err(|_| AlreadyLoaded)
    }

    pub fn is_loaded(&self) -> bool {
        self.slot.get().is_some()
    }

    /// Predictor for the loaded classifier, if any
    pub fn predictor(&self) -> Option<Predictor> {
        self.slot.get().cloned()
    }
}
