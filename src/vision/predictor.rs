// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Single-image prediction: decode, preprocess, classify, pick the top class

use bytes::Bytes;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

use super::classifier::{Classifier, ScoreVector};
use super::image_utils::{decode_upload, ImageError};
use super::labels::{ClassLabel, LabelMap};
use super::preprocessing::{preprocess, PreprocessError};

/// One uploaded file as received from the client.
///
/// Owned by a single prediction attempt and dropped with it.
#[derive(Debug, Clone)]
pub struct RawUpload {
    pub filename: String,
    pub content_type: String,
    pub data: Bytes,
}

impl RawUpload {
    pub fn new(
        filename: impl Into<String>,
        content_type: impl Into<String>,
        data: impl Into<Bytes>,
    ) -> Self {
        Self {
            filename: filename.into(),
            content_type: content_type.into(),
            data: data.into(),
        }
    }

    /// Upload size in bytes
    pub fn size(&self) -> usize {
        self.data.len()
    }
}

/// Why a single prediction failed
#[derive(Debug, Error)]
pub enum PredictionError {
    #[error("File must be an image")]
    InvalidInputType(String),

    #[error("{0}")]
    Decode(#[source] ImageError),

    #[error("{0}")]
    Preprocess(#[from] PreprocessError),

    #[error("Classifier failed: {0:#}")]
    Adapter(anyhow::Error),
}

impl From<ImageError> for PredictionError {
    fn from(err: ImageError) -> Self {
        match err {
            ImageError::InvalidInputType(content_type) => {
                PredictionError::InvalidInputType(content_type)
            }
            other => PredictionError::Decode(other),
        }
    }
}

impl PredictionError {
    /// Stable identifier of the failure category, for logs and error bodies
    pub fn kind(&self) -> &'static str {
        match self {
            PredictionError::InvalidInputType(_) => "invalid_input_type",
            PredictionError::Decode(_) => "decode_error",
            PredictionError::Preprocess(_) => "preprocess_error",
            PredictionError::Adapter(_) => "adapter_error",
        }
    }

    pub fn is_invalid_input(&self) -> bool {
        matches!(self, PredictionError::InvalidInputType(_))
    }

    /// Message shown to the client
    pub fn reason(&self) -> String {
        match self {
            PredictionError::InvalidInputType(_) => self.to_string(),
            _ => format!("Error processing image: {}", self),
        }
    }
}

/// Top class plus the full score breakdown for one image
#[derive(Debug, Clone, PartialEq)]
pub struct PredictionResult {
    pub predicted_class: ClassLabel,
    pub confidence: f32,
    pub all_predictions: LabelMap<f32>,
}

impl PredictionResult {
    /// Build a result from raw classifier output.
    ///
    /// The vector must hold exactly one score per label.
    pub fn from_scores(scores: ScoreVector) -> Result<Self, PredictionError> {
        if scores.len() != ClassLabel::COUNT {
            return Err(PredictionError::Adapter(anyhow::anyhow!(
                "expected {} scores, got {}",
                ClassLabel::COUNT,
                scores.len()
            )));
        }

        let (index, confidence) = top_score(&scores).ok_or_else(|| {
            PredictionError::Adapter(anyhow::anyhow!("classifier returned only NaN scores"))
        })?;
        let predicted_class = ClassLabel::from_index(index)
            .ok_or_else(|| PredictionError::Adapter(anyhow::anyhow!("score index out of range")))?;

        Ok(Self {
            predicted_class,
            confidence,
            all_predictions: LabelMap::zip(scores),
        })
    }
}

/// Arg-max with the first maximal position winning ties. NaN never wins.
pub fn top_score(scores: &[f32]) -> Option<(usize, f32)> {
    let mut best: Option<(usize, f32)> = None;
    for (i, &score) in scores.iter().enumerate() {
        if score.is_nan() {
            continue;
        }
        match best {
            Some((_, current)) if score <= current => {}
            _ => best = Some((i, score)),
        }
    }
    best
}

/// Runs the whole pipeline for one upload against a shared classifier
#[derive(Clone)]
pub struct Predictor {
    classifier: Arc<dyn Classifier>,
}

impl std::fmt::Debug for Predictor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Predictor").finish_non_exhaustive()
    }
}

impl Predictor {
    pub fn new(classifier: Arc<dyn Classifier>) -> Self {
        Self { classifier }
    }

    /// Classify one upload.
    ///
    /// Blocking: decoding, resizing and inference all run on the calling
    /// thread.
    pub fn predict(&self, upload: &RawUpload) -> Result<PredictionResult, PredictionError> {
        let (image, info) = decode_upload(&upload.data, &upload.content_type)?;
        debug!(
            "Decoded {}: {}x{} {:?}, {} bytes",
            upload.filename, info.width, info.height, info.format, info.size_bytes
        );

        let tensor = preprocess(&image)?;
        drop(image);

        let scores = self
            .classifier
            .classify(&tensor)
            .map_err(PredictionError::Adapter)?;
        let result = PredictionResult::from_scores(scores)?;

        info!(
            "Prediction made: {} with confidence {:.4}",
            result.predicted_class, result.confidence
        );
        Ok(result)
    }
}
