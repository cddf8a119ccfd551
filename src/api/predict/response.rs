// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Prediction response types

use serde::Serialize;

use crate::vision::{BatchItemResult, ClassLabel, LabelMap, PredictionResult, RawUpload};

/// Metadata about the uploaded file
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ImageInfo {
    pub filename: String,
    /// Upload size in bytes
    pub size: usize,
    pub content_type: String,
}

impl ImageInfo {
    pub fn from_upload(upload: &RawUpload) -> Self {
        Self {
            filename: upload.filename.clone(),
            size: upload.size(),
            content_type: upload.content_type.clone(),
        }
    }
}

/// Response from POST /predict
#[derive(Debug, Clone, Serialize)]
pub struct PredictResponse {
    pub predicted_class: ClassLabel,
    /// Score of the predicted class
    pub confidence: f32,
    /// Score of every class, in model output order
    pub all_predictions: LabelMap<f32>,
    pub image_info: ImageInfo,
}

impl PredictResponse {
    pub fn new(prediction: PredictionResult, image_info: ImageInfo) -> Self {
        Self {
            predicted_class: prediction.predicted_class,
            confidence: prediction.confidence,
            all_predictions: prediction.all_predictions,
            image_info,
        }
    }
}

/// One entry of a batch response
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum BatchItemResponse {
    Success {
        filename: String,
        predicted_class: ClassLabel,
        confidence: f32,
        all_predictions: LabelMap<f32>,
    },
    Failure {
        filename: String,
        error: String,
    },
}

impl From<BatchItemResult> for BatchItemResponse {
    fn from(item: BatchItemResult) -> Self {
        match item {
            BatchItemResult::Success {
                filename,
                prediction,
            } => BatchItemResponse::Success {
                filename,
                predicted_class: prediction.predicted_class,
                confidence: prediction.confidence,
                all_predictions: prediction.all_predictions,
            },
            BatchItemResult::Failure { filename, error } => {
                BatchItemResponse::Failure { filename, error }
            }
        }
    }
}

/// Response from POST /batch-predict
#[derive(Debug, Clone, Serialize)]
pub struct BatchPredictResponse {
    pub results: Vec<BatchItemResponse>,
}

impl BatchPredictResponse {
    pub fn from_results(results: Vec<BatchItemResult>) -> Self {
        Self {
            results: results.into_iter().map(BatchItemResponse::from).collect(),
        }
    }
}
