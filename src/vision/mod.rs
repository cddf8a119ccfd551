// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Civic-infrastructure image classification pipeline
//!
//! Upload bytes flow through decode -> preprocess -> classify -> top-class
//! selection. Everything here is synchronous; the HTTP layer moves it onto
//! blocking threads.

pub mod batch;
pub mod classifier;
pub mod image_utils;
pub mod labels;
pub mod model_manager;
pub mod predictor;
pub mod preprocessing;

pub use batch::{BatchError, BatchItemResult, BatchOrchestrator, MAX_BATCH_SIZE};
pub use classifier::{softmax, Classifier, OnnxClassifier, ScoreVector};
pub use image_utils::{check_content_type, decode_image_bytes, decode_upload, ImageError, ImageInfo};
pub use labels::{ClassLabel, LabelMap};
pub use model_manager::{load_classifier, AlreadyLoaded, ClassifierModelConfig, ModelManager};
pub use predictor::{top_score, PredictionError, PredictionResult, Predictor, RawUpload};
pub use preprocessing::{preprocess, NormalizedTensor, PreprocessError, INPUT_SIZE};
