// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Prediction API endpoint module
//!
//! Provides POST /predict and POST /batch-predict for classifying uploaded images.

pub mod handler;
pub mod response;
pub mod upload;

pub use handler::{batch_predict_handler, predict_handler};
pub use response::{BatchItemResponse, BatchPredictResponse, ImageInfo, PredictResponse};
pub use upload::{read_batch_uploads, read_single_upload, BATCH_UPLOAD_FIELD, SINGLE_UPLOAD_FIELD};
