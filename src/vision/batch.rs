// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Batch prediction with per-item failure isolation

use thiserror::Error;
use tracing::{info, warn};

use super::predictor::{PredictionResult, Predictor, RawUpload};

/// Default upper bound on uploads per batch request
pub const MAX_BATCH_SIZE: usize = 10;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum BatchError {
    #[error("Maximum {max} images allowed per batch")]
    BatchSizeExceeded { max: usize, actual: usize },
}

/// Outcome for one upload of a batch
#[derive(Debug, Clone, PartialEq)]
pub enum BatchItemResult {
    Success {
        filename: String,
        prediction: PredictionResult,
    },
    Failure {
        filename: String,
        error: String,
    },
}

impl BatchItemResult {
    pub fn filename(&self) -> &str {
        match self {
            BatchItemResult::Success { filename, .. } | BatchItemResult::Failure { filename, .. } => {
                filename
            }
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, BatchItemResult::Success { .. })
    }
}

/// Runs a [`Predictor`] over an ordered list of uploads.
///
/// Output order equals input order and a failed item never stops the ones
/// after it.
#[derive(Debug, Clone)]
pub struct BatchOrchestrator {
    predictor: Predictor,
    max_batch_size: usize,
}

impl BatchOrchestrator {
    pub fn new(predictor: Predictor) -> Self {
        Self::with_max_batch_size(predictor, MAX_BATCH_SIZE)
    }

    pub fn with_max_batch_size(predictor: Predictor, max_batch_size: usize) -> Self {
        Self {
            predictor,
            max_batch_size,
        }
    }

    pub fn max_batch_size(&self) -> usize {
        self.max_batch_size
    }

    /// Reject oversized batches before any item is touched
    pub fn check_size(&self, count: usize) -> Result<(), BatchError> {
        if count > self.max_batch_size {
            return Err(BatchError::BatchSizeExceeded {
                max: self.max_batch_size,
                actual: count,
            });
        }
        Ok(())
    }

    /// Classify every upload in order. Blocking.
    ///
    /// Each upload is consumed by its own attempt, so its bytes are released
    /// as soon as that item finishes.
    pub fn run(&self, uploads: Vec<RawUpload>) -> Result<Vec<BatchItemResult>, BatchError> {
        self.check_size(uploads.len())?;

        let total = uploads.len();
        let results: Vec<BatchItemResult> = uploads
            .into_iter()
            .map(|upload| self.run_item(upload))
            .collect();

        let succeeded = results.iter().filter(|r| r.is_success()).count();
        info!("Batch complete: {}/{} images classified", succeeded, total);
        Ok(results)
    }

    fn run_item(&self, upload: RawUpload) -> BatchItemResult {
        match self.predictor.predict(&upload) {
            Ok(prediction) => BatchItemResult::Success {
                filename: upload.filename,
                prediction,
            },
            Err(e) => {
                warn!(
                    "Batch item '{}' failed ({}): {}",
                    upload.filename,
                    e.kind(),
                    e
                );
                BatchItemResult::Failure {
                    filename: upload.filename,
                    error: e.reason(),
                }
            }
        }
    }
}
