// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Prediction endpoint handlers

use axum::{extract::State, Json};
use axum_extra::extract::multipart::{Multipart, MultipartRejection};
use tracing::{debug, info, warn};

use super::response::{BatchPredictResponse, ImageInfo, PredictResponse};
use super::upload::{read_batch_uploads, read_single_upload};
use crate::api::errors::ApiError;
use crate::api::http_server::AppState;
use crate::vision::{BatchOrchestrator, Predictor};

fn loaded_predictor(state: &AppState) -> Result<Predictor, ApiError> {
    state.model_manager.predictor().ok_or_else(|| {
        warn!("Prediction requested but model is not loaded");
        ApiError::ModelNotLoaded
    })
}

/// POST /predict - Classify one uploaded image
///
/// Expects a multipart form with the image in the `file` field.
///
/// # Response
/// - `predicted_class`: Label with the highest score
/// - `confidence`: Score of that label
/// - `all_predictions`: Score of every label
/// - `image_info`: Filename, byte size and content type of the upload
///
/// # Errors
/// - 400 Bad Request: Upload is not an image, or the body is not a valid multipart form
/// - 500 Internal Server Error: Model not loaded, or the image could not be processed
pub async fn predict_handler(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<PredictResponse>, ApiError> {
    // Checked before the body is looked at
    let predictor = loaded_predictor(&state)?;

    let upload = read_single_upload(multipart?).await?;
    let image_info = ImageInfo::from_upload(&upload);

    let prediction = tokio::task::spawn_blocking(move || predictor.predict(&upload))
        .await
        .map_err(|e| ApiError::InternalError(format!("Prediction task failed: {}", e)))?
        .map_err(|e| {
            warn!(
                "Error during prediction for '{}' ({}): {}",
                image_info.filename,
                e.kind(),
                e
            );
            ApiError::from(e)
        })?;

    Ok(Json(PredictResponse::new(prediction, image_info)))
}

/// POST /batch-predict - Classify up to `max_batch_size` images
///
/// Expects a multipart form with each image in a `files` field. Results come
/// back in upload order; a failed image yields `{filename, error}` instead of
/// a prediction and never affects the others.
///
/// # Errors
/// - 400 Bad Request: Too many images, or the body is not a valid multipart form
/// - 500 Internal Server Error: Model not loaded
pub async fn batch_predict_handler(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<BatchPredictResponse>, ApiError> {
    let predictor = loaded_predictor(&state)?;
    let orchestrator = BatchOrchestrator::with_max_batch_size(predictor, state.max_batch_size);

    let uploads = read_batch_uploads(multipart?, orchestrator.max_batch_size()).await?;
    debug!("Batch request with {} images", uploads.len());

    let results = tokio::task::spawn_blocking(move || orchestrator.run(uploads))
        .await
        .map_err(|e| ApiError::InternalError(format!("Batch task failed: {}", e)))??;

    info!("Batch prediction returned {} results", results.len());
    Ok(Json(BatchPredictResponse::from_results(results)))
}
