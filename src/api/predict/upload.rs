// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Multipart extraction of uploaded images

use axum_extra::extract::multipart::{Field, Multipart};
use tracing::debug;

use crate::api::errors::ApiError;
use crate::vision::RawUpload;

/// Form field carrying the image for POST /predict
pub const SINGLE_UPLOAD_FIELD: &str = "file";

/// Form field (repeated) carrying the images for POST /batch-predict
pub const BATCH_UPLOAD_FIELD: &str = "files";

/// Read one multipart field fully into memory
async fn read_upload(field: Field) -> Result<RawUpload, ApiError> {
    let filename = field.file_name().unwrap_or_default().to_string();
    let content_type = field.content_type().unwrap_or_default().to_string();
    let data = field.bytes().await?;

    debug!(
        "Received upload '{}' ({}, {} bytes)",
        filename,
        content_type,
        data.len()
    );
    Ok(RawUpload::new(filename, content_type, data))
}

/// Extract the `file` field. Other fields are ignored.
pub async fn read_single_upload(mut multipart: Multipart) -> Result<RawUpload, ApiError> {
    while let Some(field) = multipart.next_field().await? {
        if field.name() == Some(SINGLE_UPLOAD_FIELD) {
            return read_upload(field).await;
        }
    }

    Err(ApiError::InvalidRequest(format!(
        "Missing '{}' field",
        SINGLE_UPLOAD_FIELD
    )))
}

/// Extract every `files` field in order.
///
/// Stops with `BatchSizeExceeded` as soon as one field more than
/// `max_batch_size` shows up, so an oversized batch is never buffered whole.
pub async fn read_batch_uploads(
    mut multipart: Multipart,
    max_batch_size: usize,
) -> Result<Vec<RawUpload>, ApiError> {
    let mut uploads = Vec::new();

    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(BATCH_UPLOAD_FIELD) {
            continue;
        }
        if uploads.len() == max_batch_size {
            return Err(ApiError::BatchSizeExceeded {
                max: max_batch_size,
            });
        }
        uploads.push(read_upload(field).await?);
    }

    if uploads.is_empty() {
        return Err(ApiError::InvalidRequest(format!(
            "Missing '{}' field",
            BATCH_UPLOAD_FIELD
        )));
    }

    Ok(uploads)
}
