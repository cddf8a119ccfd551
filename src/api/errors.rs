// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use axum_extra::extract::multipart::{MultipartError, MultipartRejection};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::error;

use crate::vision::{BatchError, PredictionError};

/// JSON body of every error response
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ErrorResponse {
    pub detail: String,
    pub error_type: String,
}

#[derive(Debug)]
pub enum ApiError {
    InvalidRequest(String),
    InvalidInputType,
    BatchSizeExceeded { max: usize },
    ModelNotLoaded,
    ProcessingFailed(PredictionError),
    InternalError(String),
}

impl ApiError {
    pub fn error_type(&self) -> &'static str {
        match self {
            ApiError::InvalidRequest(_) => "invalid_request",
            ApiError::InvalidInputType => "invalid_input_type",
            ApiError::BatchSizeExceeded { .. } => "batch_size_exceeded",
            ApiError::ModelNotLoaded => "model_not_loaded",
            ApiError::ProcessingFailed(e) => e.kind(),
            ApiError::InternalError(_) => "internal_error",
        }
    }

    pub fn to_response(&self) -> ErrorResponse {
        let detail = match self {
            ApiError::InvalidRequest(msg) => msg.clone(),
            ApiError::InvalidInputType => "File must be an image".to_string(),
            ApiError::BatchSizeExceeded { max } => {
                format!("Maximum {} images allowed per batch", max)
            }
            ApiError::ModelNotLoaded => "Model not loaded".to_string(),
            ApiError::ProcessingFailed(e) => e.reason(),
            ApiError::InternalError(msg) => msg.clone(),
        };

        ErrorResponse {
            detail,
            error_type: self.error_type().to_string(),
        }
    }

    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::InvalidRequest(_)
            | ApiError::InvalidInputType
            | ApiError::BatchSizeExceeded { .. } => 400,
            ApiError::ModelNotLoaded
            | ApiError::ProcessingFailed(_)
            | ApiError::InternalError(_) => 500,
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::InvalidRequest(msg) => write!(f, "Invalid request: {}", msg),
            ApiError::InvalidInputType => write!(f, "File must be an image"),
            ApiError::BatchSizeExceeded { max } => {
                write!(f, "Maximum {} images allowed per batch", max)
            }
            ApiError::ModelNotLoaded => write!(f, "Model not loaded"),
            ApiError::ProcessingFailed(e) => write!(f, "{}", e.reason()),
            ApiError::InternalError(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl From<PredictionError> for ApiError {
    fn from(err: PredictionError) -> Self {
        if err.is_invalid_input() {
            ApiError::InvalidInputType
        } else {
            ApiError::ProcessingFailed(err)
        }
    }
}

impl From<BatchError> for ApiError {
    fn from(err: BatchError) -> Self {
        match err {
            BatchError::BatchSizeExceeded { max, .. } => ApiError::BatchSizeExceeded { max },
        }
    }
}

impl From<MultipartError> for ApiError {
    fn from(err: MultipartError) -> Self {
        ApiError::InvalidRequest(format!("Invalid multipart body: {}", err.body_text()))
    }
}

impl From<MultipartRejection> for ApiError {
    fn from(rejection: MultipartRejection) -> Self {
        ApiError::InvalidRequest(format!(
            "Expected a multipart/form-data body: {}",
            rejection.body_text()
        ))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        if status.is_server_error() {
            error!("Request failed: {}", self);
        }
        (status, Json(self.to_response())).into_response()
    }
}
