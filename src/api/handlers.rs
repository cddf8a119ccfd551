// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Informational endpoints: `/`, `/health`, `/classes`

use axum::{extract::State, Json};
use serde::Serialize;

use crate::api::http_server::AppState;
use crate::vision::{ClassLabel, LabelMap};

pub const SERVICE_NAME: &str = "Civic Infrastructure Image Classification API";

#[derive(Debug, Clone, Serialize)]
pub struct RootResponse {
    pub message: String,
    pub status: String,
    pub model_loaded: bool,
    pub classes: Vec<&'static str>,
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub model_loaded: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct ClassesResponse {
    pub classes: Vec<&'static str>,
    pub total_classes: usize,
    pub descriptions: LabelMap<&'static str>,
}

impl ClassesResponse {
    pub fn new() -> Self {
        Self {
            classes: ClassLabel::names(),
            total_classes: ClassLabel::COUNT,
            descriptions: LabelMap::zip(ClassLabel::ALL.iter().map(|l| l.description())),
        }
    }
}

impl Default for ClassesResponse {
    fn default() -> Self {
        Self::new()
    }
}

/// GET /
pub async fn root_handler(State(state): State<AppState>) -> Json<RootResponse> {
    Json(RootResponse {
        message: SERVICE_NAME.to_string(),
        status: "running".to_string(),
        model_loaded: state.model_manager.is_loaded(),
        classes: ClassLabel::names(),
    })
}

/// GET /health
///
/// Always reports "healthy" while the process serves; `model_loaded` tells
/// whether predictions will work.
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        model_loaded: state.model_manager.is_loaded(),
    })
}

/// GET /classes
pub async fn classes_handler() -> Json<ClassesResponse> {
    Json(ClassesResponse::new())
}
