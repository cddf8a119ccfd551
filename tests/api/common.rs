// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Shared helpers for API tests: stub classifiers, synthetic images and
//! hand-built multipart bodies.
#![allow(dead_code)]

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use civic_vision_api::{
    api::{create_app, AppState},
    vision::{Classifier, ModelManager, NormalizedTensor, ScoreVector},
};
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use std::io::Cursor;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tower::ServiceExt; // for `oneshot`

pub const BOUNDARY: &str = "civic-test-boundary";

/// Returns the same scores for every image and counts calls
pub struct FixedClassifier {
    scores: Vec<f32>,
    calls: Arc<AtomicUsize>,
}

impl FixedClassifier {
    pub fn new(scores: Vec<f32>) -> Self {
        Self {
            scores,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn calls(&self) -> Arc<AtomicUsize> {
        self.calls.clone()
    }
}

impl Classifier for FixedClassifier {
    fn classify(&self, _input: &NormalizedTensor) -> anyhow::Result<ScoreVector> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.scores.clone())
    }
}

/// Always fails, like a crashed runtime session
pub struct FailingClassifier;

impl Classifier for FailingClassifier {
    fn classify(&self, _input: &NormalizedTensor) -> anyhow::Result<ScoreVector> {
        anyhow::bail!("inference session unavailable")
    }
}

/// One-hot on the label whose index is the image brightness scaled to 0..=5.
///
/// Solid gray images with levels 0, 51, 102, 153, 204, 255 map to labels
/// 0..=5, so each request's answer depends only on its own pixels.
pub struct BrightnessClassifier;

impl Classifier for BrightnessClassifier {
    fn classify(&self, input: &NormalizedTensor) -> anyhow::Result<ScoreVector> {
        let value = input.view()[[0, 112, 112, 0]];
        let index = (value * 5.0).round() as usize;
        let mut scores = vec![0.0; 6];
        scores[index.min(5)] = 1.0;
        Ok(scores)
    }
}

pub fn gray_png(width: u32, height: u32, level: u8) -> Vec<u8> {
    let img = RgbImage::from_pixel(width, height, Rgb([level, level, level]));
    let mut buf = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(img)
        .write_to(&mut buf, ImageFormat::Png)
        .unwrap();
    buf.into_inner()
}

pub fn black_png(width: u32, height: u32) -> Vec<u8> {
    gray_png(width, height, 0)
}

pub fn app_with(classifier: impl Classifier + 'static) -> Router {
    let state = AppState::new_for_test();
    state.model_manager.install(Arc::new(classifier)).unwrap();
    create_app(state)
}

pub fn app_with_scores(scores: Vec<f32>) -> Router {
    app_with(FixedClassifier::new(scores))
}

pub fn app_without_model() -> Router {
    create_app(AppState::new_for_test())
}

pub fn state_with(classifier: impl Classifier + 'static) -> AppState {
    AppState::new(
        ModelManager::with_classifier(Arc::new(classifier)),
        civic_vision_api::vision::MAX_BATCH_SIZE,
        civic_vision_api::api::http_server::DEFAULT_MAX_BODY_BYTES,
    )
}

/// One part of a multipart/form-data body
pub struct Part {
    pub name: &'static str,
    pub filename: String,
    pub content_type: Option<&'static str>,
    pub data: Vec<u8>,
}

impl Part {
    pub fn file(name: &'static str, filename: &str, content_type: &'static str, data: Vec<u8>) -> Self {
        Self {
            name,
            filename: filename.to_string(),
            content_type: Some(content_type),
            data,
        }
    }
}

pub fn multipart_body(parts: &[Part]) -> Vec<u8> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        body.extend_from_slice(
            format!(
                "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
                part.name, part.filename
            )
            .as_bytes(),
        );
        if let Some(content_type) = part.content_type {
            body.extend_from_slice(format!("Content-Type: {}\r\n", content_type).as_bytes());
        }
        body.extend_from_slice(b"\r\n");
        body.extend_from_slice(&part.data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    body
}

pub fn multipart_request(uri: &str, parts: &[Part]) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(multipart_body(parts)))
        .unwrap()
}

/// POST with a JSON body, which the upload endpoints do not accept
pub fn json_request(uri: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(r#"{"file": "road.png"}"#))
        .unwrap()
}

pub fn get_request(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

/// Send one request and decode the JSON body
pub async fn send(app: Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if body_bytes.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&body_bytes).unwrap_or(serde_json::Value::Null)
    };
    (status, json)
}
