// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Tests for POST /batch-predict

use axum::http::StatusCode;
use std::sync::atomic::Ordering;

use super::common::{
    app_with, app_with_scores, app_without_model, black_png, json_request, multipart_request, send,
    FixedClassifier, Part,
};

const SCORES: [f32; 6] = [0.6, 0.1, 0.1, 0.1, 0.05, 0.05];

fn png_part(filename: &str) -> Part {
    Part::file("files", filename, "image/png", black_png(8, 8))
}

#[tokio::test]
async fn test_batch_mixed_results_keep_order() {
    let request = multipart_request(
        "/batch-predict",
        &[
            png_part("a.png"),
            Part::file("files", "b.txt", "text/plain", b"not an image".to_vec()),
            png_part("c.png"),
        ],
    );

    let (status, json) = send(app_with_scores(SCORES.to_vec()), request).await;

    assert_eq!(status, StatusCode::OK, "body: {}", json);
    let results = json["results"].as_array().unwrap();
    assert_eq!(results.len(), 3);

    assert_eq!(results[0]["filename"], "a.png");
    assert_eq!(results[0]["predicted_class"], "garbage");
    assert_eq!(results[0]["all_predictions"].as_object().unwrap().len(), 6);
    assert!(results[0].get("error").is_none());

    assert_eq!(results[1]["filename"], "b.txt");
    assert_eq!(results[1]["error"], "File must be an image");
    assert!(results[1].get("predicted_class").is_none());

    assert_eq!(results[2]["filename"], "c.png");
    assert_eq!(results[2]["predicted_class"], "garbage");
}

#[tokio::test]
async fn test_batch_corrupt_item_reports_processing_error() {
    let request = multipart_request(
        "/batch-predict",
        &[
            Part::file("files", "broken.png", "image/png", vec![0x89, b'P', b'N', b'G']),
            png_part("ok.png"),
        ],
    );

    let (status, json) = send(app_with_scores(SCORES.to_vec()), request).await;

    assert_eq!(status, StatusCode::OK);
    let results = json["results"].as_array().unwrap();
    assert!(results[0]["error"]
        .as_str()
        .unwrap()
        .starts_with("Error processing image: "));
    assert_eq!(results[1]["predicted_class"], "garbage");
}

#[tokio::test]
async fn test_batch_too_many_files() {
    let classifier = FixedClassifier::new(SCORES.to_vec());
    let calls = classifier.calls();
    let parts: Vec<Part> = (0..11).map(|i| png_part(&format!("{}.png", i))).collect();

    let (status, json) = send(
        app_with(classifier),
        multipart_request("/batch-predict", &parts),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["detail"], "Maximum 10 images allowed per batch");
    assert_eq!(json["error_type"], "batch_size_exceeded");
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_batch_exactly_max_files() {
    let classifier = FixedClassifier::new(SCORES.to_vec());
    let calls = classifier.calls();
    let parts: Vec<Part> = (0..10).map(|i| png_part(&format!("{}.png", i))).collect();

    let (status, json) = send(
        app_with(classifier),
        multipart_request("/batch-predict", &parts),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let results = json["results"].as_array().unwrap();
    assert_eq!(results.len(), 10);
    for (i, item) in results.iter().enumerate() {
        assert_eq!(item["filename"], format!("{}.png", i));
    }
    assert_eq!(calls.load(Ordering::SeqCst), 10);
}

#[tokio::test]
async fn test_batch_single_file() {
    let request = multipart_request("/batch-predict", &[png_part("only.png")]);
    let (status, json) = send(app_with_scores(SCORES.to_vec()), request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["results"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_batch_ignores_other_fields() {
    let request = multipart_request(
        "/batch-predict",
        &[
            Part::file("file", "stray.png", "image/png", black_png(2, 2)),
            png_part("kept.png"),
        ],
    );

    let (status, json) = send(app_with_scores(SCORES.to_vec()), request).await;

    assert_eq!(status, StatusCode::OK);
    let results = json["results"].as_array().unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0]["filename"], "kept.png");
}

#[tokio::test]
async fn test_batch_missing_files_field() {
    let request = multipart_request(
        "/batch-predict",
        &[Part::file("file", "a.png", "image/png", black_png(2, 2))],
    );
    let (status, json) = send(app_with_scores(SCORES.to_vec()), request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["detail"], "Missing 'files' field");
}

#[tokio::test]
async fn test_batch_model_not_loaded() {
    let request = multipart_request("/batch-predict", &[png_part("a.png")]);
    let (status, json) = send(app_without_model(), request).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["detail"], "Model not loaded");
    assert_eq!(json["error_type"], "model_not_loaded");
}

#[tokio::test]
async fn test_batch_non_multipart_body() {
    let (status, json) = send(app_with_scores(SCORES.to_vec()), json_request("/batch-predict")).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error_type"], "invalid_request");
    assert!(json["detail"]
        .as_str()
        .unwrap()
        .starts_with("Expected a multipart/form-data body"));
}

#[tokio::test]
async fn test_batch_non_multipart_body_without_model() {
    let (status, json) = send(app_without_model(), json_request("/batch-predict")).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["detail"], "Model not loaded");
}
