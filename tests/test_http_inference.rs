//! Integration tests for the HTTP inference backend against a canned model server

mod common;

use base64::{Engine as _, engine::general_purpose::STANDARD};
use common::http_stub::{CannedResponse, serve};
use common::test_frames::gradient;
use point_prompt_cutout::core::{ImageEmbedding, Point};
use point_prompt_cutout::inference::{HttpInferenceBackend, InferenceBackend};
use serde_json::json;

fn features_b64(values: &[f32]) -> String {
    let bytes: Vec<u8> = values.iter().flat_map(|v| v.to_le_bytes()).collect();
    STANDARD.encode(bytes)
}

fn embedding(size: (u32, u32)) -> ImageEmbedding {
    ImageEmbedding {
        features: vec![0.5, 1.5],
        shape: vec![1, 2],
        model: "sam-vit-b".to_string(),
        original_size: size,
        reshaped_size: (1024, 512),
    }
}

#[tokio::test]
async fn test_embed_round_trip() {
    let (base, server) = serve(vec![CannedResponse::json(json!({
        "features": features_b64(&[0.5, -1.0, 2.0, 4.0]),
        "shape": [1, 2, 2],
        "original_size": [4, 2],
        "reshaped_size": [1024, 512],
    }))])
    .await;
    let backend = HttpInferenceBackend::new(reqwest::Client::new(), format!("{}/", base));

    let image = gradient(4, 2);
    let embedding = backend.embed("sam-vit-b", &image).await.unwrap();
    assert_eq!(embedding.features, vec![0.5, -1.0, 2.0, 4.0]);
    assert_eq!(embedding.shape, vec![1, 2, 2]);
    assert_eq!(embedding.model, "sam-vit-b");
    assert_eq!(embedding.reshaped_size, (1024, 512));

    let requests = server.await.unwrap();
    assert_eq!(requests[0].path, "/embed");
    let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert_eq!(body["model"], "sam-vit-b");
    let png = STANDARD.decode(body["image_png"].as_str().unwrap()).unwrap();
    assert_eq!(image::load_from_memory(&png).unwrap().to_rgba8(), image);
}

#[tokio::test]
async fn test_embed_shape_mismatch_rejected() {
    let (base, _server) = serve(vec![CannedResponse::json(json!({
        "features": features_b64(&[0.5, 1.0]),
        "shape": [1, 3],
        "original_size": [4, 2],
        "reshaped_size": [4, 2],
    }))])
    .await;
    let backend = HttpInferenceBackend::new(reqwest::Client::new(), base);
    let err = backend.embed("m", &gradient(4, 2)).await.unwrap_err();
    assert!(err.to_string().contains("shape"));
}

#[tokio::test]
async fn test_decode_sends_points_and_parses_masks() {
    // 2x1 image, 2 candidates, interleaved per pixel.
    let labels = [1u8, 0, 1, 1];
    let (base, server) = serve(vec![CannedResponse::json(json!({
        "width": 2,
        "height": 1,
        "num_candidates": 2,
        "labels": STANDARD.encode(labels),
        "scores": [0.4, 0.8],
    }))])
    .await;
    let backend = HttpInferenceBackend::new(reqwest::Client::new(), base);

    let points = [Point::foreground(0.25, 0.5), Point::background(0.75, 0.5)];
    let masks = backend.decode(&embedding((2, 1)), &points).await.unwrap();
    assert_eq!(masks.dimensions(), (2, 1));
    assert_eq!(masks.num_candidates(), 2);
    assert_eq!(masks.label(0, 1), 0);
    assert_eq!(masks.label(1, 1), 1);

    let requests = server.await.unwrap();
    assert_eq!(requests[0].path, "/decode");
    let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert_eq!(body["points"][1]["label"], 0);
    assert_eq!(body["shape"], json!([1, 2]));
    assert_eq!(body["features"], features_b64(&[0.5, 1.5]));
}

#[tokio::test]
async fn test_decode_wrong_mask_size_rejected() {
    let (base, _server) = serve(vec![CannedResponse::json(json!({
        "width": 3,
        "height": 1,
        "num_candidates": 1,
        "labels": STANDARD.encode([1u8, 1, 1]),
        "scores": [0.5],
    }))])
    .await;
    let backend = HttpInferenceBackend::new(reqwest::Client::new(), base);
    let err = backend
        .decode(&embedding((2, 1)), &[Point::foreground(0.5, 0.5)])
        .await
        .unwrap_err();
    assert!(err.to_string().contains("mask is 3x1"));
}

#[tokio::test]
async fn test_server_error_surfaces_status() {
    let (base, _server) = serve(vec![CannedResponse::new(503, "text/plain", "warming up")]).await;
    let backend = HttpInferenceBackend::new(reqwest::Client::new(), base);
    let err = backend.embed("m", &gradient(2, 2)).await.unwrap_err();
    let text = err.to_string();
    assert!(text.contains("503") && text.contains("warming up"), "{}", text);
}

#[tokio::test]
async fn test_oversized_candidate_count_is_a_decode_error() {
    let (base, _server) = serve(vec![CannedResponse::json(json!({
        "width": 2,
        "height": 1,
        "num_candidates": usize::MAX / 2,
        "labels": STANDARD.encode([1u8, 0]),
        "scores": [0.5],
    }))])
    .await;
    let backend = HttpInferenceBackend::new(reqwest::Client::new(), base);
    let err = backend
        .decode(&embedding((2, 1)), &[Point::foreground(0.5, 0.5)])
        .await
        .unwrap_err();
    assert!(err.to_string().contains("too large"), "{}", err);
}
