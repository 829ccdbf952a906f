//! HTTP client for a segmentation model server.
//!
//! Both calls are JSON `POST`s. Binary payloads travel as standard base64: the image as
//! PNG, the embedding as little-endian `f32`, and mask labels as one byte per pixel per
//! candidate in the interleaved layout.
//!
//! ```text
//! POST {base}/embed   {model, image_png}                      -> {features, shape, original_size, reshaped_size}
//! POST {base}/decode  {model, features, shape, ..., points}   -> {width, height, num_candidates, labels, scores}
//! ```

use anyhow::{Context, Result, anyhow, bail, ensure};
use async_trait::async_trait;
use base64::{Engine as _, engine::general_purpose::STANDARD};
use cutout_raster::cut::encode_png;
use cutout_raster::mask::MaskCandidateSet;
use image::RgbaImage;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::InferenceBackend;
use crate::core::{ImageEmbedding, Point};

#[derive(Debug, Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    image_png: String,
}

#[derive(Debug, Deserialize)]
struct EmbedResponse {
    features: String,
    shape: Vec<usize>,
    original_size: [u32; 2],
    reshaped_size: [u32; 2],
}

#[derive(Debug, Serialize)]
struct WirePoint {
    x: f32,
    y: f32,
    label: u8,
}

#[derive(Debug, Serialize)]
struct DecodeRequest<'a> {
    model: &'a str,
    features: String,
    shape: &'a [usize],
    original_size: [u32; 2],
    reshaped_size: [u32; 2],
    points: Vec<WirePoint>,
}

#[derive(Debug, Deserialize)]
struct DecodeResponse {
    width: u32,
    height: u32,
    num_candidates: usize,
    labels: String,
    scores: Vec<f32>,
}

/// Inference backend speaking JSON over HTTP.
pub struct HttpInferenceBackend {
    client: reqwest::Client,
    base_url: String,
}

impl HttpInferenceBackend {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn post<Req: Serialize + Sync, Resp: DeserializeOwned>(
        &self,
        path: &str,
        body: &Req,
    ) -> Result<Resp> {
        let url = format!("{}/{}", self.base_url, path);
        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .with_context(|| format!("POST {}", url))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            bail!("POST {} returned {}: {}", url, status, text.trim());
        }
        response
            .json::<Resp>()
            .await
            .with_context(|| format!("invalid response body from {}", url))
    }
}

#[async_trait]
impl InferenceBackend for HttpInferenceBackend {
    async fn embed(&self, model: &str, image: &RgbaImage) -> Result<ImageEmbedding> {
        let png = encode_png(image)?;
        let request = EmbedRequest {
            model,
            image_png: STANDARD.encode(&png),
        };
        let response: EmbedResponse = self.post("embed", &request).await?;

        let embedding = ImageEmbedding {
            features: decode_f32_le(&response.features)?,
            shape: response.shape,
            model: model.to_string(),
            original_size: (response.original_size[0], response.original_size[1]),
            reshaped_size: (response.reshaped_size[0], response.reshaped_size[1]),
        };
        ensure!(
            embedding.features.len() == embedding.expected_len(),
            "embedding has {} values but shape {:?} needs {}",
            embedding.features.len(),
            embedding.shape,
            embedding.expected_len()
        );
        ensure!(
            embedding.original_size == image.dimensions(),
            "embedding is for a {:?} image, sent {:?}",
            embedding.original_size,
            image.dimensions()
        );
        debug!(model, shape = ?embedding.shape, "embedding received");
        Ok(embedding)
    }

    async fn decode(
        &self,
        embedding: &ImageEmbedding,
        points: &[Point],
    ) -> Result<MaskCandidateSet> {
        let request = DecodeRequest {
            model: &embedding.model,
            features: encode_f32_le(&embedding.features),
            shape: &embedding.shape,
            original_size: [embedding.original_size.0, embedding.original_size.1],
            reshaped_size: [embedding.reshaped_size.0, embedding.reshaped_size.1],
            points: points
                .iter()
                .map(|p| WirePoint {
                    x: p.x,
                    y: p.y,
                    label: p.label.as_u8(),
                })
                .collect(),
        };
        let response: DecodeResponse = self.post("decode", &request).await?;

        ensure!(
            (response.width, response.height) == embedding.original_size,
            "mask is {}x{}, image is {}x{}",
            response.width,
            response.height,
            embedding.original_size.0,
            embedding.original_size.1
        );
        let labels = STANDARD
            .decode(response.labels.as_bytes())
            .context("mask labels are not valid base64")?;
        MaskCandidateSet::new(
            response.width,
            response.height,
            response.num_candidates,
            labels,
            response.scores,
        )
        .map_err(|e| anyhow!("malformed mask set: {}", e))
    }
}

fn encode_f32_le(values: &[f32]) -> String {
    let bytes: Vec<u8> = values.iter().flat_map(|v| v.to_le_bytes()).collect();
    STANDARD.encode(bytes)
}

fn decode_f32_le(encoded: &str) -> Result<Vec<f32>> {
    let bytes = STANDARD
        .decode(encoded.as_bytes())
        .context("embedding features are not valid base64")?;
    ensure!(
        bytes.len() % 4 == 0,
        "embedding byte length {} is not a multiple of 4",
        bytes.len()
    );
    Ok(bytes
        .chunks_exact(4)
        .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect())
}
