//! # Inference Collaborator
//!
//! The segmentation model is an external capability with two calls: embed an image once,
//! then decode masks from that embedding for any number of point prompts. The session only
//! sees this trait; [`http::HttpInferenceBackend`] talks to a model server over HTTP and
//! tests substitute in-process mocks.

pub mod http;

use anyhow::Result;
use async_trait::async_trait;
use cutout_raster::mask::MaskCandidateSet;
use image::RgbaImage;

use crate::core::{ImageEmbedding, Point};

pub use http::HttpInferenceBackend;

/// Abstract interface for a point-prompt segmentation model.
#[async_trait]
pub trait InferenceBackend: Send + Sync {
    /// Compute the embedding of `image` with the model named `model`.
    async fn embed(&self, model: &str, image: &RgbaImage) -> Result<ImageEmbedding>;

    /// Decode candidate masks for `points` at the embedded image's original size.
    async fn decode(&self, embedding: &ImageEmbedding, points: &[Point])
    -> Result<MaskCandidateSet>;
}
