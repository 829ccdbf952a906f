//! # Frame Sources
//!
//! Where images come from. The editor-side bridge exposes the current frame over local
//! HTTP; images can also be loaded from disk. Every source yields a full-resolution RGBA8
//! image; fitting it for display is the session's job.

pub mod file;
pub mod http;

use anyhow::{Context, Result};
use async_trait::async_trait;
use image::RgbaImage;

pub use file::FileFrameSource;
pub use http::HttpFrameSource;

/// Abstract interface for image sources.
#[async_trait]
pub trait FrameSource: Send + Sync {
    /// Fetch and decode the next image.
    async fn fetch_frame(&self) -> Result<RgbaImage>;

    /// Human-readable origin, used in status messages and logs.
    fn describe(&self) -> String;
}

/// Decode encoded image bytes (PNG, JPEG, ...) into RGBA8.
pub fn decode_rgba(bytes: &[u8]) -> Result<RgbaImage> {
    let image = image::load_from_memory(bytes).context("unsupported or corrupt image data")?;
    Ok(image.to_rgba8())
}
