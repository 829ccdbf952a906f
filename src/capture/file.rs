// Local file source.

use std::path::PathBuf;

use anyhow::{Context, Result};
use async_trait::async_trait;
use image::RgbaImage;

use super::{FrameSource, decode_rgba};

pub struct FileFrameSource {
    path: PathBuf,
}

impl FileFrameSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl FrameSource for FileFrameSource {
    async fn fetch_frame(&self) -> Result<RgbaImage> {
        let bytes = tokio::fs::read(&self.path)
            .await
            .with_context(|| format!("reading {}", self.path.display()))?;
        decode_rgba(&bytes)
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}
