// Remote frame source: `GET` against the editor bridge, which answers with the current
// frame as PNG. Any non-2xx status aborts the load.

use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use image::RgbaImage;
use tracing::debug;

use super::{FrameSource, decode_rgba};

pub struct HttpFrameSource {
    client: reqwest::Client,
    url: String,
}

impl HttpFrameSource {
    pub fn new(client: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }
}

#[async_trait]
impl FrameSource for HttpFrameSource {
    async fn fetch_frame(&self) -> Result<RgbaImage> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .with_context(|| format!("GET {}", self.url))?;

        let status = response.status();
        if !status.is_success() {
            bail!("HTTP {}", status);
        }
        let bytes = response
            .bytes()
            .await
            .with_context(|| format!("reading body of {}", self.url))?;
        debug!(url = %self.url, bytes = bytes.len(), "frame fetched");
        decode_rgba(&bytes)
    }

    fn describe(&self) -> String {
        self.url.clone()
    }
}
