//! # Cut-Out Export
//!
//! An exported cut-out is encoded once and handed to every configured sink with identical
//! bytes. Sinks run concurrently; each reports its own outcome, so a failed upload neither
//! prevents nor rolls back the local file, and vice versa.
//!
//! ```text
//!                        ┌──────────────────┐
//!                   ┌───▶│  LocalFileSink   │──▶ cutout_YYYYMMDD_HHMMSS_mmm.png
//! ┌────────────┐    │    └──────────────────┘
//! │ PNG bytes  │────┤
//! └────────────┘    │    ┌──────────────────┐
//!                   └───▶│  HttpMaskSink    │──▶ POST image/png
//!                        └──────────────────┘
//! ```

use std::fmt;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use chrono::{DateTime, Local};
use futures_util::future::join_all;
use tokio::io::AsyncWriteExt;
use tracing::{info, warn};

use crate::error::SegmentError;

/// Whether a sink persists locally or uploads to a remote collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SinkKind {
    Local,
    Remote,
}

/// Proof of a successful delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SinkReceipt {
    /// Written to this path
    Saved(PathBuf),
    /// Accepted by the remote endpoint with this HTTP status
    Uploaded { status: u16 },
}

impl fmt::Display for SinkReceipt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SinkReceipt::Saved(path) => write!(f, "saved {}", path.display()),
            SinkReceipt::Uploaded { status } => write!(f, "uploaded (HTTP {})", status),
        }
    }
}

/// Destination for exported cut-out PNGs.
#[async_trait]
pub trait MaskSink: Send + Sync {
    /// Short name used in reports and logs.
    fn name(&self) -> String;

    fn kind(&self) -> SinkKind;

    /// Deliver the encoded cut-out.
    async fn deliver(&self, png: &[u8]) -> Result<SinkReceipt>;
}

/// Build the collision-free base name for an export made at `now`.
pub fn export_file_stem(now: DateTime<Local>) -> String {
    now.format("cutout_%Y%m%d_%H%M%S_%3f").to_string()
}

/// Write `bytes` to a new file in `dir` named after `stem`, appending `_1`, `_2`, ... when
/// the name is taken. The directory is created if missing.
pub async fn write_unique(dir: &Path, stem: &str, bytes: &[u8]) -> Result<PathBuf> {
    tokio::fs::create_dir_all(dir)
        .await
        .with_context(|| format!("creating {}", dir.display()))?;

    let mut counter = 0u32;
    loop {
        let name = if counter == 0 {
            format!("{}.png", stem)
        } else {
            format!("{}_{}.png", stem, counter)
        };
        let path = dir.join(name);
        match tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await
        {
            Ok(mut file) => {
                file.write_all(bytes)
                    .await
                    .with_context(|| format!("writing {}", path.display()))?;
                file.flush().await?;
                return Ok(path);
            }
            Err(e) if e.kind() == ErrorKind::AlreadyExists => counter += 1,
            Err(e) => return Err(e).with_context(|| format!("creating {}", path.display())),
        }
    }
}

/// Writes cut-outs into a directory with timestamped names.
pub struct LocalFileSink {
    dir: PathBuf,
}

impl LocalFileSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

#[async_trait]
impl MaskSink for LocalFileSink {
    fn name(&self) -> String {
        format!("local:{}", self.dir.display())
    }

    fn kind(&self) -> SinkKind {
        SinkKind::Local
    }

    async fn deliver(&self, png: &[u8]) -> Result<SinkReceipt> {
        let stem = export_file_stem(Local::now());
        let path = write_unique(&self.dir, &stem, png).await?;
        Ok(SinkReceipt::Saved(path))
    }
}

/// Posts cut-outs to the editor bridge's mask endpoint.
pub struct HttpMaskSink {
    client: reqwest::Client,
    url: String,
}

impl HttpMaskSink {
    pub fn new(client: reqwest::Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }
}

#[async_trait]
impl MaskSink for HttpMaskSink {
    fn name(&self) -> String {
        self.url.clone()
    }

    fn kind(&self) -> SinkKind {
        SinkKind::Remote
    }

    async fn deliver(&self, png: &[u8]) -> Result<SinkReceipt> {
        let response = self
            .client
            .post(&self.url)
            .header(reqwest::header::CONTENT_TYPE, "image/png")
            .body(png.to_vec())
            .send()
            .await
            .with_context(|| format!("POST {}", self.url))?;

        let status = response.status();
        if !status.is_success() {
            bail!("HTTP {}", status);
        }
        Ok(SinkReceipt::Uploaded {
            status: status.as_u16(),
        })
    }
}

/// Result of one sink's delivery.
#[derive(Debug)]
pub struct SinkOutcome {
    pub sink: String,
    pub kind: SinkKind,
    pub result: Result<SinkReceipt, SegmentError>,
}

/// Fans one encoded cut-out out to every sink concurrently.
pub struct ExportMultiplexer {
    pub sinks: Vec<Box<dyn MaskSink>>,
}

impl ExportMultiplexer {
    pub fn new() -> Self {
        Self { sinks: Vec::new() }
    }

    pub fn push(&mut self, sink: Box<dyn MaskSink>) {
        self.sinks.push(sink);
    }

    pub fn sink_count(&self) -> usize {
        self.sinks.len()
    }

    /// Deliver `png` to all sinks and collect one outcome per sink, in sink order.
    pub async fn deliver(&self, png: &[u8]) -> Vec<SinkOutcome> {
        let futures = self.sinks.iter().map(|sink| async move {
            let name = sink.name();
            let kind = sink.kind();
            let result = sink.deliver(png).await.map_err(|e| {
                let reason = format!("{:#}", e);
                match kind {
                    SinkKind::Local => SegmentError::export(name.clone(), reason),
                    SinkKind::Remote => SegmentError::upload(name.clone(), reason),
                }
            });
            match &result {
                Ok(receipt) => info!(sink = %name, "{}", receipt),
                Err(err) => warn!(sink = %name, error = %err, "export sink failed"),
            }
            SinkOutcome {
                sink: name,
                kind,
                result,
            }
        });
        join_all(futures).await
    }
}

impl Default for ExportMultiplexer {
    fn default() -> Self {
        Self::new()
    }
}

/// Everything one export produced.
#[derive(Debug)]
pub struct ExportReport {
    /// Cut-out dimensions
    pub dimensions: (u32, u32),
    /// Size of the encoded PNG shared by all sinks
    pub png_len: usize,
    /// Number of opaque pixels in the cut-out
    pub opaque_pixels: usize,
    pub outcomes: Vec<SinkOutcome>,
}

impl ExportReport {
    /// Path of the first local file written, if any.
    pub fn saved_path(&self) -> Option<&Path> {
        self.outcomes.iter().find_map(|o| match &o.result {
            Ok(SinkReceipt::Saved(path)) => Some(path.as_path()),
            _ => None,
        })
    }

    pub fn all_succeeded(&self) -> bool {
        self.outcomes.iter().all(|o| o.result.is_ok())
    }

    pub fn failures(&self) -> impl Iterator<Item = &SegmentError> {
        self.outcomes.iter().filter_map(|o| o.result.as_ref().err())
    }

    /// One-line status text.
    pub fn status_message(&self) -> String {
        let parts: Vec<String> = self
            .outcomes
            .iter()
            .map(|o| match &o.result {
                Ok(receipt) => receipt.to_string(),
                Err(err) => err.status_message(),
            })
            .collect();
        if parts.is_empty() {
            "Exported (no sinks configured)".to_string()
        } else {
            format!("Exported: {}", parts.join("; "))
        }
    }
}
