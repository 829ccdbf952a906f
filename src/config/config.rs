//! # Session Configuration
//!
//! Configuration for a segmentation session: where frames come from, where cut-outs go,
//! which inference service and model to use, and how large the displayed image may be.
//! It is the common interface between the `cutout` binary and the library.
//!
//! ## Configuration Parameters
//!
//! | Parameter | Type | Default | Description |
//! |-----------|------|---------|-------------|
//! | `frame_url` | `String` | `http://127.0.0.1:17860/frame/current.png` | Remote frame source |
//! | `mask_url` | `String` | `http://127.0.0.1:17860/mask` | Remote mask sink |
//! | `inference_url` | `String` | `http://127.0.0.1:17861` | Inference service base URL |
//! | `model` | `String` | `sam-vit-b` | Model id used for embedding |
//! | `export_dir` | `PathBuf` | `cutouts` | Local export directory |
//! | `display_max_side` | `u32` | 1024 | Long-side limit of the displayed image |
//! | `highlight` | `[u8; 4]` | `HIGHLIGHT_BLUE` | Overlay colour for masked pixels |
//! | `upload` | `bool` | `true` | Post cut-outs to the mask sink |
//! | `http_timeout` | `Duration` | 30s | Per-request timeout for all HTTP calls |
//!
//! ## Examples
//!
//! ```rust
//! use point_prompt_cutout::config::config::SessionConfig;
//!
//! let config = SessionConfig::default();
//! assert!(config.validate().is_ok());
//!
//! let config = SessionConfig::new("sam-vit-h", "/tmp/cutouts", 512, false);
//! assert_eq!(config.model, "sam-vit-h");
//! assert!(!config.upload);
//! ```

use std::path::PathBuf;
use std::time::Duration;

use cutout_raster::overlay::HIGHLIGHT_BLUE;
use cutout_raster::presets::DisplayPreset;

use crate::error::SegmentError;

/// Port the editor-side plugin listens on for frame export and mask import.
pub const DEFAULT_BRIDGE_PORT: u16 = 17860;

/// Configuration structure for a segmentation session.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// URL answering `GET` with the current frame as image bytes.
    pub frame_url: String,

    /// URL accepting `POST` of an exported cut-out with an `image/png` body.
    pub mask_url: String,

    /// Base URL of the inference service (`/embed` and `/decode` are appended).
    pub inference_url: String,

    /// Model id sent with every embedding request.
    pub model: String,

    /// Directory local cut-outs are written to. Created on first export.
    pub export_dir: PathBuf,

    /// Long-side limit of the displayed image. Frames are never upscaled.
    pub display_max_side: u32,

    /// RGBA colour painted over masked pixels. Alpha is forced to 255 when rendering.
    pub highlight: [u8; 4],

    /// Whether exports are also posted to `mask_url`.
    pub upload: bool,

    /// Timeout applied to every HTTP request the session makes.
    pub http_timeout: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            frame_url: format!("http://127.0.0.1:{}/frame/current.png", DEFAULT_BRIDGE_PORT),
            mask_url: format!("http://127.0.0.1:{}/mask", DEFAULT_BRIDGE_PORT),
            inference_url: "http://127.0.0.1:17861".to_string(),
            model: "sam-vit-b".to_string(),
            export_dir: PathBuf::from("cutouts"),
            display_max_side: DisplayPreset::Medium.max_long_side(),
            highlight: HIGHLIGHT_BLUE,
            upload: true,
            http_timeout: Duration::from_secs(30),
        }
    }
}

impl SessionConfig {
    /// Creates a configuration with the commonly changed parameters; the rest use defaults.
    pub fn new(
        model: impl Into<String>,
        export_dir: impl Into<PathBuf>,
        display_max_side: u32,
        upload: bool,
    ) -> Self {
        Self {
            model: model.into(),
            export_dir: export_dir.into(),
            display_max_side,
            upload,
            ..Self::default()
        }
    }

    /// Validates the configuration parameters.
    pub fn validate(&self) -> Result<(), String> {
        if self.display_max_side == 0 {
            return Err("Display long side must be greater than 0".to_string());
        }
        if self.model.trim().is_empty() {
            return Err("Model id must not be empty".to_string());
        }
        for (name, url) in [
            ("frame URL", &self.frame_url),
            ("mask URL", &self.mask_url),
            ("inference URL", &self.inference_url),
        ] {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(format!("{} must start with http:// or https://", name));
            }
        }
        if self.http_timeout.is_zero() {
            return Err("HTTP timeout must be greater than 0".to_string());
        }
        if self.export_dir.as_os_str().is_empty() {
            return Err("Export directory must not be empty".to_string());
        }
        Ok(())
    }

    /// Like [`validate`](Self::validate), but as a session error for the binary's error path.
    pub fn check(&self) -> Result<(), SegmentError> {
        self.validate()
            .map_err(|reason| SegmentError::config("session", format!("{:?}", self.model), reason))
    }

    /// Builds the HTTP client shared by the frame source, mask sink, and inference backend.
    pub fn http_client(&self) -> Result<reqwest::Client, SegmentError> {
        reqwest::Client::builder()
            .timeout(self.http_timeout)
            .build()
            .map_err(|e| SegmentError::network("build HTTP client", None, e))
    }
}
