//! # Point-Prompt Cut-Out Library
//!
//! An interactive point-prompt segmentation client: the user clicks on an image, a
//! segmentation model returns candidate masks conditioned on the clicks, and the client
//! picks, renders, and exports the best one as an RGBA cut-out.
//!
//! ## Architecture
//!
//! The library is organized into several key modules:
//! - `session`: The segmentation session engine and its event loop
//! - `core`: Prompt points, the per-image embedding cache, and the decode scheduler
//! - `inference`: The segmentation model collaborator and its HTTP client
//! - `capture`: Image sources (editor bridge over HTTP, local files)
//! - `processing`: Cut-out export to local files and the editor bridge
//! - `config`: Configuration management and validation
//!
//! Pixel work (mask layout, selection, overlay, cut, resizing) lives in the
//! `cutout-raster` crate.
//!
//! ## Example
//!
//! ```rust,no_run
//! use point_prompt_cutout::{CutoutRequest, cut_out};
//! use point_prompt_cutout::config::config::SessionConfig;
//! use point_prompt_cutout::core::Point;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let request = CutoutRequest {
//!     image: None, // fetch the editor's current frame
//!     points: vec![Point::foreground(0.5, 0.5), Point::background(0.1, 0.1)],
//! };
//! let report = cut_out(SessionConfig::default(), request).await?;
//! println!("{}", report.status_message());
//! # Ok(())
//! # }
//! ```

use std::path::PathBuf;

use tracing::info;

pub mod capture;
pub mod config;
pub mod core;
pub mod error;
pub mod inference;
pub mod processing;
pub mod session;

/// Re-export error types for convenience
pub use error::{
    ErrorSeverity, HasRecoverySuggestion, HasSeverity, SegmentError, SegmentResult,
};
pub use processing::ExportReport;
pub use session::{SegmentationSession, SessionState, UiEvent};

use crate::config::config::SessionConfig;
use crate::core::Point;

/// One non-interactive cut-out: an image and the clicks to apply to it.
#[derive(Debug, Clone, Default)]
pub struct CutoutRequest {
    /// Image file to load. `None` fetches the current frame from the configured frame URL.
    pub image: Option<PathBuf>,
    /// Clicks in order, in normalized image coordinates.
    pub points: Vec<Point>,
}

/// Load an image, apply the requested clicks, and export the resulting cut-out with the
/// HTTP collaborators described by `config`.
pub async fn cut_out(config: SessionConfig, request: CutoutRequest) -> SegmentResult<ExportReport> {
    let mut session = SegmentationSession::builder()
        .with_config(config)
        .with_http_defaults()
        .build()?;
    run_request(&mut session, request).await
}

/// Drive an existing session through a [`CutoutRequest`].
pub async fn run_request(
    session: &mut SegmentationSession,
    request: CutoutRequest,
) -> SegmentResult<ExportReport> {
    match request.image {
        Some(path) => session.load_file(path).await?,
        None => session.load_frame().await?,
    }
    session.settle().await;
    if session.embedding().is_none() {
        return Err(SegmentError::state(
            session.state().to_string(),
            "cut out",
            session.status().to_string(),
        ));
    }

    let rect = session.display_rect();
    for point in &request.points {
        let x = rect.left + point.x * rect.width;
        let y = rect.top + point.y * rect.height;
        session.pointer_down(x, y, point.label.button())?;
    }
    info!(points = request.points.len(), "clicks applied");

    session.export().await
}
