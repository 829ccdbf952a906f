//! # Segmentation Session
//!
//! Orchestrates one interactive cut-out session: image load, embedding, point interaction,
//! decode, overlay render, and export. All state lives in one [`SegmentationSession`] value
//! and is only touched from the task driving it.
//!
//! ## Architecture
//!
//! ```text
//!  UiEvent ──▶ handle_event ──▶ PointStore ──▶ DecodeCoordinator ──▶ decode slot ─┐
//!                  │                                                             │
//!                  └──▶ load ──▶ EmbeddingCache ──▶ embed slot ──────────────────┤
//!                                                                                ▼
//!                         overlay + status  ◀── select + render ◀── next_completion
//! ```
//!
//! ## Scheduling
//!
//! Inference calls are futures parked in two slots and polled by the session itself, so
//! there is no task spawning and no locking. State changes happen between suspension
//! points only. A decode result carries the decode epoch it was dispatched under; clear,
//! reset, model change, and image load bump the epoch, so a late result can never paint
//! over newer state.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use cutout_raster::cut::{encode_png, extract};
use cutout_raster::mask::{MaskCandidateSet, select};
use cutout_raster::overlay::{OverlayBuffer, render, score_status};
use cutout_raster::resize::fit_for_display;
use futures_util::FutureExt;
use futures_util::future::BoxFuture;
use image::RgbaImage;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

use crate::capture::{FileFrameSource, FrameSource, HttpFrameSource};
use crate::config::config::SessionConfig;
use crate::core::{
    DecodeCoordinator, DecodeRequest, DecodeSettle, DisplayRect, EmbedOutcome, EmbedTicket,
    EmbeddingCache, ImageEmbedding, Point, PointLabel, PointStore,
};
use crate::error::{ErrorSeverity, HasSeverity, SegmentError, SegmentResult};
use crate::inference::{HttpInferenceBackend, InferenceBackend};
use crate::processing::{ExportMultiplexer, ExportReport, HttpMaskSink, LocalFileSink, MaskSink};

/// Coarse session lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No image loaded
    Idle,
    /// Image loaded, embedding in progress
    Loading,
    /// Image loaded, embedding finished (successfully or not)
    Ready,
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            SessionState::Idle => "idle",
            SessionState::Loading => "loading",
            SessionState::Ready => "ready",
        };
        f.write_str(name)
    }
}

/// Input from the UI surface.
#[derive(Debug)]
pub enum UiEvent {
    /// Fetch the current frame from the configured frame source
    LoadFrame,
    /// Load an image file from disk
    LoadFile(PathBuf),
    /// Load an already decoded image
    LoadImage(RgbaImage),
    /// The image was re-laid out on screen
    SetDisplayRect(DisplayRect),
    /// Pointer pressed at screen coordinates with a button id
    PointerDown { x: f32, y: f32, button: u8 },
    /// Pointer moved to screen coordinates
    PointerMove { x: f32, y: f32 },
    ClearPoints,
    ResetImage,
    Export,
    SelectModel(String),
}

struct InFlight<K, T> {
    key: K,
    future: BoxFuture<'static, Result<T>>,
}

enum Completion {
    Embedded {
        ticket: EmbedTicket,
        result: Result<ImageEmbedding>,
    },
    Decoded {
        epoch: u64,
        result: Result<MaskCandidateSet>,
    },
}

/// Await the future parked in `slot` and empty the slot. Pends forever on an empty slot.
///
/// Dropping this future before it resolves leaves the parked future in place.
async fn poll_slot<K: Copy, T>(slot: &mut Option<InFlight<K, T>>) -> (K, Result<T>) {
    match slot.as_mut() {
        Some(in_flight) => {
            let key = in_flight.key;
            let result = in_flight.future.as_mut().await;
            *slot = None;
            (key, result)
        }
        None => std::future::pending().await,
    }
}

/// One interactive segmentation session.
pub struct SegmentationSession {
    config: SessionConfig,
    backend: Arc<dyn InferenceBackend>,
    frame_source: Option<Arc<dyn FrameSource>>,
    exporter: ExportMultiplexer,

    state: SessionState,
    image: Option<Arc<RgbaImage>>,
    display_rect: DisplayRect,
    points: PointStore,
    embeddings: EmbeddingCache,
    coordinator: DecodeCoordinator,
    decode_epoch: u64,
    overlay: Option<OverlayBuffer>,
    last_score: Option<f32>,
    status: String,
    last_export: Option<ExportReport>,

    embed_slot: Option<InFlight<EmbedTicket, ImageEmbedding>>,
    decode_slot: Option<InFlight<u64, MaskCandidateSet>>,
}

impl SegmentationSession {
    /// Create a new session using the builder pattern.
    pub fn builder() -> SessionBuilder {
        SessionBuilder::new()
    }

    /// Drive the session from a stream of UI events.
    ///
    /// Events and inference completions are handled in arrival order. Returns once the
    /// channel is closed and no inference call is outstanding.
    pub async fn run(&mut self, mut events: mpsc::Receiver<UiEvent>) {
        info!(model = %self.config.model, "segmentation session started");
        let mut open = true;
        loop {
            if !open && self.is_drained() {
                break;
            }
            tokio::select! {
                event = events.recv(), if open => match event {
                    Some(event) => self.handle_event(event).await,
                    None => {
                        debug!("event channel closed, draining");
                        open = false;
                    }
                },
                completion = Self::next_completion(&mut self.embed_slot, &mut self.decode_slot) => {
                    self.apply_completion(completion);
                }
            }
        }
        info!("segmentation session finished");
    }

    /// Apply one UI event. Failures become the status message; none are returned.
    pub async fn handle_event(&mut self, event: UiEvent) {
        let outcome = match event {
            UiEvent::LoadFrame => self.load_frame().await,
            UiEvent::LoadFile(path) => self.load_file(path).await,
            UiEvent::LoadImage(image) => self.load_rgba(image),
            UiEvent::SetDisplayRect(rect) => {
                self.set_display_rect(rect);
                Ok(())
            }
            UiEvent::PointerDown { x, y, button } => self.pointer_down(x, y, button).map(|_| ()),
            UiEvent::PointerMove { x, y } => self.pointer_move(x, y).map(|_| ()),
            UiEvent::ClearPoints => {
                self.clear_points();
                Ok(())
            }
            UiEvent::ResetImage => {
                self.reset_image();
                Ok(())
            }
            UiEvent::Export => self.export().await.map(|report| {
                self.last_export = Some(report);
            }),
            UiEvent::SelectModel(model) => self.select_model(model).map(|_| ()),
        };
        if let Err(err) = outcome {
            self.report(&err);
        }
    }

    /// Drive in-flight work until both the embed and decode slots are empty.
    pub async fn settle(&mut self) {
        while !self.is_drained() {
            let completion = Self::next_completion(&mut self.embed_slot, &mut self.decode_slot).await;
            self.apply_completion(completion);
        }
    }

    /// True when no inference call is outstanding.
    pub fn is_drained(&self) -> bool {
        self.embed_slot.is_none() && self.decode_slot.is_none()
    }

    async fn next_completion(
        embed_slot: &mut Option<InFlight<EmbedTicket, ImageEmbedding>>,
        decode_slot: &mut Option<InFlight<u64, MaskCandidateSet>>,
    ) -> Completion {
        tokio::select! {
            (ticket, result) = poll_slot(embed_slot) => Completion::Embedded { ticket, result },
            (epoch, result) = poll_slot(decode_slot) => Completion::Decoded { epoch, result },
        }
    }

    fn apply_completion(&mut self, completion: Completion) {
        match completion {
            Completion::Embedded { ticket, result } => self.finish_embedding(ticket, result),
            Completion::Decoded { epoch, result } => self.finish_decode(epoch, result),
        }
    }

    // ----- image lifecycle -----

    /// Fetch the current frame from the configured frame source.
    pub async fn load_frame(&mut self) -> SegmentResult<()> {
        let source = self.frame_source.clone().ok_or_else(|| {
            SegmentError::state(self.state.to_string(), "load frame", "no frame source configured")
        })?;
        self.load_from(source.as_ref()).await
    }

    /// Load an image file from disk.
    pub async fn load_file(&mut self, path: impl Into<PathBuf>) -> SegmentResult<()> {
        let source = FileFrameSource::new(path);
        self.load_from(&source).await
    }

    /// Fetch an image from `source` and make it the session image.
    ///
    /// On failure the session is left exactly as it was.
    pub async fn load_from(&mut self, source: &dyn FrameSource) -> SegmentResult<()> {
        let origin = source.describe();
        info!(source = %origin, "loading image");
        let image = source.fetch_frame().await.map_err(|e| {
            SegmentError::load(origin.clone(), format!("{:#}", e)).with_operation("load image")
        })?;
        self.load_rgba(image)
    }

    /// Make `image` the session image: fit it for display, tear down all per-image state,
    /// and start the embedding.
    pub fn load_rgba(&mut self, image: RgbaImage) -> SegmentResult<()> {
        let original = image.dimensions();
        let fitted = fit_for_display(&image, self.config.display_max_side)
            .map_err(|e| SegmentError::raster("fit image for display", e))?;
        let dimensions = fitted.dimensions();

        self.discard_image_state();
        self.image = Some(Arc::new(fitted));
        self.display_rect = DisplayRect::full(dimensions);
        info!(?original, displayed = ?dimensions, "image loaded");

        self.start_embedding();
        Ok(())
    }

    /// Drop the image, embedding, points, and overlay.
    pub fn reset_image(&mut self) {
        self.discard_image_state();
        self.image = None;
        self.display_rect = DisplayRect::full((0, 0));
        self.state = SessionState::Idle;
        self.status = "Load an image to begin".to_string();
        info!("image reset");
    }

    /// Switch the embedding model. With an image loaded, the embedding is recomputed and
    /// per-image state is torn down. Returns `false` when `model` is already selected.
    pub fn select_model(&mut self, model: impl Into<String>) -> SegmentResult<bool> {
        let model = model.into();
        if model.trim().is_empty() {
            return Err(SegmentError::config("model", model, "model id must not be empty"));
        }
        if model == self.config.model {
            return Ok(false);
        }
        info!(from = %self.config.model, to = %model, "model changed");
        self.config.model = model;
        if self.image.is_some() {
            self.discard_image_state();
            self.start_embedding();
        }
        Ok(true)
    }

    fn discard_image_state(&mut self) {
        self.decode_epoch += 1;
        self.coordinator.discard_pending();
        self.points.clear();
        self.overlay = None;
        self.last_score = None;
        self.embeddings.invalidate();
        self.embed_slot = None;
    }

    fn start_embedding(&mut self) {
        let Some(image) = self.image.clone() else {
            return;
        };
        let Some(ticket) = self.embeddings.try_begin() else {
            return;
        };
        let backend = Arc::clone(&self.backend);
        let model = self.config.model.clone();
        debug!(model = %model, epoch = ticket.epoch(), "embedding dispatched");
        self.embed_slot = Some(InFlight {
            key: ticket,
            future: async move { backend.embed(&model, &image).await }.boxed(),
        });
        self.state = SessionState::Loading;
        self.status = "Computing image embedding...".to_string();
    }

    fn finish_embedding(&mut self, ticket: EmbedTicket, result: Result<ImageEmbedding>) {
        let model = self.config.model.clone();
        let result = result.map_err(|e| {
            SegmentError::embedding(model, format!("{:#}", e))
                .with_recovery_suggestion("reload the image or pick another model")
        });
        match self.embeddings.finish(ticket, result) {
            EmbedOutcome::Stored(embedding) => {
                self.state = SessionState::Ready;
                self.status = "Ready: hover or click to segment".to_string();
                info!(model = %embedding.model, shape = ?embedding.shape, "embedding ready");
            }
            EmbedOutcome::Failed(err) => {
                self.state = SessionState::Ready;
                self.report(&err);
            }
            EmbedOutcome::Stale => {}
        }
    }

    // ----- point interaction -----

    /// Pointer pressed. Left adds a foreground point, right a background point.
    ///
    /// Returns `Ok(false)` when the event was ignored: no embedding, an unmapped button,
    /// or a position outside the displayed image.
    pub fn pointer_down(&mut self, x: f32, y: f32, button: u8) -> SegmentResult<bool> {
        if self.current_embedding().is_none() {
            return Ok(false);
        }
        let Some(label) = PointLabel::from_button(button) else {
            return Ok(false);
        };
        let Some((nx, ny)) = self.display_rect.normalize(x, y) else {
            return Ok(false);
        };
        self.points.add_point(Point::new(nx, ny, label));
        debug!(x = nx, y = ny, ?label, count = self.points.len(), "point added");
        self.request_decode()?;
        Ok(true)
    }

    /// Pointer moved. In hover mode the point list follows the cursor.
    pub fn pointer_move(&mut self, x: f32, y: f32) -> SegmentResult<bool> {
        if self.current_embedding().is_none() {
            return Ok(false);
        }
        let Some((nx, ny)) = self.display_rect.normalize(x, y) else {
            return Ok(false);
        };
        if !self.points.hover(nx, ny) {
            return Ok(false);
        }
        self.request_decode()?;
        Ok(true)
    }

    /// Empty the point list, blank the overlay, and return to hover mode.
    pub fn clear_points(&mut self) {
        self.points.clear();
        self.coordinator.discard_pending();
        self.decode_epoch += 1;
        self.overlay = None;
        self.last_score = None;
        if self.state == SessionState::Ready {
            self.status = "Points cleared".to_string();
        }
        debug!("points cleared");
    }

    // ----- decode -----

    /// Ask for a decode of the current points.
    ///
    /// Refused without an embedding or without points. While a decode runs, the request
    /// is folded into a single rerun that reads the points when it is dispatched.
    pub fn request_decode(&mut self) -> SegmentResult<DecodeRequest> {
        let Some(embedding) = self.current_embedding().cloned() else {
            return Err(SegmentError::state(
                self.state.to_string(),
                "decode",
                "no image embedding is available",
            ));
        };
        if self.points.is_empty() {
            return Err(SegmentError::state(
                self.state.to_string(),
                "decode",
                "there are no points",
            ));
        }

        let request = self.coordinator.request();
        if request == DecodeRequest::Dispatch {
            let points = self.points.points().to_vec();
            let backend = Arc::clone(&self.backend);
            let epoch = self.decode_epoch;
            debug!(epoch, points = points.len(), "decode dispatched");
            self.decode_slot = Some(InFlight {
                key: epoch,
                future: async move { backend.decode(&embedding, &points).await }.boxed(),
            });
        }
        Ok(request)
    }

    fn finish_decode(&mut self, epoch: u64, result: Result<MaskCandidateSet>) {
        let settle = self.coordinator.complete();

        if epoch != self.decode_epoch {
            debug!(epoch, current = self.decode_epoch, "stale decode result discarded");
        } else {
            let applied = result
                .map_err(|e| {
                    SegmentError::decode(format!("{:#}", e))
                        .with_recovery_suggestion("move or click again to retry")
                })
                .and_then(|masks| self.apply_masks(&masks));
            if let Err(err) = applied {
                self.report(&err);
            }
        }

        if settle == DecodeSettle::Rerun {
            if let Err(err) = self.request_decode() {
                debug!(error = %err, "pending rerun dropped");
            }
        }
    }

    fn apply_masks(&mut self, masks: &MaskCandidateSet) -> SegmentResult<()> {
        let Some(image) = self.image.as_ref() else {
            return Ok(());
        };
        let selected = select(masks);
        let overlay = render(&selected, image.dimensions(), self.config.highlight)
            .map_err(|e| SegmentError::raster("render overlay", e))?;
        debug!(
            index = selected.index(),
            score = selected.score(),
            opaque = overlay.opaque_pixel_count(),
            "mask rendered"
        );
        self.last_score = Some(selected.score());
        self.status = score_status(selected.score());
        self.overlay = Some(overlay);
        Ok(())
    }

    // ----- export -----

    /// Cut the masked pixels out of the displayed image and deliver the PNG to every sink.
    ///
    /// Waits for outstanding inference first, so the cut matches the latest points.
    /// Sink failures are reported per sink in the returned report, not as an error.
    pub async fn export(&mut self) -> SegmentResult<ExportReport> {
        if !self.points.export_enabled() {
            return Err(SegmentError::state(
                self.state.to_string(),
                "export",
                "add at least one point first",
            ));
        }
        self.settle().await;

        let (Some(image), Some(overlay)) = (self.image.as_ref(), self.overlay.as_ref()) else {
            return Err(SegmentError::export("cut-out", "no mask has been decoded yet"));
        };
        let cut = extract(overlay, image).map_err(|e| SegmentError::raster("extract cut-out", e))?;
        let png = encode_png(&cut).map_err(|e| SegmentError::raster("encode cut-out", e))?;
        let opaque_pixels = overlay.opaque_pixel_count();
        let dimensions = cut.dimensions();

        info!(
            width = dimensions.0,
            height = dimensions.1,
            bytes = png.len(),
            sinks = self.exporter.sink_count(),
            "exporting cut-out"
        );
        let outcomes = self.exporter.deliver(&png).await;
        let report = ExportReport {
            dimensions,
            png_len: png.len(),
            opaque_pixels,
            outcomes,
        };
        self.status = report.status_message();
        Ok(report)
    }

    // ----- status and accessors -----

    fn report(&mut self, err: &SegmentError) {
        match err.severity() {
            ErrorSeverity::Info => info!(category = err.category(), "{}", err),
            ErrorSeverity::Warning => warn!(category = err.category(), "{}", err),
            ErrorSeverity::Error | ErrorSeverity::Critical => {
                error!(category = err.category(), "{}", err)
            }
        }
        self.status = err.status_message();
    }

    fn current_embedding(&self) -> Option<&Arc<ImageEmbedding>> {
        if self.state == SessionState::Ready {
            self.embeddings.current()
        } else {
            None
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    /// One-line user-visible status text.
    pub fn status(&self) -> &str {
        &self.status
    }

    /// The displayed (fitted) image.
    pub fn image(&self) -> Option<&RgbaImage> {
        self.image.as_deref()
    }

    pub fn embedding(&self) -> Option<&ImageEmbedding> {
        self.embeddings.current().map(|e| e.as_ref())
    }

    pub fn overlay(&self) -> Option<&OverlayBuffer> {
        self.overlay.as_ref()
    }

    pub fn last_score(&self) -> Option<f32> {
        self.last_score
    }

    pub fn points(&self) -> &PointStore {
        &self.points
    }

    pub fn export_enabled(&self) -> bool {
        self.points.export_enabled()
    }

    pub fn coordinator(&self) -> &DecodeCoordinator {
        &self.coordinator
    }

    pub fn decode_epoch(&self) -> u64 {
        self.decode_epoch
    }

    pub fn display_rect(&self) -> DisplayRect {
        self.display_rect
    }

    /// Replace the on-screen rectangle pointer positions are normalized against.
    pub fn set_display_rect(&mut self, rect: DisplayRect) {
        self.display_rect = rect;
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Report of the last export triggered through [`UiEvent::Export`].
    pub fn last_export(&self) -> Option<&ExportReport> {
        self.last_export.as_ref()
    }
}

/// Builder for creating segmentation sessions with a fluent API.
pub struct SessionBuilder {
    config: SessionConfig,
    backend: Option<Arc<dyn InferenceBackend>>,
    frame_source: Option<Arc<dyn FrameSource>>,
    sinks: Vec<Box<dyn MaskSink>>,
    http_defaults: bool,
}

impl SessionBuilder {
    pub fn new() -> Self {
        Self {
            config: SessionConfig::default(),
            backend: None,
            frame_source: None,
            sinks: Vec::new(),
            http_defaults: false,
        }
    }

    pub fn with_config(mut self, config: SessionConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_backend<B: InferenceBackend + 'static>(mut self, backend: B) -> Self {
        self.backend = Some(Arc::new(backend));
        self
    }

    pub fn with_frame_source<S: FrameSource + 'static>(mut self, source: S) -> Self {
        self.frame_source = Some(Arc::new(source));
        self
    }

    pub fn with_sink<S: MaskSink + 'static>(mut self, sink: S) -> Self {
        self.sinks.push(Box::new(sink));
        self
    }

    /// Fill in whatever is missing from the configuration: the HTTP inference backend,
    /// the HTTP frame source, the local export directory, and (if enabled) the mask upload.
    pub fn with_http_defaults(mut self) -> Self {
        self.http_defaults = true;
        self
    }

    /// Build the session with the configured components.
    pub fn build(mut self) -> SegmentResult<SegmentationSession> {
        self.config.check()?;

        if self.http_defaults {
            let client = self.config.http_client()?;
            if self.backend.is_none() {
                self.backend = Some(Arc::new(HttpInferenceBackend::new(
                    client.clone(),
                    self.config.inference_url.clone(),
                )));
            }
            if self.frame_source.is_none() {
                self.frame_source = Some(Arc::new(HttpFrameSource::new(
                    client.clone(),
                    self.config.frame_url.clone(),
                )));
            }
            if self.sinks.is_empty() {
                self.sinks
                    .push(Box::new(LocalFileSink::new(self.config.export_dir.clone())));
                if self.config.upload {
                    self.sinks.push(Box::new(HttpMaskSink::new(
                        client,
                        self.config.mask_url.clone(),
                    )));
                }
            }
        }

        let backend = self.backend.ok_or_else(|| {
            SegmentError::config("backend", "none", "an inference backend is required")
        })?;
        let mut exporter = ExportMultiplexer::new();
        for sink in self.sinks {
            exporter.push(sink);
        }

        Ok(SegmentationSession {
            config: self.config,
            backend,
            frame_source: self.frame_source,
            exporter,
            state: SessionState::Idle,
            image: None,
            display_rect: DisplayRect::full((0, 0)),
            points: PointStore::new(),
            embeddings: EmbeddingCache::new(),
            coordinator: DecodeCoordinator::new(),
            decode_epoch: 0,
            overlay: None,
            last_score: None,
            status: "Load an image to begin".to_string(),
            last_export: None,
            embed_slot: None,
            decode_slot: None,
        })
    }
}

impl Default for SessionBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use cutout_raster::overlay::HIGHLIGHT_BLUE;
    use image::Rgba;

    /// Backend whose masks mark every pixel inside for candidate 0.
    struct FlatBackend;

    #[async_trait]
    impl InferenceBackend for FlatBackend {
        async fn embed(&self, model: &str, image: &RgbaImage) -> Result<ImageEmbedding> {
            Ok(ImageEmbedding {
                features: vec![1.0],
                shape: vec![1],
                model: model.to_string(),
                original_size: image.dimensions(),
                reshaped_size: image.dimensions(),
            })
        }

        async fn decode(
            &self,
            embedding: &ImageEmbedding,
            _points: &[Point],
        ) -> Result<MaskCandidateSet> {
            let (w, h) = embedding.original_size;
            let labels = vec![1u8; (w * h) as usize];
            Ok(MaskCandidateSet::new(w, h, 1, labels, vec![0.5])?)
        }
    }

    fn session() -> SegmentationSession {
        SegmentationSession::builder()
            .with_backend(FlatBackend)
            .build()
            .unwrap()
    }

    #[test]
    fn test_build_requires_backend() {
        let err = SegmentationSession::builder().build().err().unwrap();
        assert_eq!(err.category(), "config");
    }

    #[tokio::test]
    async fn test_load_embed_hover_renders_overlay() {
        let mut s = session();
        assert_eq!(s.state(), SessionState::Idle);

        s.load_rgba(RgbaImage::from_pixel(4, 2, Rgba([5, 5, 5, 255])))
            .unwrap();
        assert_eq!(s.state(), SessionState::Loading);
        assert!(!s.pointer_move(1.0, 1.0).unwrap());

        s.settle().await;
        assert_eq!(s.state(), SessionState::Ready);
        assert!(s.pointer_move(1.0, 1.0).unwrap());
        s.settle().await;

        let overlay = s.overlay().unwrap();
        assert_eq!(overlay.opaque_pixel_count(), 8);
        assert_eq!(overlay.image().get_pixel(0, 0).0, HIGHLIGHT_BLUE);
        assert_eq!(s.status(), "Score: 0.50");
    }

    #[tokio::test]
    async fn test_reset_returns_to_idle() {
        let mut s = session();
        s.load_rgba(RgbaImage::new(2, 2)).unwrap();
        s.settle().await;
        s.pointer_down(0.5, 0.5, 0).unwrap();
        s.settle().await;

        s.reset_image();
        assert_eq!(s.state(), SessionState::Idle);
        assert!(s.image().is_none());
        assert!(s.embedding().is_none());
        assert!(s.overlay().is_none());
        assert!(s.points().is_empty());
    }

    #[tokio::test]
    async fn test_same_model_is_noop() {
        let mut s = session();
        let model = s.config().model.clone();
        assert!(!s.select_model(model).unwrap());
        assert!(s.select_model("").is_err());
        assert!(s.select_model("other").unwrap());
        assert_eq!(s.config().model, "other");
        assert_eq!(s.state(), SessionState::Idle);
    }
}
