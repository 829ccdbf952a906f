//! # Embedding Cache
//!
//! Holds the precomputed image embedding for the current image. An embedding is produced
//! once per image load and is replaced, never mutated, when the next image arrives.
//!
//! The cache hands out tickets: [`EmbeddingCache::try_begin`] marks the cache busy and
//! returns the current epoch, and [`EmbeddingCache::finish`] only stores a result whose
//! ticket still matches. [`EmbeddingCache::invalidate`] bumps the epoch, so a result
//! that belongs to a previous image is rejected instead of overwriting the new one.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::error::{SegmentError, SegmentResult};

/// Opaque per-image features produced by the inference service.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageEmbedding {
    /// Flattened feature tensor
    pub features: Vec<f32>,
    /// Tensor shape, outermost dimension first
    pub shape: Vec<usize>,
    /// Model id that produced the features
    pub model: String,
    /// Dimensions of the image that was embedded
    pub original_size: (u32, u32),
    /// Dimensions the model resized the image to before embedding
    pub reshaped_size: (u32, u32),
}

impl ImageEmbedding {
    /// Number of feature values the shape describes.
    pub fn expected_len(&self) -> usize {
        self.shape.iter().product()
    }
}

/// Proof that an embedding computation was started for a given epoch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EmbedTicket {
    epoch: u64,
}

impl EmbedTicket {
    pub fn epoch(&self) -> u64 {
        self.epoch
    }
}

/// What happened to a finished embedding computation.
#[derive(Debug)]
pub enum EmbedOutcome {
    /// The embedding is now current
    Stored(Arc<ImageEmbedding>),
    /// The computation failed; the cache holds no embedding
    Failed(SegmentError),
    /// The cache was invalidated while computing; the result was dropped
    Stale,
}

/// Per-image embedding slot with a busy flag and an invalidation epoch.
#[derive(Debug, Default)]
pub struct EmbeddingCache {
    current: Option<Arc<ImageEmbedding>>,
    busy: bool,
    epoch: u64,
}

impl EmbeddingCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark the cache busy. Returns `None` when a computation is already running; the
    /// second request is dropped, not queued.
    pub fn try_begin(&mut self) -> Option<EmbedTicket> {
        if self.busy {
            debug!(epoch = self.epoch, "embedding already in flight, ignoring request");
            return None;
        }
        self.busy = true;
        Some(EmbedTicket { epoch: self.epoch })
    }

    /// Record the result of the computation started with `ticket`.
    pub fn finish(
        &mut self,
        ticket: EmbedTicket,
        result: SegmentResult<ImageEmbedding>,
    ) -> EmbedOutcome {
        if ticket.epoch != self.epoch {
            debug!(
                ticket = ticket.epoch,
                epoch = self.epoch,
                "discarding embedding for a previous image"
            );
            return EmbedOutcome::Stale;
        }
        self.busy = false;
        match result {
            Ok(embedding) => {
                let embedding = Arc::new(embedding);
                self.current = Some(Arc::clone(&embedding));
                EmbedOutcome::Stored(embedding)
            }
            Err(err) => {
                warn!(error = %err, "embedding failed");
                self.current = None;
                EmbedOutcome::Failed(err)
            }
        }
    }

    /// Drop the embedding and any running computation's claim on the cache.
    pub fn invalidate(&mut self) {
        self.epoch += 1;
        self.busy = false;
        self.current = None;
    }

    pub fn current(&self) -> Option<&Arc<ImageEmbedding>> {
        self.current.as_ref()
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }
}
