//! # Core Session State
//!
//! The state the segmentation session owns between suspension points: prompt points,
//! the per-image embedding, and the single-flight decode scheduler.

pub mod decode_coordinator;
pub mod embedding_cache;
pub mod point_store;

pub use decode_coordinator::{DecodeCoordinator, DecodePhase, DecodeRequest, DecodeSettle};
pub use embedding_cache::{EmbedOutcome, EmbedTicket, EmbeddingCache, ImageEmbedding};
pub use point_store::{DisplayRect, InteractionMode, Point, PointLabel, PointStore};
