// SPDX-License-Identifier: MIT
//! # cutout-raster: Pixel Work for Point-Prompt Segmentation
//!
//! This crate holds every CPU-side pixel operation of the cut-out client. It has no
//! knowledge of sessions, networking or inference; it only turns buffers into buffers.
//!
//! ## Key Components
//!
//! - [`mask`]: Interleaved multi-candidate mask layout and best-candidate selection
//! - [`overlay`]: Rasterizes the selected mask into an RGBA highlight overlay
//! - [`cut`]: Combines overlay and source image into an alpha cut-out and encodes it as PNG
//! - [`presets`]: Display fitting plans (long-side clamp, aspect preserved, never upscaled)
//! - [`resize`]: SIMD-accelerated RGBA resizing built on fast_image_resize
//!
//! ## Buffer Conventions
//!
//! - All colour buffers are tightly packed RGBA8 (`image::RgbaImage`)
//! - Mask labels are `u8`, one per pixel per candidate, interleaved per pixel
//! - Overlays and cut-outs always share the displayed image's dimensions
//!
//! ## Usage Example
//!
//! ```rust
//! use cutout_raster::mask::{select, MaskCandidateSet, MASK_INSIDE};
//! use cutout_raster::overlay::{render, HIGHLIGHT_BLUE};
//!
//! // 2x1 image, two candidates: candidate 1 covers the right pixel.
//! let labels = vec![0, 0, 0, MASK_INSIDE];
//! let set = MaskCandidateSet::new(2, 1, 2, labels, vec![0.4, 0.9]).unwrap();
//!
//! let selected = select(&set);
//! assert_eq!(selected.index(), 1);
//!
//! let overlay = render(&selected, (2, 1), HIGHLIGHT_BLUE).unwrap();
//! assert_eq!(overlay.image().get_pixel(0, 0).0, [0, 0, 0, 0]);
//! assert_eq!(overlay.image().get_pixel(1, 0).0[3], 255);
//! ```

pub mod cut;
pub mod error;
pub mod mask;
pub mod overlay;
pub mod presets;
pub mod resize;

pub use error::RasterError;
