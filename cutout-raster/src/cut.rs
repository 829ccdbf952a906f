// SPDX-License-Identifier: MIT
//! # Alpha Cut-Out Extraction
//!
//! Combines the current overlay with the displayed source image. The overlay already
//! carries the final alpha channel; extraction only swaps in the source colour wherever
//! that alpha is non-zero. Pixels with zero alpha keep whatever the overlay held, which
//! after a render is always `(0, 0, 0, 0)`.

use std::io::Cursor;

use image::{ImageFormat, RgbaImage};

use crate::error::RasterError;
use crate::overlay::OverlayBuffer;

/// Build the RGBA cut-out for `overlay` over `source`. Both must share dimensions.
pub fn extract(overlay: &OverlayBuffer, source: &RgbaImage) -> Result<RgbaImage, RasterError> {
    if overlay.dimensions() != source.dimensions() {
        return Err(RasterError::DimensionMismatch {
            expected: overlay.dimensions(),
            actual: source.dimensions(),
        });
    }

    let mut out = overlay.image().clone();
    for (dst, src) in out
        .as_mut()
        .chunks_exact_mut(4)
        .zip(source.as_raw().chunks_exact(4))
    {
        if dst[3] != 0 {
            dst[..3].copy_from_slice(&src[..3]);
        }
    }
    Ok(out)
}

/// Encode an RGBA buffer as a standalone PNG.
pub fn encode_png(image: &RgbaImage) -> Result<Vec<u8>, RasterError> {
    let mut bytes = Cursor::new(Vec::new());
    image.write_to(&mut bytes, ImageFormat::Png)?;
    Ok(bytes.into_inner())
}
