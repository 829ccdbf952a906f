// SPDX-License-Identifier: MIT
//! # Overlay Rasterization
//!
//! Turns the selected candidate mask into an RGBA overlay with the displayed image's
//! dimensions. Every render is a pure overwrite: inside pixels get the highlight colour
//! at full opacity, every other pixel becomes `(0, 0, 0, 0)`. Nothing from a previous
//! overlay survives.

use image::RgbaImage;

use crate::error::RasterError;
use crate::mask::SelectedMask;

/// Default highlight colour (opaque blue).
pub const HIGHLIGHT_BLUE: [u8; 4] = [0, 114, 189, 255];

const TRANSPARENT: [u8; 4] = [0, 0, 0, 0];

/// RGBA overlay buffer, same size as the displayed image.
#[derive(Clone, Debug, PartialEq)]
pub struct OverlayBuffer {
    image: RgbaImage,
}

impl OverlayBuffer {
    /// Fully transparent overlay of the given size.
    pub fn transparent(width: u32, height: u32) -> Self {
        Self {
            image: RgbaImage::new(width, height),
        }
    }

    /// Wrap an existing RGBA buffer, e.g. one restored from disk.
    pub fn from_image(image: RgbaImage) -> Self {
        Self { image }
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    /// Number of pixels with non-zero alpha.
    pub fn opaque_pixel_count(&self) -> usize {
        self.image.pixels().filter(|p| p.0[3] != 0).count()
    }

    pub fn is_fully_transparent(&self) -> bool {
        self.image.pixels().all(|p| p.0 == TRANSPARENT)
    }
}

/// Rasterize `mask` into a fresh overlay of `dimensions`, painting inside pixels with `color`.
///
/// The colour's alpha is forced to 255 so that inside pixels are always fully opaque.
pub fn render(
    mask: &SelectedMask<'_>,
    dimensions: (u32, u32),
    color: [u8; 4],
) -> Result<OverlayBuffer, RasterError> {
    if mask.dimensions() != dimensions {
        return Err(RasterError::DimensionMismatch {
            expected: dimensions,
            actual: mask.dimensions(),
        });
    }

    let (width, height) = dimensions;
    let inside = [color[0], color[1], color[2], 255];
    let mut image = RgbaImage::new(width, height);
    for (pixel, rgba) in image.as_mut().chunks_exact_mut(4).enumerate() {
        let value = if mask.is_inside(pixel) { inside } else { TRANSPARENT };
        rgba.copy_from_slice(&value);
    }

    Ok(OverlayBuffer { image })
}

/// Status line for a freshly rendered mask, e.g. `Score: 0.95`.
pub fn score_status(score: f32) -> String {
    format!("Score: {:.2}", score)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mask::{select, MaskCandidateSet, MASK_INSIDE};

    #[test]
    fn test_all_background_is_transparent() {
        let set = MaskCandidateSet::new(4, 3, 3, vec![0; 36], vec![0.2, 0.5, 0.1]).unwrap();
        let overlay = render(&select(&set), (4, 3), HIGHLIGHT_BLUE).unwrap();
        assert!(overlay.is_fully_transparent());
        assert_eq!(overlay.opaque_pixel_count(), 0);
    }

    #[test]
    fn test_uses_chosen_candidate_only() {
        // 2x2, 2 candidates. Candidate 0 covers everything, candidate 1 only pixel 3.
        let labels = vec![
            MASK_INSIDE, 0, //
            MASK_INSIDE, 0, //
            MASK_INSIDE, 0, //
            MASK_INSIDE, MASK_INSIDE,
        ];
        let set = MaskCandidateSet::new(2, 2, 2, labels, vec![0.3, 0.8]).unwrap();
        let overlay = render(&select(&set), (2, 2), [10, 20, 30, 128]).unwrap();

        assert_eq!(overlay.opaque_pixel_count(), 1);
        assert_eq!(overlay.image().get_pixel(1, 1).0, [10, 20, 30, 255]);
        assert_eq!(overlay.image().get_pixel(0, 0).0, [0, 0, 0, 0]);
    }

    #[test]
    fn test_dimension_mismatch() {
        let set = MaskCandidateSet::new(2, 2, 1, vec![0; 4], vec![0.5]).unwrap();
        assert!(matches!(
            render(&select(&set), (3, 2), HIGHLIGHT_BLUE),
            Err(RasterError::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn test_score_status_two_decimals() {
        assert_eq!(score_status(0.95), "Score: 0.95");
        assert_eq!(score_status(0.9149), "Score: 0.91");
        assert_eq!(score_status(1.0), "Score: 1.00");
    }
}
