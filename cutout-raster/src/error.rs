// SPDX-License-Identifier: MIT
// Error type shared by every raster operation.

use fast_image_resize as fir;

#[derive(Debug)]
pub enum RasterError {
    /// Two buffers that must line up pixel-for-pixel do not.
    DimensionMismatch { expected: (u32, u32), actual: (u32, u32) },
    /// The label buffer does not hold `width * height * candidates` entries.
    LabelCount { expected: usize, actual: usize },
    /// `width * height * candidates` does not fit in `usize`.
    ShapeOverflow { width: u32, height: u32, num_candidates: usize },
    /// Score count differs from the candidate count.
    ScoreCount { expected: usize, actual: usize },
    /// A candidate set must contain at least one candidate.
    NoCandidates,
    /// Raw RGBA buffer length does not match its declared size.
    BufferTooSmall,
    Fir(fir::ResizeError),
    ImageBuf(fir::ImageBufferError),
    Encode(image::ImageError),
}

impl From<fir::ResizeError> for RasterError { fn from(e: fir::ResizeError) -> Self { Self::Fir(e) } }
impl From<fir::ImageBufferError> for RasterError { fn from(e: fir::ImageBufferError) -> Self { Self::ImageBuf(e) } }
impl From<image::ImageError> for RasterError { fn from(e: image::ImageError) -> Self { Self::Encode(e) } }

impl std::fmt::Display for RasterError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RasterError::DimensionMismatch { expected, actual } => write!(
                f,
                "Buffer dimensions {}x{} do not match expected {}x{}",
                actual.0, actual.1, expected.0, expected.1
            ),
            RasterError::LabelCount { expected, actual } => {
                write!(f, "Mask holds {} labels, expected {}", actual, expected)
            }
            RasterError::ShapeOverflow { width, height, num_candidates } => write!(
                f,
                "Mask shape {}x{} with {} candidates is too large",
                width, height, num_candidates
            ),
            RasterError::ScoreCount { expected, actual } => {
                write!(f, "Mask set holds {} scores, expected {}", actual, expected)
            }
            RasterError::NoCandidates => write!(f, "Mask set contains no candidates"),
            RasterError::BufferTooSmall => write!(f, "RGBA buffer too small for declared size"),
            RasterError::Fir(e) => write!(f, "Fast image resize error: {}", e),
            RasterError::ImageBuf(e) => write!(f, "Image buffer error: {}", e),
            RasterError::Encode(e) => write!(f, "Image encode error: {}", e),
        }
    }
}

impl std::error::Error for RasterError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RasterError::Fir(e) => Some(e),
            RasterError::ImageBuf(e) => Some(e),
            RasterError::Encode(e) => Some(e),
            _ => None,
        }
    }
}
