// SPDX-License-Identifier: MIT
//! # Mask Candidates and Selection
//!
//! A decode call proposes a small, fixed number of candidate masks for the same image.
//! The model ships them as one label buffer where the candidates are interleaved per
//! pixel:
//!
//! ```text
//! pixel 0            pixel 1            pixel 2
//! [c0, c1, c2]       [c0, c1, c2]       [c0, c1, c2]   ...
//! index = num_candidates * pixel_index + candidate_index
//! ```
//!
//! All reads go through [`InterleavedLayout`] so that a change in candidate count can
//! never shift the indexing by one.
//!
//! Selection is a plain linear scan over the per-candidate quality scores: the strictly
//! greatest score wins, and ties keep the lowest index.

use crate::error::RasterError;

/// Label value marking a pixel as inside the mask. Any other value is outside.
pub const MASK_INSIDE: u8 = 1;

/// Index arithmetic for per-pixel interleaved candidate labels.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct InterleavedLayout {
    num_candidates: usize,
}

impl InterleavedLayout {
    pub fn new(num_candidates: usize) -> Self {
        Self { num_candidates }
    }

    pub fn num_candidates(&self) -> usize {
        self.num_candidates
    }

    /// Position of `candidate`'s label for `pixel` in the flat buffer.
    #[inline]
    pub fn index(&self, pixel: usize, candidate: usize) -> usize {
        debug_assert!(candidate < self.num_candidates);
        self.num_candidates * pixel + candidate
    }

    /// Total label count for a `width` x `height` image, `None` if it overflows `usize`.
    pub fn len_for(&self, width: u32, height: u32) -> Option<usize> {
        (width as usize)
            .checked_mul(height as usize)?
            .checked_mul(self.num_candidates)
    }
}

/// Every candidate mask produced by one decode call, with its quality score.
#[derive(Clone, Debug, PartialEq)]
pub struct MaskCandidateSet {
    width: u32,
    height: u32,
    layout: InterleavedLayout,
    labels: Vec<u8>,
    scores: Vec<f32>,
}

impl MaskCandidateSet {
    /// Build a set, checking that labels and scores agree with the declared shape.
    pub fn new(
        width: u32,
        height: u32,
        num_candidates: usize,
        labels: Vec<u8>,
        scores: Vec<f32>,
    ) -> Result<Self, RasterError> {
        if num_candidates == 0 {
            return Err(RasterError::NoCandidates);
        }
        let layout = InterleavedLayout::new(num_candidates);
        let expected = layout
            .len_for(width, height)
            .ok_or(RasterError::ShapeOverflow {
                width,
                height,
                num_candidates,
            })?;
        if labels.len() != expected {
            return Err(RasterError::LabelCount {
                expected,
                actual: labels.len(),
            });
        }
        if scores.len() != num_candidates {
            return Err(RasterError::ScoreCount {
                expected: num_candidates,
                actual: scores.len(),
            });
        }
        Ok(Self {
            width,
            height,
            layout,
            labels,
            scores,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn num_candidates(&self) -> usize {
        self.layout.num_candidates()
    }

    pub fn layout(&self) -> InterleavedLayout {
        self.layout
    }

    pub fn scores(&self) -> &[f32] {
        &self.scores
    }

    /// Label of `candidate` at `pixel` (row-major pixel index).
    #[inline]
    pub fn label(&self, pixel: usize, candidate: usize) -> u8 {
        self.labels[self.layout.index(pixel, candidate)]
    }

    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }
}

/// The winning candidate of a [`MaskCandidateSet`]. Borrowed, recomputed every decode.
#[derive(Clone, Copy, Debug)]
pub struct SelectedMask<'a> {
    set: &'a MaskCandidateSet,
    index: usize,
}

impl<'a> SelectedMask<'a> {
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn score(&self) -> f32 {
        self.set.scores[self.index]
    }

    pub fn dimensions(&self) -> (u32, u32) {
        self.set.dimensions()
    }

    /// True if `pixel` lies inside the chosen candidate.
    #[inline]
    pub fn is_inside(&self, pixel: usize) -> bool {
        self.set.label(pixel, self.index) == MASK_INSIDE
    }
}

/// Pick the candidate with the strictly greatest score; ties keep the first one.
pub fn select(candidates: &MaskCandidateSet) -> SelectedMask<'_> {
    let mut best = 0;
    for (index, score) in candidates.scores.iter().enumerate().skip(1) {
        if *score > candidates.scores[best] {
            best = index;
        }
    }
    SelectedMask {
        set: candidates,
        index: best,
    }
}
