// SPDX-License-Identifier: MIT
//! # Display Fitting Plans
//!
//! Frames arrive at whatever resolution the editor renders. The client displays them
//! with the long side clamped to a limit, keeping the aspect ratio and never upscaling.
//! The fitted image is what the user clicks on, what the model embeds, and what the
//! cut-out is taken from, so every downstream buffer shares its dimensions.

/// Represents a 2D size with width and height in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Size {
    pub w: u32,
    pub h: u32,
}

impl Size {
    pub fn new(w: u32, h: u32) -> Self {
        Self { w, h }
    }

    pub fn pixel_count(&self) -> usize {
        self.w as usize * self.h as usize
    }
}

impl From<(u32, u32)> for Size {
    fn from((w, h): (u32, u32)) -> Self {
        Self { w, h }
    }
}

/// Computed display fit for one input size.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FitPlan {
    /// Original input dimensions
    pub input: Size,
    /// Long-side limit used for planning
    pub max_long_side: u32,
    /// Final computed output dimensions
    pub out: Size,
}

impl FitPlan {
    /// True when the output equals the input and no resampling is needed.
    pub fn is_identity(&self) -> bool {
        self.input == self.out
    }
}

/// Compute the display size for `input` with its long side clamped to `max_long_side`.
pub fn build_plan(input: Size, max_long_side: u32) -> FitPlan {
    let (w, h) = fit_preserve(input, max_long_side);
    FitPlan {
        input,
        max_long_side,
        out: Size { w, h },
    }
}

/// Clamp the longest side, scale the other proportionally, never upscale.
fn fit_preserve(input: Size, max_long: u32) -> (u32, u32) {
    let (w, h) = (input.w as f64, input.h as f64);
    let long = w.max(h).max(1.0);
    let s = (max_long as f64 / long).min(1.0); // don't upscale
    (
        ((w * s).round() as u32).max(1),
        ((h * s).round() as u32).max(1),
    )
}

/// Display size presets selectable from the command line.
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum DisplayPreset {
    /// Long side clamped to 512px
    Small,
    /// Long side clamped to 1024px, the usual model input resolution
    Medium,
    /// Long side clamped to 2048px
    Large,
    /// Keep the frame's own resolution
    Native,
}

impl DisplayPreset {
    pub fn max_long_side(self) -> u32 {
        match self {
            DisplayPreset::Small => 512,
            DisplayPreset::Medium => 1024,
            DisplayPreset::Large => 2048,
            DisplayPreset::Native => u32::MAX,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_landscape_clamped() {
        let plan = build_plan(Size::new(1920, 1080), 1024);
        assert_eq!(plan.out, Size::new(1024, 576));
        assert!(!plan.is_identity());
    }

    #[test]
    fn test_portrait_clamped() {
        let plan = build_plan(Size::new(1000, 2000), 512);
        assert_eq!(plan.out, Size::new(256, 512));
    }

    #[test]
    fn test_never_upscales() {
        let plan = build_plan(Size::new(320, 240), 1024);
        assert_eq!(plan.out, Size::new(320, 240));
        assert!(plan.is_identity());
        assert!(build_plan(Size::new(320, 240), DisplayPreset::Native.max_long_side()).is_identity());
    }
}
