// SPDX-License-Identifier: MIT
// CPU RGBA resizer built on fast_image_resize (SIMD-accelerated).
// RGBA8 in → RGBA8 out at the size a FitPlan prescribes.

use fast_image_resize as fir;
use fir::images::{TypedImage, TypedImageRef};
use fir::pixels::U8x4;
use fir::{ResizeOptions, Resizer};
use image::RgbaImage;

use crate::error::RasterError;
use crate::presets::{build_plan, FitPlan, Size};

/// Resize `src` to `plan.out`. Identity plans return a copy without resampling.
pub fn resize_rgba(
    resizer: &mut Resizer,
    src: &RgbaImage,
    plan: &FitPlan,
) -> Result<RgbaImage, RasterError> {
    if src.dimensions() != (plan.input.w, plan.input.h) {
        return Err(RasterError::DimensionMismatch {
            expected: (plan.input.w, plan.input.h),
            actual: src.dimensions(),
        });
    }
    if plan.is_identity() {
        return Ok(src.clone());
    }

    let src_view = TypedImageRef::<U8x4>::from_buffer(plan.input.w, plan.input.h, src.as_raw())?;

    let mut dst = vec![0u8; plan.out.pixel_count() * 4];
    {
        let mut dst_image = TypedImage::<U8x4>::from_buffer(plan.out.w, plan.out.h, &mut dst)?;
        let opts = ResizeOptions::new().use_alpha(true);
        resizer.resize_typed::<U8x4>(&src_view, &mut dst_image, &opts)?;
    }

    RgbaImage::from_raw(plan.out.w, plan.out.h, dst).ok_or(RasterError::BufferTooSmall)
}

/// Fit `src` for display with its long side at most `max_long_side`.
pub fn fit_for_display(src: &RgbaImage, max_long_side: u32) -> Result<RgbaImage, RasterError> {
    let plan = build_plan(Size::from(src.dimensions()), max_long_side);
    let mut resizer = Resizer::new();
    resize_rgba(&mut resizer, src, &plan)
}
