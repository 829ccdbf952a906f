//! # Point Prompts
//!
//! The ordered list of positive/negative prompt points for the current image, and the
//! interaction mode that decides how pointer input edits it.
//!
//! ## Interaction Modes
//!
//! ```text
//!            first click                      clear / image reset
//!   Hover ──────────────────▶ MultiPoint ──────────────────────────▶ Hover
//!     │                          │
//!     │ pointer-move:            │ click: append (left = fg, right = bg)
//!     │ list = [fg @ cursor]     │ pointer-move: ignored
//! ```
//!
//! Coordinates are normalized to the displayed image's bounding box, so a point is valid
//! for the image regardless of how the UI scales it on screen.

use std::str::FromStr;

/// Pointer button id for the primary (left) button.
pub const BUTTON_PRIMARY: u8 = 0;
/// Pointer button id for the secondary (right) button.
pub const BUTTON_SECONDARY: u8 = 2;

/// Foreground/background label carried by every prompt point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PointLabel {
    /// Label 0: exclude this location from the mask
    Background,
    /// Label 1: include this location in the mask
    Foreground,
}

impl PointLabel {
    /// Numeric label as the model expects it.
    pub fn as_u8(self) -> u8 {
        match self {
            PointLabel::Background => 0,
            PointLabel::Foreground => 1,
        }
    }

    /// Pointer button that produces this label.
    pub fn button(self) -> u8 {
        match self {
            PointLabel::Background => BUTTON_SECONDARY,
            PointLabel::Foreground => BUTTON_PRIMARY,
        }
    }

    /// Map a pointer button to a label. Buttons other than primary and secondary have none.
    pub fn from_button(button: u8) -> Option<Self> {
        match button {
            BUTTON_PRIMARY => Some(PointLabel::Foreground),
            BUTTON_SECONDARY => Some(PointLabel::Background),
            _ => None,
        }
    }
}

/// A prompt point in normalized image coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
    pub label: PointLabel,
}

impl Point {
    /// Create a point, clamping both coordinates into `[0, 1]`.
    pub fn new(x: f32, y: f32, label: PointLabel) -> Self {
        Self {
            x: x.clamp(0.0, 1.0),
            y: y.clamp(0.0, 1.0),
            label,
        }
    }

    pub fn foreground(x: f32, y: f32) -> Self {
        Self::new(x, y, PointLabel::Foreground)
    }

    pub fn background(x: f32, y: f32) -> Self {
        Self::new(x, y, PointLabel::Background)
    }

    /// Position in pixel space of an image with the given dimensions.
    pub fn to_pixels(&self, (width, height): (u32, u32)) -> (f32, f32) {
        (self.x * width as f32, self.y * height as f32)
    }
}

impl FromStr for Point {
    type Err = String;

    /// Parse `x,y` or `x,y,fg|bg` with normalized coordinates. A bare point is foreground.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split(',').map(str::trim).collect();
        let (x, y, label) = match parts.as_slice() {
            [x, y] => (*x, *y, PointLabel::Foreground),
            [x, y, label] => {
                let label = match label.to_ascii_lowercase().as_str() {
                    "fg" | "1" => PointLabel::Foreground,
                    "bg" | "0" => PointLabel::Background,
                    other => return Err(format!("unknown point label '{}', use fg or bg", other)),
                };
                (*x, *y, label)
            }
            _ => return Err(format!("expected x,y[,fg|bg], got '{}'", s)),
        };
        let x: f32 = x.parse().map_err(|_| format!("invalid x coordinate '{}'", x))?;
        let y: f32 = y.parse().map_err(|_| format!("invalid y coordinate '{}'", y))?;
        if !(0.0..=1.0).contains(&x) || !(0.0..=1.0).contains(&y) {
            return Err(format!("coordinates must be within [0, 1], got {},{}", x, y));
        }
        Ok(Point::new(x, y, label))
    }
}

/// On-screen rectangle the image is displayed in, used to normalize pointer positions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DisplayRect {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl DisplayRect {
    pub fn new(left: f32, top: f32, width: f32, height: f32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// Rectangle covering an image drawn at the origin at its own size.
    pub fn full(dimensions: (u32, u32)) -> Self {
        Self::new(0.0, 0.0, dimensions.0 as f32, dimensions.1 as f32)
    }

    /// Normalize a screen position against this rectangle.
    ///
    /// Returns `None` for positions outside the rectangle or for a degenerate rectangle.
    pub fn normalize(&self, screen_x: f32, screen_y: f32) -> Option<(f32, f32)> {
        if !(self.width > 0.0 && self.height > 0.0) {
            return None;
        }
        let x = (screen_x - self.left) / self.width;
        let y = (screen_y - self.top) / self.height;
        if (0.0..=1.0).contains(&x) && (0.0..=1.0).contains(&y) {
            Some((x, y))
        } else {
            None
        }
    }
}

/// How pointer input edits the point list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InteractionMode {
    /// Every pointer-move replaces the list with one foreground point at the cursor.
    #[default]
    Hover,
    /// Clicks append; pointer-moves are ignored until the list is cleared.
    MultiPoint,
}

/// Ordered prompt points for one image.
#[derive(Debug, Clone, Default)]
pub struct PointStore {
    points: Vec<Point>,
    mode: InteractionMode,
}

impl PointStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a clicked point. The first click after a clear enters multi-point mode and
    /// drops the synthetic hover point, so the list holds clicked points only.
    pub fn add_point(&mut self, point: Point) {
        if self.mode == InteractionMode::Hover {
            self.points.clear();
            self.mode = InteractionMode::MultiPoint;
        }
        self.points.push(point);
    }

    /// Replace the list with a single hover point. Returns `false` (and changes nothing)
    /// in multi-point mode.
    pub fn hover(&mut self, x: f32, y: f32) -> bool {
        if self.mode == InteractionMode::MultiPoint {
            return false;
        }
        self.points.clear();
        self.points.push(Point::foreground(x, y));
        true
    }

    /// Empty the list and return to hover mode.
    pub fn clear(&mut self) {
        self.points.clear();
        self.mode = InteractionMode::Hover;
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn mode(&self) -> InteractionMode {
        self.mode
    }

    /// Export is available while at least one point exists.
    pub fn export_enabled(&self) -> bool {
        !self.points.is_empty()
    }
}
