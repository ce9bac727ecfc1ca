//! Positions and viewport dimensions.

use serde::{Deserialize, Serialize};

/// Nominal width of one terminal cell in pixels.
pub const CELL_WIDTH_PX: f32 = 8.0;

/// Nominal height of one terminal cell in pixels.
pub const CELL_HEIGHT_PX: f32 = 16.0;

/// A point in percentage space: `top` and `left` run from 0 to 100.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PercentPoint {
    pub top: f32,
    pub left: f32,
}

impl PercentPoint {
    pub const fn new(top: f32, left: f32) -> Self {
        Self { top, left }
    }

    /// Euclidean distance in percentage units.
    pub fn distance_to(&self, other: &PercentPoint) -> f32 {
        let dx = self.left - other.left;
        let dy = self.top - other.top;
        (dx * dx + dy * dy).sqrt()
    }

    /// Whether both coordinates lie in `[0, 100]`.
    pub fn is_in_bounds(&self) -> bool {
        (0.0..=100.0).contains(&self.top) && (0.0..=100.0).contains(&self.left)
    }
}

/// A circular region where decorative points are suppressed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExclusionZone {
    pub top: f32,
    pub left: f32,
    pub radius: f32,
}

impl ExclusionZone {
    pub const fn new(top: f32, left: f32, radius: f32) -> Self {
        Self { top, left, radius }
    }

    pub fn center(&self) -> PercentPoint {
        PercentPoint::new(self.top, self.left)
    }

    /// Strictly inside: a point exactly on the rim is not excluded.
    pub fn contains(&self, point: &PercentPoint) -> bool {
        self.center().distance_to(point) < self.radius
    }
}

/// Viewport dimensions in pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Viewport for a terminal of `cols` x `rows` cells.
    pub fn from_cells(cols: u16, rows: u16) -> Self {
        Self::new(cols as f32 * CELL_WIDTH_PX, rows as f32 * CELL_HEIGHT_PX)
    }

    pub fn diagonal(&self) -> f32 {
        (self.width * self.width + self.height * self.height).sqrt()
    }

    /// Length of the shorter side.
    pub fn short_side(&self) -> f32 {
        self.width.min(self.height)
    }

    /// Whether a pixel position lies more than `margin` outside the viewport.
    pub fn is_outside(&self, x: f32, y: f32, margin: f32) -> bool {
        x < -margin || y < -margin || x > self.width + margin || y > self.height + margin
    }

    /// Convert a percentage position to pixels.
    pub fn to_pixels(&self, point: &PercentPoint) -> (f32, f32) {
        (
            point.left / 100.0 * self.width,
            point.top / 100.0 * self.height,
        )
    }
}
