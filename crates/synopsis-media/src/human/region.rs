//! Human bounding regions.

use serde::{Deserialize, Serialize};

/// Axis-aligned region covering a detected presenter, in pixel coordinates.
///
/// Bounds are half-open: `[x_min, x_max) x [y_min, y_max)`. A region with zero
/// width or height is "empty" (no human found).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct HumanRegion {
    pub x_min: u32,
    pub x_max: u32,
    pub y_min: u32,
    pub y_max: u32,
}

impl HumanRegion {
    /// The empty region.
    pub const EMPTY: HumanRegion = HumanRegion {
        x_min: 0,
        x_max: 0,
        y_min: 0,
        y_max: 0,
    };

    pub fn new(x_min: u32, x_max: u32, y_min: u32, y_max: u32) -> Self {
        Self {
            x_min: x_min.min(x_max),
            x_max: x_min.max(x_max),
            y_min: y_min.min(y_max),
            y_max: y_min.max(y_max),
        }
    }

    /// Create from a top-left corner and size.
    pub fn from_rect(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self::new(x, x.saturating_add(width), y, y.saturating_add(height))
    }

    pub fn width(&self) -> u32 {
        self.x_max.saturating_sub(self.x_min)
    }

    pub fn height(&self) -> u32 {
        self.y_max.saturating_sub(self.y_min)
    }

    pub fn area(&self) -> u64 {
        self.width() as u64 * self.height() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.width() == 0 || self.height() == 0
    }

    /// Horizontal centre.
    pub fn center_x(&self) -> f64 {
        (self.x_min as f64 + self.x_max as f64) / 2.0
    }

    /// Smallest region containing both. An empty operand yields the other.
    pub fn union(&self, other: &HumanRegion) -> HumanRegion {
        if self.is_empty() {
            return *other;
        }
        if other.is_empty() {
            return *self;
        }
        HumanRegion {
            x_min: self.x_min.min(other.x_min),
            x_max: self.x_max.max(other.x_max),
            y_min: self.y_min.min(other.y_min),
            y_max: self.y_max.max(other.y_max),
        }
    }

    /// Scale into another resolution. Minimum bounds round down, maximum bounds round up.
    pub fn scale(&self, factor: f64) -> HumanRegion {
        if self.is_empty() {
            return HumanRegion::EMPTY;
        }
        HumanRegion {
            x_min: (self.x_min as f64 * factor).floor() as u32,
            x_max: (self.x_max as f64 * factor).ceil() as u32,
            y_min: (self.y_min as f64 * factor).floor() as u32,
            y_max: (self.y_max as f64 * factor).ceil() as u32,
        }
    }

    /// Positive-area overlap with the half-open rectangle `[x0, x1) x [y0, y1)`.
    pub fn intersects(&self, x0: u32, y0: u32, x1: u32, y1: u32) -> bool {
        if self.is_empty() || x1 <= x0 || y1 <= y0 {
            return false;
        }
        self.x_min < x1 && x0 < self.x_max && self.y_min < y1 && y0 < self.y_max
    }
}
