#[cfg(test)]
#[path = "viewport_test.rs"]
mod viewport_test;

use serde::{Deserialize, Serialize};

use crate::consts::{DEFAULT_SCALE, MAX_SCALE, MIN_SCALE};

/// A point in either screen or model space.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to `other`.
    #[must_use]
    pub fn distance(self, other: Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// Pan/zoom state mapping the model plane onto the canvas.
///
/// `center_x` / `center_y` are the model coordinates shown at the canvas
/// center. `scale` is in pixels per model unit and always lies in
/// [`MIN_SCALE`, `MAX_SCALE`]. `width` / `height` are the canvas size in CSS
/// pixels as reported by the host layout.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub center_x: f64,
    pub center_y: f64,
    pub scale: f64,
    pub width: f64,
    pub height: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self { center_x: 0.0, center_y: 0.0, scale: DEFAULT_SCALE, width: 0.0, height: 0.0 }
    }
}

impl Viewport {
    /// Create a viewport of the given canvas size centered on the model origin.
    #[must_use]
    pub fn new(width: f64, height: f64, scale: f64) -> Self {
        Self { width, height, scale: clamp_scale(scale), ..Self::default() }
    }

    /// Convert a screen-space point (CSS pixels, y down) to model coordinates (y up).
    #[must_use]
    pub fn to_model(&self, screen: Point) -> Point {
        Point {
            x: (screen.x - self.width / 2.0) / self.scale + self.center_x,
            y: -(screen.y - self.height / 2.0) / self.scale + self.center_y,
        }
    }

    /// Convert a model-space point to screen coordinates (CSS pixels).
    #[must_use]
    pub fn to_screen(&self, model: Point) -> Point {
        Point {
            x: (model.x - self.center_x) * self.scale + self.width / 2.0,
            y: -(model.y - self.center_y) * self.scale + self.height / 2.0,
        }
    }

    /// Convert a screen-space distance (pixels) to a model-space distance.
    #[must_use]
    pub fn screen_dist_to_model(&self, screen_dist: f64) -> f64 {
        screen_dist / self.scale
    }

    /// Multiply the scale by `factor` around the canvas center.
    ///
    /// The result is clamped to [`MIN_SCALE`, `MAX_SCALE`]. Factors that are not
    /// finite and positive leave the viewport untouched. Returns whether the
    /// scale changed.
    pub fn zoom(&mut self, factor: f64) -> bool {
        if !factor.is_finite() || factor <= 0.0 {
            return false;
        }
        let next = clamp_scale(self.scale * factor);
        if (next - self.scale).abs() < f64::EPSILON {
            return false;
        }
        self.scale = next;
        true
    }

    /// Pan by a screen-space pixel delta so the content follows the pointer.
    pub fn pan_by_screen(&mut self, dx: f64, dy: f64) {
        self.center_x -= dx / self.scale;
        self.center_y += dy / self.scale;
    }

    /// Update the canvas size. The model point at the center stays put.
    pub fn set_size(&mut self, width: f64, height: f64) {
        self.width = width.max(0.0);
        self.height = height.max(0.0);
    }

    /// Model-space corners `(min, max)` of the visible canvas area.
    #[must_use]
    pub fn visible_bounds(&self) -> (Point, Point) {
        let top_left = self.to_model(Point::new(0.0, 0.0));
        let bottom_right = self.to_model(Point::new(self.width, self.height));
        (
            Point::new(top_left.x.min(bottom_right.x), top_left.y.min(bottom_right.y)),
            Point::new(top_left.x.max(bottom_right.x), top_left.y.max(bottom_right.y)),
        )
    }
}

fn clamp_scale(scale: f64) -> f64 {
    if scale.is_finite() { scale.clamp(MIN_SCALE, MAX_SCALE) } else { DEFAULT_SCALE }
}
