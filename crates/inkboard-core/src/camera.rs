//! Camera module for pan/zoom transforms.

use kurbo::{Affine, Point, Vec2};
use serde::{Deserialize, Serialize};

/// Default minimum zoom level.
pub const DEFAULT_MIN_ZOOM: f64 = 0.1;

/// Default maximum zoom level.
pub const DEFAULT_MAX_ZOOM: f64 = 5.0;

/// Camera manages the view transform for the canvas.
///
/// It owns the pan offset and zoom factor, and is the single place
/// where screen coordinates are converted to logical (canvas-space)
/// coordinates and back. The forward transform is translate(pan)
/// followed by scale(zoom), so `screen = pan + zoom * logical`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Camera {
    /// Current translation offset (pan), in screen units.
    pub pan: Vec2,
    /// Current zoom level (1.0 = 100%).
    pub zoom: f64,
    /// Minimum allowed zoom level.
    pub min_zoom: f64,
    /// Maximum allowed zoom level.
    pub max_zoom: f64,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            pan: Vec2::ZERO,
            zoom: 1.0,
            min_zoom: DEFAULT_MIN_ZOOM,
            max_zoom: DEFAULT_MAX_ZOOM,
        }
    }
}

impl Camera {
    /// Create a new camera with default bounds.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a camera with custom zoom bounds.
    pub fn with_bounds(min_zoom: f64, max_zoom: f64) -> Self {
        Self {
            min_zoom,
            max_zoom,
            ..Self::default()
        }
    }

    /// Get the affine transform for rendering.
    ///
    /// Converts logical coordinates to screen coordinates.
    pub fn transform(&self) -> Affine {
        Affine::translate(self.pan) * Affine::scale(self.zoom)
    }

    /// Get the inverse transform for input handling.
    ///
    /// Converts screen coordinates to logical coordinates.
    pub fn inverse_transform(&self) -> Affine {
        Affine::scale(1.0 / self.zoom) * Affine::translate(-self.pan)
    }

    /// Convert a screen point to logical coordinates.
    pub fn screen_to_logical(&self, screen_point: Point) -> Point {
        self.inverse_transform() * screen_point
    }

    /// Convert a logical point to screen coordinates.
    pub fn logical_to_screen(&self, logical_point: Point) -> Point {
        self.transform() * logical_point
    }

    /// Pan the camera by a delta in screen coordinates.
    ///
    /// Unconditional and unbounded; the canvas plane is infinite.
    pub fn pan_by(&mut self, delta: Vec2) {
        self.pan += delta;
    }

    /// Zoom by `factor`, keeping the given screen point fixed.
    ///
    /// The zoom is clamped to `[min_zoom, max_zoom]`. Returns `false`
    /// when the clamp leaves the zoom unchanged, in which case no state
    /// changes and no redraw is required.
    pub fn zoom_at(&mut self, anchor: Point, factor: f64) -> bool {
        let new_zoom = (self.zoom * factor).clamp(self.min_zoom, self.max_zoom);
        if (new_zoom - self.zoom).abs() < f64::EPSILON {
            return false;
        }

        // Recompute pan so the anchor maps to the same logical point
        // before and after: pan' = anchor - (anchor - pan) * z'/z.
        let ratio = new_zoom / self.zoom;
        self.pan = Vec2::new(
            anchor.x - (anchor.x - self.pan.x) * ratio,
            anchor.y - (anchor.y - self.pan.y) * ratio,
        );
        self.zoom = new_zoom;
        true
    }

    /// Reset camera to the default position and zoom.
    pub fn reset(&mut self) {
        self.pan = Vec2::ZERO;
        self.zoom = 1.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_camera() {
        let camera = Camera::new();
        assert_eq!(camera.pan, Vec2::ZERO);
        assert!((camera.zoom - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_screen_to_logical_identity() {
        let camera = Camera::new();
        let screen = Point::new(100.0, 200.0);
        let logical = camera.screen_to_logical(screen);
        assert!((logical.x - screen.x).abs() < f64::EPSILON);
        assert!((logical.y - screen.y).abs() < f64::EPSILON);
    }

    #[test]
    fn test_screen_to_logical_with_pan() {
        let mut camera = Camera::new();
        camera.pan = Vec2::new(50.0, 100.0);
        let logical = camera.screen_to_logical(Point::new(100.0, 200.0));
        assert!((logical.x - 50.0).abs() < f64::EPSILON);
        assert!((logical.y - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_screen_to_logical_with_zoom() {
        let mut camera = Camera::new();
        camera.zoom = 2.0;
        let logical = camera.screen_to_logical(Point::new(100.0, 200.0));
        assert!((logical.x - 50.0).abs() < f64::EPSILON);
        assert!((logical.y - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_roundtrip_conversion() {
        let mut camera = Camera::new();
        camera.pan = Vec2::new(30.0, -20.0);
        camera.zoom = 1.5;

        let original = Point::new(123.0, 456.0);
        let logical = camera.screen_to_logical(original);
        let back = camera.logical_to_screen(logical);

        assert!((back.x - original.x).abs() < 1e-10);
        assert!((back.y - original.y).abs() < 1e-10);
    }

    #[test]
    fn test_zoom_clamp() {
        let mut camera = Camera::new();
        camera.zoom_at(Point::ZERO, 0.001);
        assert!((camera.zoom - camera.min_zoom).abs() < f64::EPSILON);

        camera.zoom = 1.0;
        camera.zoom_at(Point::ZERO, 100.0);
        assert!((camera.zoom - camera.max_zoom).abs() < f64::EPSILON);
    }

    #[test]
    fn test_zoom_at_clamped_is_noop() {
        let mut camera = Camera::new();
        camera.zoom = camera.max_zoom;
        let pan_before = camera.pan;
        assert!(!camera.zoom_at(Point::new(40.0, 40.0), 2.0));
        assert_eq!(camera.pan, pan_before);
    }

    #[test]
    fn test_anchor_stability() {
        let mut camera = Camera::new();
        camera.pan = Vec2::new(17.0, -9.0);

        let anchor = Point::new(320.0, 240.0);
        let before = camera.screen_to_logical(anchor);
        assert!(camera.zoom_at(anchor, 1.7));
        let after = camera.screen_to_logical(anchor);

        assert!((before.x - after.x).abs() < 1e-9);
        assert!((before.y - after.y).abs() < 1e-9);
    }

    #[test]
    fn test_pan() {
        let mut camera = Camera::new();
        camera.pan_by(Vec2::new(10.0, 20.0));
        assert!((camera.pan.x - 10.0).abs() < f64::EPSILON);
        assert!((camera.pan.y - 20.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_custom_bounds() {
        let mut camera = Camera::with_bounds(0.5, 2.0);
        camera.zoom_at(Point::ZERO, 100.0);
        assert!((camera.zoom - 2.0).abs() < f64::EPSILON);
    }
}
