//! Stroke data model: points, colors, and completed strokes.

use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a stroke.
pub type StrokeId = Uuid;

/// RGBA color with 8-bit channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub fn black() -> Self {
        Self::new(0, 0, 0, 255)
    }

    pub fn white() -> Self {
        Self::new(255, 255, 255, 255)
    }

    pub fn transparent() -> Self {
        Self::new(0, 0, 0, 0)
    }

    /// Parse a CSS-style hex color (`#rgb`, `#rrggbb` or `#rrggbbaa`).
    pub fn from_hex(hex: &str) -> Option<Self> {
        let hex = hex.strip_prefix('#')?;
        if !hex.is_ascii() {
            return None;
        }
        match hex.len() {
            3 => {
                let r = u8::from_str_radix(&hex[0..1], 16).ok()?;
                let g = u8::from_str_radix(&hex[1..2], 16).ok()?;
                let b = u8::from_str_radix(&hex[2..3], 16).ok()?;
                Some(Self::new(r * 17, g * 17, b * 17, 255))
            }
            6 => {
                let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
                let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
                let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
                Some(Self::new(r, g, b, 255))
            }
            8 => {
                let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
                let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
                let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
                let a = u8::from_str_radix(&hex[6..8], 16).ok()?;
                Some(Self::new(r, g, b, a))
            }
            _ => None,
        }
    }

    /// Format as a `#rrggbb` hex string (alpha omitted when opaque).
    pub fn to_hex(self) -> String {
        if self.a == 255 {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            format!("#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
        }
    }
}

impl Default for Rgba {
    fn default() -> Self {
        Self::black()
    }
}

/// Drawing tool that produced a stroke.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum StrokeTool {
    /// Normal compositing.
    #[default]
    Pen,
    /// Destructive (alpha-punching) compositing.
    Eraser,
}

/// A single recorded point of a stroke, in logical coordinates.
///
/// Immutable once recorded.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StrokePoint {
    pub x: f64,
    pub y: f64,
    /// Normalized pressure in [0, 1].
    pub pressure: f64,
    /// Host-supplied event timestamp in milliseconds.
    pub timestamp_ms: u64,
}

impl StrokePoint {
    pub fn new(x: f64, y: f64, pressure: f64, timestamp_ms: u64) -> Self {
        Self {
            x,
            y,
            pressure,
            timestamp_ms,
        }
    }

    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

/// One continuous drawing or erasing gesture.
///
/// Points are appended by the stroke builder while the stroke is
/// active; on completion the stroke is frozen and handed to the
/// stroke set, where insertion order is z-order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stroke {
    pub id: StrokeId,
    pub tool: StrokeTool,
    pub color: Rgba,
    /// Base stroke width before pressure scaling, > 0.
    pub base_size: f64,
    /// Overall opacity in [0, 1].
    pub opacity: f64,
    /// Ordered point sequence, at least one point.
    pub points: Vec<StrokePoint>,
    pub created_at_ms: u64,
    /// Whether this stroke renders with midpoint smoothing.
    #[serde(default = "default_true")]
    pub smoothing: bool,
    /// Whether this stroke's width scales with per-point pressure.
    #[serde(default = "default_true")]
    pub pressure_scaling: bool,
}

fn default_true() -> bool {
    true
}

impl Stroke {
    /// Create a new stroke starting from a single point.
    pub fn new(tool: StrokeTool, color: Rgba, base_size: f64, opacity: f64, first: StrokePoint) -> Self {
        Self {
            id: Uuid::new_v4(),
            tool,
            color,
            base_size,
            opacity,
            created_at_ms: first.timestamp_ms,
            points: vec![first],
            smoothing: true,
            pressure_scaling: true,
        }
    }

    /// Append a point to the path.
    pub fn add_point(&mut self, point: StrokePoint) {
        self.points.push(point);
    }

    /// Number of recorded points.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Bounding box of the point path, ignoring stroke width.
    pub fn bounds(&self) -> Rect {
        if self.points.is_empty() {
            return Rect::ZERO;
        }

        let mut min_x = f64::MAX;
        let mut min_y = f64::MAX;
        let mut max_x = f64::MIN;
        let mut max_y = f64::MIN;

        for point in &self.points {
            min_x = min_x.min(point.x);
            min_y = min_y.min(point.y);
            max_x = max_x.max(point.x);
            max_y = max_y.max(point.y);
        }

        Rect::new(min_x, min_y, max_x, max_y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pt(x: f64, y: f64) -> StrokePoint {
        StrokePoint::new(x, y, 1.0, 0)
    }

    #[test]
    fn test_stroke_starts_with_one_point() {
        let stroke = Stroke::new(StrokeTool::Pen, Rgba::black(), 3.0, 1.0, pt(5.0, 5.0));
        assert_eq!(stroke.len(), 1);
        assert_eq!(stroke.tool, StrokeTool::Pen);
    }

    #[test]
    fn test_add_points() {
        let mut stroke = Stroke::new(StrokeTool::Pen, Rgba::black(), 3.0, 1.0, pt(0.0, 0.0));
        stroke.add_point(pt(10.0, 10.0));
        assert_eq!(stroke.len(), 2);
    }

    #[test]
    fn test_bounds() {
        let mut stroke = Stroke::new(StrokeTool::Pen, Rgba::black(), 3.0, 1.0, pt(0.0, 0.0));
        stroke.add_point(pt(100.0, 50.0));
        stroke.add_point(pt(50.0, 100.0));

        let bounds = stroke.bounds();
        assert!((bounds.x0).abs() < f64::EPSILON);
        assert!((bounds.y0).abs() < f64::EPSILON);
        assert!((bounds.x1 - 100.0).abs() < f64::EPSILON);
        assert!((bounds.y1 - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_hex_roundtrip() {
        let color = Rgba::new(0x12, 0xab, 0xef, 255);
        assert_eq!(Rgba::from_hex(&color.to_hex()), Some(color));
        assert_eq!(Rgba::from_hex("#000000"), Some(Rgba::black()));
        assert_eq!(Rgba::from_hex("#fff"), Some(Rgba::white()));
        assert_eq!(Rgba::from_hex("not-a-color"), None);
    }

    #[test]
    fn test_hex_rejects_non_ascii() {
        // Multi-byte characters can land inside a byte-indexed slice;
        // they must be rejected, not panic.
        assert_eq!(Rgba::from_hex("#€€"), None);
        assert_eq!(Rgba::from_hex("#ff€"), None);
        assert_eq!(Rgba::from_hex("€"), None);
    }

    #[test]
    fn test_hex_with_alpha() {
        let color = Rgba::new(1, 2, 3, 128);
        assert_eq!(color.to_hex(), "#01020380");
        assert_eq!(Rgba::from_hex("#01020380"), Some(color));
    }
}
