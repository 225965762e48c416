//! Stroke builder: accumulates pointer samples into a stroke.
//!
//! Two-state machine (idle/active). While active it owns the stroke
//! exclusively, appending mapped points and emitting the incremental
//! render segment for each one; on finish, ownership of the frozen
//! stroke transfers to the caller.

use crate::stroke::{Rgba, Stroke, StrokePoint, StrokeTool};
use kurbo::Point;

/// The incremental piece of geometry produced by appending one point.
///
/// With smoothing, consecutive raw points are bridged by quadratics
/// through their rolling midpoints, which keeps the rendered line
/// strictly between raw vertices without lookahead.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RenderSegment {
    /// Straight line to the newest point.
    Line {
        from: Point,
        to: Point,
        /// Pressure of the newest point.
        pressure: f64,
    },
    /// Quadratic curve; control point is the next-to-last raw point,
    /// endpoint is the midpoint of the last two raw points.
    Quad {
        from: Point,
        ctrl: Point,
        to: Point,
        pressure: f64,
    },
}

impl RenderSegment {
    /// Segment bridging `points[idx]` to the path so far, under the
    /// given smoothing policy. `idx` must be in `1..points.len()`.
    ///
    /// Used both for incremental appends and to re-derive the full
    /// path during a redraw, so the two never drift apart.
    pub fn bridge(points: &[StrokePoint], idx: usize, smoothing: bool) -> RenderSegment {
        debug_assert!(idx >= 1 && idx < points.len());
        let last = points[idx].position();
        let prev = points[idx - 1].position();

        if smoothing && idx >= 2 {
            // The first quad picks up at points[1], where the opening
            // line segment left the pen.
            let from = if idx == 2 {
                prev
            } else {
                points[idx - 2].position().midpoint(prev)
            };
            RenderSegment::Quad {
                from,
                ctrl: prev,
                to: prev.midpoint(last),
                pressure: points[idx].pressure,
            }
        } else {
            RenderSegment::Line {
                from: prev,
                to: last,
                pressure: points[idx].pressure,
            }
        }
    }
}

#[derive(Debug, Clone, Default)]
enum BuilderState {
    #[default]
    Idle,
    Active(Stroke),
}

/// Builds one stroke at a time from normalized, mapped pointer samples.
#[derive(Debug, Clone)]
pub struct StrokeBuilder {
    state: BuilderState,
    /// Apply midpoint smoothing to strokes begun by this builder.
    pub enable_smoothing: bool,
    /// Scale stroke width by per-point pressure.
    pub enable_pressure: bool,
}

impl Default for StrokeBuilder {
    fn default() -> Self {
        Self {
            state: BuilderState::Idle,
            enable_smoothing: true,
            enable_pressure: true,
        }
    }
}

impl StrokeBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        matches!(self.state, BuilderState::Active(_))
    }

    /// The in-progress stroke, if any.
    pub fn current_stroke(&self) -> Option<&Stroke> {
        match &self.state {
            BuilderState::Active(stroke) => Some(stroke),
            BuilderState::Idle => None,
        }
    }

    /// Begin a new stroke from its first (already mapped) point.
    ///
    /// If a stroke is still active, it is finalized first and returned;
    /// two concurrent active strokes are never allowed on one channel.
    pub fn begin(
        &mut self,
        tool: StrokeTool,
        color: Rgba,
        base_size: f64,
        opacity: f64,
        first: StrokePoint,
    ) -> Option<Stroke> {
        let interrupted = self.finish();

        let mut stroke = Stroke::new(tool, color, base_size, opacity, first);
        stroke.smoothing = self.enable_smoothing;
        stroke.pressure_scaling = self.enable_pressure;
        self.state = BuilderState::Active(stroke);

        interrupted
    }

    /// Append a mapped point to the active stroke.
    ///
    /// Returns the render segment bridging to the new point, or `None`
    /// when idle.
    pub fn append(&mut self, point: StrokePoint) -> Option<RenderSegment> {
        let BuilderState::Active(stroke) = &mut self.state else {
            return None;
        };

        stroke.add_point(point);
        let idx = stroke.points.len() - 1;
        Some(RenderSegment::bridge(&stroke.points, idx, stroke.smoothing))
    }

    /// Finalize the active stroke (pointer up/cancel/out).
    ///
    /// A single-point "tap" is a valid stroke and renders as a dot.
    pub fn finish(&mut self) -> Option<Stroke> {
        match std::mem::take(&mut self.state) {
            BuilderState::Active(stroke) if !stroke.is_empty() => Some(stroke),
            _ => None,
        }
    }
}
