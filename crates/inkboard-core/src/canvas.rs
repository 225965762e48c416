//! Canvas state machine: owns the stroke set, viewport, input routing,
//! history, and the outbound event queue.
//!
//! All operations run synchronously on the caller's thread; each input
//! event produces at most one [`RenderAction`] for the render pipeline.

use crate::builder::{RenderSegment, StrokeBuilder};
use crate::camera::Camera;
use crate::gesture::GestureDetector;
use crate::history::History;
use crate::input::{
    InputCapabilities, InputNormalizer, NormalizedInput, PointerPhase, PointerSample,
    RawPointerEvent,
};
use crate::stroke::{Rgba, Stroke, StrokeId, StrokePoint, StrokeTool};
use kurbo::{Point, Vec2};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use thiserror::Error;

/// Canvas errors.
#[derive(Debug, Error)]
pub enum CanvasError {
    #[error("Invalid drawing data: {0}")]
    InvalidData(#[from] serde_json::Error),
}

/// Active tool selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum ToolKind {
    #[default]
    Pen,
    Eraser,
    Pan,
}

/// Construction options for a canvas.
#[derive(Debug, Clone, Copy)]
pub struct CanvasOptions {
    pub enable_smoothing: bool,
    pub enable_pressure: bool,
    pub capabilities: InputCapabilities,
    pub min_zoom: f64,
    pub max_zoom: f64,
}

impl Default for CanvasOptions {
    fn default() -> Self {
        Self {
            enable_smoothing: true,
            enable_pressure: true,
            capabilities: InputCapabilities::default(),
            min_zoom: crate::camera::DEFAULT_MIN_ZOOM,
            max_zoom: crate::camera::DEFAULT_MAX_ZOOM,
        }
    }
}

/// Notifications emitted for the host to drain.
///
/// Replaces broadcast-bus coupling with an explicit outbound queue;
/// nothing in the canvas requires that anyone consumes these.
#[derive(Debug, Clone, PartialEq)]
pub enum CanvasEvent {
    StrokeStarted { id: StrokeId },
    StrokeCompleted { id: StrokeId },
    CanvasCleared,
    ViewportZoomed { zoom: f64 },
    UndoPerformed,
    RedoPerformed,
    DataImported { stroke_count: usize },
    ToolChanged(ToolKind),
    ColorChanged(Rgba),
    SizeChanged(f64),
    OpacityChanged(f64),
}

/// What the render pipeline must do after an operation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RenderAction {
    /// No visible change.
    None,
    /// Draw only the newest segment of the active stroke onto the
    /// existing framebuffer.
    Append(RenderSegment),
    /// Clear and repaint the full stroke set under the current
    /// transform.
    FullRedraw,
}

/// Size of the backing canvas surface in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanvasSize {
    pub width: u32,
    pub height: u32,
}

/// Snapshot payload handed to external collaborators.
///
/// Deep copies only; never aliases canvas-internal state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportData {
    pub strokes: Vec<Stroke>,
    pub canvas_size: CanvasSize,
    pub timestamp_ms: u64,
}

impl ExportData {
    pub fn to_json(&self) -> Result<String, CanvasError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, CanvasError> {
        Ok(serde_json::from_str(json)?)
    }
}

/// The drawing canvas state.
///
/// Owns the completed stroke set (insertion order = z-order), the
/// camera, the stroke builder, gesture detection, and undo/redo
/// history. Mutated only from the owning thread; collaborators receive
/// copies via [`Canvas::export_strokes`].
#[derive(Debug)]
pub struct Canvas {
    strokes: Vec<Stroke>,
    /// View transform; read by the render pipeline.
    pub camera: Camera,
    builder: StrokeBuilder,
    normalizer: InputNormalizer,
    gesture: GestureDetector,
    history: History,
    tool: ToolKind,
    color: Rgba,
    size: f64,
    opacity: f64,
    /// Last screen point of an in-progress pan drag.
    pan_anchor: Option<Point>,
    events: VecDeque<CanvasEvent>,
}

impl Default for Canvas {
    fn default() -> Self {
        Self::new(CanvasOptions::default())
    }
}

impl Canvas {
    pub fn new(options: CanvasOptions) -> Self {
        let mut builder = StrokeBuilder::new();
        builder.enable_smoothing = options.enable_smoothing;
        builder.enable_pressure = options.enable_pressure;

        log::info!(
            "canvas initialized (smoothing={}, pressure={})",
            options.enable_smoothing,
            options.enable_pressure
        );

        Self {
            strokes: Vec::new(),
            camera: Camera::with_bounds(options.min_zoom, options.max_zoom),
            builder,
            normalizer: InputNormalizer::new(options.capabilities),
            gesture: GestureDetector::new(),
            history: History::new(),
            tool: ToolKind::default(),
            color: Rgba::black(),
            size: 3.0,
            opacity: 1.0,
            pan_anchor: None,
            events: VecDeque::new(),
        }
    }

    // ----- accessors -------------------------------------------------

    pub fn strokes(&self) -> &[Stroke] {
        &self.strokes
    }

    /// The in-progress stroke, if drawing.
    pub fn active_stroke(&self) -> Option<&Stroke> {
        self.builder.current_stroke()
    }

    pub fn is_drawing(&self) -> bool {
        self.builder.is_active()
    }

    pub fn tool(&self) -> ToolKind {
        self.tool
    }

    pub fn color(&self) -> Rgba {
        self.color
    }

    pub fn size(&self) -> f64 {
        self.size
    }

    pub fn opacity(&self) -> f64 {
        self.opacity
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Drain all pending notifications.
    pub fn drain_events(&mut self) -> Vec<CanvasEvent> {
        self.events.drain(..).collect()
    }

    fn emit(&mut self, event: CanvasEvent) {
        self.events.push_back(event);
    }

    // ----- input routing ---------------------------------------------

    /// Process one raw pointer event.
    pub fn handle_pointer(&mut self, event: &RawPointerEvent) -> RenderAction {
        match self.normalizer.normalize(event) {
            NormalizedInput::Dropped => RenderAction::None,
            NormalizedInput::MultiTouch {
                contacts,
                timestamp_ms: _,
            } => self.handle_multi_touch(&contacts),
            NormalizedInput::Sample { phase, sample } => match phase {
                PointerPhase::Down => self.pointer_down(&sample),
                PointerPhase::Move => self.pointer_move(&sample),
                PointerPhase::Up | PointerPhase::Cancel => self.pointer_up(),
            },
        }
    }

    /// Wheel zoom: one notch scales by 0.9 (away) or 1.1 (toward),
    /// anchored at the cursor.
    pub fn handle_wheel(&mut self, position: Point, delta_y: f64) -> RenderAction {
        let factor = if delta_y > 0.0 { 0.9 } else { 1.1 };
        self.zoom_at(position, factor)
    }

    /// Zoom by `factor` keeping `anchor` (screen space) fixed.
    pub fn zoom_at(&mut self, anchor: Point, factor: f64) -> RenderAction {
        if !self.camera.zoom_at(anchor, factor) {
            return RenderAction::None;
        }
        let zoom = self.camera.zoom;
        self.emit(CanvasEvent::ViewportZoomed { zoom });
        RenderAction::FullRedraw
    }

    /// Pan by a screen-space delta.
    pub fn pan_by(&mut self, delta: Vec2) -> RenderAction {
        self.camera.pan_by(delta);
        RenderAction::FullRedraw
    }

    fn handle_multi_touch(&mut self, contacts: &[(u64, Point)]) -> RenderAction {
        // Pinch and drawing are mutually exclusive; a second contact
        // finalizes whatever was captured so far.
        let finished = self.builder.finish();
        let mut action = match finished {
            Some(stroke) => {
                self.complete_stroke(stroke);
                RenderAction::FullRedraw
            }
            None => RenderAction::None,
        };

        if let Some(pinch) = self.gesture.update(contacts) {
            if self.zoom_at(pinch.anchor, pinch.scale) == RenderAction::FullRedraw {
                action = RenderAction::FullRedraw;
            }
        }
        action
    }

    fn pointer_down(&mut self, sample: &PointerSample) -> RenderAction {
        match self.tool {
            ToolKind::Pen | ToolKind::Eraser => {
                let point = self.map_sample(sample);
                let stroke_tool = match self.tool {
                    ToolKind::Eraser => StrokeTool::Eraser,
                    _ => StrokeTool::Pen,
                };
                let interrupted =
                    self.builder
                        .begin(stroke_tool, self.color, self.size, self.opacity, point);

                let mut action = RenderAction::None;
                if let Some(stroke) = interrupted {
                    self.complete_stroke(stroke);
                    action = RenderAction::FullRedraw;
                }

                let id = self
                    .builder
                    .current_stroke()
                    .map(|s| s.id)
                    .unwrap_or_default();
                self.emit(CanvasEvent::StrokeStarted { id });
                action
            }
            ToolKind::Pan => {
                self.pan_anchor = Some(sample.position);
                RenderAction::None
            }
        }
    }

    fn pointer_move(&mut self, sample: &PointerSample) -> RenderAction {
        if self.builder.is_active() {
            let point = self.map_sample(sample);
            return match self.builder.append(point) {
                Some(segment) => RenderAction::Append(segment),
                None => RenderAction::None,
            };
        }

        if let Some(anchor) = self.pan_anchor {
            let delta = sample.position - anchor;
            self.pan_anchor = Some(sample.position);
            return self.pan_by(delta);
        }

        RenderAction::None
    }

    fn pointer_up(&mut self) -> RenderAction {
        self.pan_anchor = None;

        match self.builder.finish() {
            Some(stroke) => {
                // A tap leaves a single-point dot that the incremental
                // path never painted; everything longer is already on
                // the framebuffer.
                let needs_redraw = stroke.len() == 1;
                self.complete_stroke(stroke);
                if needs_redraw {
                    RenderAction::FullRedraw
                } else {
                    RenderAction::None
                }
            }
            None => RenderAction::None,
        }
    }

    fn map_sample(&self, sample: &PointerSample) -> StrokePoint {
        let logical = self.camera.screen_to_logical(sample.position);
        StrokePoint::new(logical.x, logical.y, sample.pressure, sample.timestamp_ms)
    }

    fn complete_stroke(&mut self, stroke: Stroke) {
        let id = stroke.id;
        self.history.commit(&self.strokes);
        self.strokes.push(stroke);
        self.emit(CanvasEvent::StrokeCompleted { id });
    }

    // ----- history ---------------------------------------------------

    /// Undo the last committed mutation. Guaranteed no-op when the
    /// undo stack is empty.
    pub fn undo(&mut self) -> RenderAction {
        match self.history.undo(&self.strokes) {
            Some(restored) => {
                self.strokes = restored;
                self.emit(CanvasEvent::UndoPerformed);
                RenderAction::FullRedraw
            }
            None => RenderAction::None,
        }
    }

    /// Redo the last undone mutation. Guaranteed no-op when the redo
    /// stack is empty.
    pub fn redo(&mut self) -> RenderAction {
        match self.history.redo(&self.strokes) {
            Some(restored) => {
                self.strokes = restored;
                self.emit(CanvasEvent::RedoPerformed);
                RenderAction::FullRedraw
            }
            None => RenderAction::None,
        }
    }

    /// Remove every stroke. Undoable.
    pub fn clear(&mut self) -> RenderAction {
        self.history.commit(&self.strokes);
        self.strokes.clear();
        self.emit(CanvasEvent::CanvasCleared);
        RenderAction::FullRedraw
    }

    // ----- style setters ---------------------------------------------

    pub fn set_tool(&mut self, tool: ToolKind) {
        self.tool = tool;
        self.emit(CanvasEvent::ToolChanged(tool));
    }

    pub fn set_color(&mut self, color: Rgba) {
        self.color = color;
        self.emit(CanvasEvent::ColorChanged(color));
    }

    /// Set the base stroke size, silently clamped to [1, 100].
    pub fn set_size(&mut self, size: f64) {
        self.size = size.clamp(1.0, 100.0);
        let size = self.size;
        self.emit(CanvasEvent::SizeChanged(size));
    }

    /// Set the stroke opacity, silently clamped to [0, 1].
    pub fn set_opacity(&mut self, opacity: f64) {
        self.opacity = opacity.clamp(0.0, 1.0);
        let opacity = self.opacity;
        self.emit(CanvasEvent::OpacityChanged(opacity));
    }

    // ----- import/export ---------------------------------------------

    /// Deep copy of the completed stroke set.
    pub fn export_strokes(&self) -> Vec<Stroke> {
        self.strokes.clone()
    }

    /// Replace the stroke set wholesale. No merge semantics.
    pub fn import_strokes(&mut self, strokes: Vec<Stroke>) -> RenderAction {
        self.history.commit(&self.strokes);
        let count = strokes.len();
        self.strokes = strokes;
        log::info!("imported {count} strokes");
        self.emit(CanvasEvent::DataImported {
            stroke_count: count,
        });
        RenderAction::FullRedraw
    }
}
