//! Drawing engine facade: one explicitly owned instance wiring the
//! canvas state machine to the render pipeline.
//!
//! This is the surface external collaborators hold. Everything runs
//! synchronously on the caller's thread; each input event produces at
//! most one redraw (full or incremental) before control returns.

use crate::renderer::{ImageFormat, PixmapRenderer, RenderResult};
use inkboard_core::{
    Canvas, CanvasEvent, CanvasOptions, CanvasSize, ExportData, RawPointerEvent, RenderAction,
    Rgba, Stroke, ToolKind,
};
use kurbo::{Point, Vec2};
use std::time::{SystemTime, UNIX_EPOCH};

/// The freehand drawing subsystem: canvas state plus framebuffer.
#[derive(Debug)]
pub struct DrawingEngine {
    canvas: Canvas,
    renderer: PixmapRenderer,
}

impl DrawingEngine {
    /// Construct against a surface of the given pixel size.
    ///
    /// Fails fast on a zero-sized surface rather than operating
    /// against nothing.
    pub fn new(width: u32, height: u32, options: CanvasOptions) -> RenderResult<Self> {
        let renderer = PixmapRenderer::new(width, height)?;
        log::info!("drawing engine initialized ({width}x{height})");
        Ok(Self {
            canvas: Canvas::new(options),
            renderer,
        })
    }

    /// The underlying canvas state (read access for hosts and tests).
    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }

    /// The underlying framebuffer.
    pub fn surface(&self) -> &PixmapRenderer {
        &self.renderer
    }

    // ----- input -----------------------------------------------------

    /// Feed one raw pointer event through normalization, the canvas
    /// state machine, and whatever rendering it demands.
    pub fn handle_pointer(&mut self, event: &RawPointerEvent) {
        let action = self.canvas.handle_pointer(event);
        self.apply(action);
    }

    /// Wheel zoom anchored at the cursor.
    pub fn handle_wheel(&mut self, position: Point, delta_y: f64) {
        let action = self.canvas.handle_wheel(position, delta_y);
        self.apply(action);
    }

    /// Zoom keeping `anchor` fixed; clamped zoom changes nothing.
    pub fn zoom_at(&mut self, anchor: Point, factor: f64) {
        let action = self.canvas.zoom_at(anchor, factor);
        self.apply(action);
    }

    /// Pan by a screen-space delta.
    pub fn pan_by(&mut self, delta: Vec2) {
        let action = self.canvas.pan_by(delta);
        self.apply(action);
    }

    // ----- history and mutation --------------------------------------

    pub fn undo(&mut self) {
        let action = self.canvas.undo();
        self.apply(action);
    }

    pub fn redo(&mut self) {
        let action = self.canvas.redo();
        self.apply(action);
    }

    pub fn clear(&mut self) {
        let action = self.canvas.clear();
        self.apply(action);
    }

    // ----- style -----------------------------------------------------

    pub fn set_tool(&mut self, tool: ToolKind) {
        self.canvas.set_tool(tool);
    }

    pub fn set_color(&mut self, color: Rgba) {
        self.canvas.set_color(color);
    }

    pub fn set_size(&mut self, size: f64) {
        self.canvas.set_size(size);
    }

    pub fn set_opacity(&mut self, opacity: f64) {
        self.canvas.set_opacity(opacity);
    }

    // ----- external interface ----------------------------------------

    /// Snapshot for collaborators; deep copies, never aliases state.
    pub fn export_data(&self) -> ExportData {
        ExportData {
            strokes: self.canvas.export_strokes(),
            canvas_size: CanvasSize {
                width: self.renderer.width(),
                height: self.renderer.height(),
            },
            timestamp_ms: now_ms(),
        }
    }

    /// Replace the stroke set wholesale and redraw.
    pub fn import_data(&mut self, strokes: Vec<Stroke>) {
        let action = self.canvas.import_strokes(strokes);
        self.apply(action);
    }

    /// Rasterize the current framebuffer. PNG baseline; quality is
    /// ignored for lossless formats.
    pub fn export_as_image(&self, format: ImageFormat, quality: f64) -> RenderResult<Vec<u8>> {
        self.renderer.encode(format, quality)
    }

    /// Resize the backing surface, preserving content where possible.
    pub fn resize(&mut self, width: u32, height: u32) -> RenderResult<()> {
        self.renderer.resize(width, height)
    }

    /// Drain pending lifecycle notifications for the host.
    pub fn drain_events(&mut self) -> Vec<CanvasEvent> {
        self.canvas.drain_events()
    }

    /// Force a full repaint of the stroke set.
    pub fn redraw(&mut self) {
        self.renderer
            .redraw_all(self.canvas.strokes(), self.canvas.active_stroke(), &self.canvas.camera);
    }

    fn apply(&mut self, action: RenderAction) {
        match action {
            RenderAction::None => {}
            RenderAction::Append(segment) => {
                if let Some(stroke) = self.canvas.active_stroke() {
                    self.renderer
                        .draw_segment(stroke, &segment, &self.canvas.camera);
                }
            }
            RenderAction::FullRedraw => self.redraw(),
        }
    }
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
