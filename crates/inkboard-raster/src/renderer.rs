//! CPU render pipeline over a tiny-skia framebuffer.
//!
//! Full redraws repaint the whole stroke set under the current camera
//! transform; during an active stroke only the newest segment is
//! painted onto the existing framebuffer. Eraser strokes composite
//! with `DestinationOut` so they punch alpha out of previously drawn
//! content instead of painting over it.

use inkboard_core::{Camera, RenderSegment, Stroke, StrokeTool};
use thiserror::Error;
use tiny_skia::{
    BlendMode, Color, FillRule, LineCap, LineJoin, Paint, PathBuilder, Pixmap, PixmapPaint,
    Stroke as StrokeStyle, Transform,
};

/// Render pipeline errors.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Invalid canvas surface size {width}x{height}")]
    InvalidSurface { width: u32, height: u32 },
    #[error("Image encoding failed: {0}")]
    Encode(String),
}

/// Result type for render operations.
pub type RenderResult<T> = Result<T, RenderError>;

/// Supported raster snapshot encodings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ImageFormat {
    #[default]
    Png,
}

/// Renders strokes into an owned RGBA framebuffer.
pub struct PixmapRenderer {
    pixmap: Pixmap,
}

impl PixmapRenderer {
    /// Create a renderer with a transparent framebuffer.
    ///
    /// Refuses to initialize against a zero-sized surface.
    pub fn new(width: u32, height: u32) -> RenderResult<Self> {
        let pixmap =
            Pixmap::new(width, height).ok_or(RenderError::InvalidSurface { width, height })?;
        Ok(Self { pixmap })
    }

    pub fn width(&self) -> u32 {
        self.pixmap.width()
    }

    pub fn height(&self) -> u32 {
        self.pixmap.height()
    }

    /// Read back one framebuffer pixel as straight (unpremultiplied)
    /// RGBA. `None` outside the surface.
    pub fn pixel(&self, x: u32, y: u32) -> Option<(u8, u8, u8, u8)> {
        let premultiplied = self.pixmap.pixel(x, y)?;
        let color = premultiplied.demultiply();
        Some((color.red(), color.green(), color.blue(), color.alpha()))
    }

    /// Resize the framebuffer, preserving existing content.
    ///
    /// A zero-sized target is a hard error and leaves the current
    /// surface in place.
    pub fn resize(&mut self, width: u32, height: u32) -> RenderResult<()> {
        let mut next =
            Pixmap::new(width, height).ok_or(RenderError::InvalidSurface { width, height })?;

        next.draw_pixmap(
            0,
            0,
            self.pixmap.as_ref(),
            &PixmapPaint::default(),
            Transform::identity(),
            None,
        );

        self.pixmap = next;
        Ok(())
    }

    /// Clear and repaint every stroke in z-order, then the in-progress
    /// stroke, under translate(pan) ∘ scale(zoom).
    pub fn redraw_all(&mut self, strokes: &[Stroke], active: Option<&Stroke>, camera: &Camera) {
        self.pixmap.fill(Color::TRANSPARENT);

        let transform = camera_transform(camera);
        for stroke in strokes.iter().chain(active) {
            self.draw_stroke(stroke, transform);
        }
    }

    /// Incremental append: paint only the newest segment of the active
    /// stroke, no clear. Invalid after any transform change; callers
    /// fall back to [`PixmapRenderer::redraw_all`] then.
    pub fn draw_segment(&mut self, stroke: &Stroke, segment: &RenderSegment, camera: &Camera) {
        let transform = camera_transform(camera);
        let paint = stroke_paint(stroke);
        self.paint_segment(segment, &paint, stroke, transform);
    }

    /// Encode the current framebuffer. Quality is accepted for parity
    /// with lossy encodings and ignored for PNG.
    pub fn encode(&self, format: ImageFormat, _quality: f64) -> RenderResult<Vec<u8>> {
        match format {
            ImageFormat::Png => self
                .pixmap
                .encode_png()
                .map_err(|e| RenderError::Encode(e.to_string())),
        }
    }

    fn draw_stroke(&mut self, stroke: &Stroke, transform: Transform) {
        if stroke.points.is_empty() {
            return;
        }

        let paint = stroke_paint(stroke);

        // A single-point tap renders as a dot of the stroke's width.
        if stroke.points.len() == 1 {
            let width = segment_width(stroke, stroke.points[0].pressure);
            let center = stroke.points[0].position();
            let mut builder = PathBuilder::new();
            builder.push_circle(center.x as f32, center.y as f32, (width / 2.0) as f32);
            if let Some(path) = builder.finish() {
                self.pixmap
                    .fill_path(&path, &paint, FillRule::Winding, transform, None);
            }
            return;
        }

        // Stroked segment-by-segment so per-point pressure produces the
        // same widths on a redraw as during live drawing.
        for idx in 1..stroke.points.len() {
            let segment = RenderSegment::bridge(&stroke.points, idx, stroke.smoothing);
            self.paint_segment(&segment, &paint, stroke, transform);
        }
    }

    fn paint_segment(
        &mut self,
        segment: &RenderSegment,
        paint: &Paint<'_>,
        stroke: &Stroke,
        transform: Transform,
    ) {
        let mut builder = PathBuilder::new();
        let pressure = match *segment {
            RenderSegment::Line { from, to, pressure } => {
                builder.move_to(from.x as f32, from.y as f32);
                builder.line_to(to.x as f32, to.y as f32);
                pressure
            }
            RenderSegment::Quad {
                from,
                ctrl,
                to,
                pressure,
            } => {
                builder.move_to(from.x as f32, from.y as f32);
                builder.quad_to(ctrl.x as f32, ctrl.y as f32, to.x as f32, to.y as f32);
                pressure
            }
        };

        let Some(path) = builder.finish() else {
            return;
        };

        let width = segment_width(stroke, pressure);
        self.pixmap
            .stroke_path(&path, paint, &line_style(width), transform, None);
    }
}

impl std::fmt::Debug for PixmapRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PixmapRenderer")
            .field("width", &self.width())
            .field("height", &self.height())
            .finish()
    }
}

fn camera_transform(camera: &Camera) -> Transform {
    Transform::from_translate(camera.pan.x as f32, camera.pan.y as f32)
        .pre_scale(camera.zoom as f32, camera.zoom as f32)
}

fn stroke_paint(stroke: &Stroke) -> Paint<'static> {
    let mut paint = Paint::default();
    let alpha = (stroke.color.a as f64 * stroke.opacity.clamp(0.0, 1.0)).round() as u8;
    paint.set_color_rgba8(stroke.color.r, stroke.color.g, stroke.color.b, alpha);
    paint.anti_alias = true;
    paint.blend_mode = match stroke.tool {
        StrokeTool::Pen => BlendMode::SourceOver,
        StrokeTool::Eraser => BlendMode::DestinationOut,
    };
    paint
}

fn segment_width(stroke: &Stroke, pressure: f64) -> f64 {
    if stroke.pressure_scaling {
        stroke.base_size * pressure
    } else {
        stroke.base_size
    }
}

fn line_style(width: f64) -> StrokeStyle {
    StrokeStyle {
        width: width as f32,
        line_cap: LineCap::Round,
        line_join: LineJoin::Round,
        ..StrokeStyle::default()
    }
}
