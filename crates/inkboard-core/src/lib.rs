//! Inkboard Core Library
//!
//! Platform-agnostic model and state machines for the inkboard freehand
//! drawing canvas: coordinate mapping, input normalization, stroke
//! building, viewport transform, pinch gestures, and bounded undo/redo.

pub mod builder;
pub mod camera;
pub mod canvas;
pub mod gesture;
pub mod history;
pub mod input;
pub mod stroke;

pub use builder::{RenderSegment, StrokeBuilder};
pub use camera::Camera;
pub use canvas::{
    Canvas, CanvasError, CanvasEvent, CanvasOptions, CanvasSize, ExportData, RenderAction, ToolKind,
};
pub use gesture::{GestureDetector, PinchUpdate};
pub use history::History;
pub use input::{InputCapabilities, InputNormalizer, NormalizedInput, PointerDevice, PointerPhase, PointerSample, RawPointerEvent};
pub use stroke::{Rgba, Stroke, StrokeId, StrokePoint, StrokeTool};
