//! Inkboard Raster Library
//!
//! CPU render pipeline for the inkboard drawing canvas, plus the
//! [`DrawingEngine`] facade that ties the core state machine to a
//! framebuffer.

pub mod engine;
pub mod renderer;

pub use engine::DrawingEngine;
pub use renderer::{ImageFormat, PixmapRenderer, RenderError, RenderResult};
