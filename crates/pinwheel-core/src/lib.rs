//! Pinwheel Core - Foundational types for the pinwheel widget
//!
//! This crate provides the types every other pinwheel crate depends on:
//! - `Rect`, `Color` - Geometry and color types
//! - `Sprite` - Immutable shared raster image
//! - `Canvas`, `Paint` - Draw command sink implemented by the host
//! - Error types and Result alias

mod canvas;
mod error;
mod sprite;
mod types;

pub use canvas::{Canvas, DrawCommand, Paint, PaintStyle, RecordingCanvas, StrokeCap};
pub use error::{PinwheelError, Result};
pub use sprite::Sprite;
pub use types::{Color, Rect};
