//! Draw command sink implemented by the host platform

use crate::sprite::Sprite;
use crate::types::{Color, Rect};
use glam::{Affine2, Vec2};

/// How stroked line ends are finished
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StrokeCap {
    Butt,
    #[default]
    Round,
    Square,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PaintStyle {
    #[default]
    Fill,
    Stroke,
}

/// Paint state for a single draw call
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Paint {
    pub color: Color,
    /// Extra opacity applied on top of `color.a`, 0..=255
    pub alpha: u8,
    pub style: PaintStyle,
    pub stroke_width: f32,
    pub cap: StrokeCap,
}

impl Default for Paint {
    fn default() -> Self {
        Self {
            color: Color::WHITE,
            alpha: 255,
            style: PaintStyle::Fill,
            stroke_width: 0.0,
            cap: StrokeCap::Round,
        }
    }
}

impl Paint {
    pub fn stroke(color: Color, width: f32, cap: StrokeCap) -> Self {
        Self {
            color,
            style: PaintStyle::Stroke,
            stroke_width: width,
            cap,
            ..Self::default()
        }
    }

    pub fn with_alpha(alpha: u8) -> Self {
        Self {
            alpha,
            ..Self::default()
        }
    }
}

/// Receives draw calls. Angles are in degrees, clockwise from the +x axis.
pub trait Canvas {
    /// Draw `sprite` with `transform` mapping image pixels to canvas pixels
    fn draw_image(&mut self, sprite: &Sprite, transform: Affine2, paint: &Paint);

    fn draw_arc(&mut self, oval: Rect, start_deg: f32, sweep_deg: f32, paint: &Paint);

    fn draw_circle(&mut self, center: Vec2, radius: f32, paint: &Paint);
}

/// One recorded draw call
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCommand {
    Image {
        width: u32,
        height: u32,
        transform: Affine2,
        alpha: u8,
    },
    Arc {
        oval: Rect,
        start_deg: f32,
        sweep_deg: f32,
        paint: Paint,
    },
    Circle {
        center: Vec2,
        radius: f32,
        paint: Paint,
    },
}

/// A canvas that just records every call, for headless hosts and tests
#[derive(Debug, Default)]
pub struct RecordingCanvas {
    pub commands: Vec<DrawCommand>,
}

impl RecordingCanvas {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.commands.clear();
    }

    pub fn image_count(&self) -> usize {
        self.commands
            .iter()
            .filter(|c| matches!(c, DrawCommand::Image { .. }))
            .count()
    }

    pub fn arcs(&self) -> impl Iterator<Item = (Rect, f32, f32)> + '_ {
        self.commands.iter().filter_map(|c| match c {
            DrawCommand::Arc {
                oval,
                start_deg,
                sweep_deg,
                ..
            } => Some((*oval, *start_deg, *sweep_deg)),
            _ => None,
        })
    }
}

impl Canvas for RecordingCanvas {
    fn draw_image(&mut self, sprite: &Sprite, transform: Affine2, paint: &Paint) {
        self.commands.push(DrawCommand::Image {
            width: sprite.width(),
            height: sprite.height(),
            transform,
            alpha: paint.alpha,
        });
    }

    fn draw_arc(&mut self, oval: Rect, start_deg: f32, sweep_deg: f32, paint: &Paint) {
        self.commands.push(DrawCommand::Arc {
            oval,
            start_deg,
            sweep_deg,
            paint: *paint,
        });
    }

    fn draw_circle(&mut self, center: Vec2, radius: f32, paint: &Paint) {
        self.commands.push(DrawCommand::Circle {
            center,
            radius,
            paint: *paint,
        });
    }
}
