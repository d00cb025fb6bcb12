//! Immutable raster image shared between particles and widgets

use crate::error::Result;
use crate::types::Color;
use glam::Vec2;
use image::RgbaImage;

/// A fixed-size RGBA image. Shared behind `Arc` by every particle that draws it.
#[derive(Debug, Clone)]
pub struct Sprite {
    image: RgbaImage,
}

impl Sprite {
    pub fn new(image: RgbaImage) -> Self {
        Self { image }
    }

    /// Decode an encoded image (PNG, JPEG, ...) into RGBA
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        let image = image::load_from_memory(bytes)?.to_rgba8();
        Ok(Self { image })
    }

    /// Load and decode an image file from disk
    pub fn open(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let bytes = std::fs::read(path)?;
        Self::decode(&bytes)
    }

    /// A single-color sprite
    pub fn solid(width: u32, height: u32, color: Color) -> Self {
        let px = image::Rgba(color.to_rgba8());
        Self {
            image: RgbaImage::from_pixel(width, height, px),
        }
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// Half width/height, truncated to whole pixels
    pub fn half_extents(&self) -> Vec2 {
        Vec2::new((self.width() / 2) as f32, (self.height() / 2) as f32)
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }
}
