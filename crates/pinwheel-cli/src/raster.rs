//! Software canvas rasterizing draw calls onto an RGBA image

use glam::{Affine2, Vec2};
use image::{Rgba, RgbaImage};
use pinwheel_core::{Canvas, Color, Paint, PaintStyle, Rect, Sprite};

pub struct RasterCanvas {
    image: RgbaImage,
}

impl RasterCanvas {
    pub fn new(width: u32, height: u32, background: Color) -> Self {
        Self {
            image: RgbaImage::from_pixel(width, height, Rgba(background.to_rgba8())),
        }
    }

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn into_image(self) -> RgbaImage {
        self.image
    }

    /// Source-over blend of `src` scaled by `opacity` (0..=1)
    fn blend(&mut self, x: i64, y: i64, src: [u8; 4], opacity: f32) {
        if x < 0 || y < 0 || x >= self.image.width() as i64 || y >= self.image.height() as i64 {
            return;
        }
        let a = src[3] as f32 / 255.0 * opacity;
        if a <= 0.0 {
            return;
        }
        let dst = self.image.get_pixel_mut(x as u32, y as u32);
        for c in 0..3 {
            dst.0[c] = (src[c] as f32 * a + dst.0[c] as f32 * (1.0 - a)).round() as u8;
        }
        let dst_a = dst.0[3] as f32 / 255.0;
        dst.0[3] = ((a + dst_a * (1.0 - a)) * 255.0).round() as u8;
    }

    /// Clamp a float pixel range to the image
    fn span(&self, min: f32, max: f32, limit: u32) -> std::ops::Range<i64> {
        let lo = min.floor().max(0.0) as i64;
        let hi = (max.ceil() as i64).min(limit as i64);
        lo..hi.max(lo)
    }
}

fn paint_rgba(paint: &Paint) -> [u8; 4] {
    paint.color.to_rgba8()
}

/// Whether `angle` lies in the arc starting at `start` spanning `sweep` degrees
fn in_sweep(angle: f32, start: f32, sweep: f32) -> bool {
    if sweep.abs() >= 360.0 {
        return true;
    }
    let (from, span) = if sweep < 0.0 {
        (start + sweep, -sweep)
    } else {
        (start, sweep)
    };
    (angle - from).rem_euclid(360.0) <= span
}

impl Canvas for RasterCanvas {
    fn draw_image(&mut self, sprite: &Sprite, transform: Affine2, paint: &Paint) {
        let (w, h) = (sprite.width() as f32, sprite.height() as f32);
        if w == 0.0 || h == 0.0 || transform.matrix2.determinant().abs() < f32::EPSILON {
            return;
        }

        let corners = [
            Vec2::ZERO,
            Vec2::new(w, 0.0),
            Vec2::new(0.0, h),
            Vec2::new(w, h),
        ]
        .map(|c| transform.transform_point2(c));
        let min = corners.iter().fold(Vec2::splat(f32::MAX), |m, c| m.min(*c));
        let max = corners.iter().fold(Vec2::splat(f32::MIN), |m, c| m.max(*c));

        let inverse = transform.inverse();
        let opacity = paint.alpha as f32 / 255.0;
        let src = sprite.image();
        for y in self.span(min.y, max.y, self.image.height()) {
            for x in self.span(min.x, max.x, self.image.width()) {
                let p = inverse.transform_point2(Vec2::new(x as f32 + 0.5, y as f32 + 0.5));
                if p.x < 0.0 || p.y < 0.0 || p.x >= w || p.y >= h {
                    continue;
                }
                let texel = src.get_pixel(p.x as u32, p.y as u32).0;
                self.blend(x, y, texel, opacity);
            }
        }
    }

    fn draw_arc(&mut self, oval: Rect, start_deg: f32, sweep_deg: f32, paint: &Paint) {
        let center = oval.center();
        let radius = oval.width().min(oval.height()) / 2.0;
        let half = (paint.stroke_width / 2.0).max(0.5);
        let rgba = paint_rgba(paint);
        let opacity = paint.alpha as f32 / 255.0;

        for y in self.span(center.y - radius - half, center.y + radius + half, self.image.height()) {
            for x in self.span(center.x - radius - half, center.x + radius + half, self.image.width()) {
                let d = Vec2::new(x as f32 + 0.5, y as f32 + 0.5) - center;
                if (d.length() - radius).abs() > half {
                    continue;
                }
                let angle = d.y.atan2(d.x).to_degrees();
                if in_sweep(angle, start_deg, sweep_deg) {
                    self.blend(x, y, rgba, opacity);
                }
            }
        }
    }

    fn draw_circle(&mut self, center: Vec2, radius: f32, paint: &Paint) {
        let half = (paint.stroke_width / 2.0).max(0.5);
        let rgba = paint_rgba(paint);
        let opacity = paint.alpha as f32 / 255.0;
        let outer = radius + half;

        for y in self.span(center.y - outer, center.y + outer, self.image.height()) {
            for x in self.span(center.x - outer, center.x + outer, self.image.width()) {
                let dist = (Vec2::new(x as f32 + 0.5, y as f32 + 0.5) - center).length();
                let hit = match paint.style {
                    PaintStyle::Fill => dist <= radius,
                    PaintStyle::Stroke => (dist - radius).abs() <= half,
                };
                if hit {
                    self.blend(x, y, rgba, opacity);
                }
            }
        }
    }
}
