//! Headless widget-to-PNG render command

use super::simulate::{load_config, load_sprite};
use crate::raster::RasterCanvas;
use anyhow::{Context, Result};
use image::{Rgba, RgbaImage};
use pinwheel_core::{Color, Rect, Sprite};
use pinwheel_runtime::FrameClock;
use pinwheel_widget::PinWheelWidget;
use std::path::PathBuf;
use std::time::Duration;

const FRAME: Duration = Duration::from_millis(16);

pub struct RenderArgs {
    pub output: PathBuf,
    pub ms: u64,
    pub size: u32,
    pub seed: Option<u64>,
    pub density: f32,
    pub progress: f32,
    pub stop_at: Option<u64>,
    pub config: Option<PathBuf>,
    pub pinwheel: Option<PathBuf>,
    pub particle: Option<PathBuf>,
}

pub fn run(args: RenderArgs) -> Result<()> {
    let config = load_config(args.config.as_ref())?;
    let pinwheel = load_sprite(args.pinwheel.as_ref(), pinwheel_sprite(128))?;
    let particle = load_sprite(args.particle.as_ref(), dot_sprite(8))?;

    let mut widget = PinWheelWidget::new();
    widget.set_bounds(Rect::new(0.0, 0.0, args.size as f32, args.size as f32));
    widget.set_particle_config(config);
    if let Some(seed) = args.seed {
        widget.set_seed(seed);
    }
    widget.init(args.density, pinwheel, Some(particle));
    widget.set_progress(args.progress);
    widget.start();

    let mut clock = FrameClock::with_fixed_step(FRAME);
    let mut elapsed = Duration::ZERO;
    let total = Duration::from_millis(args.ms);
    let stop_at = args.stop_at.map(Duration::from_millis);
    while elapsed < total {
        clock.tick_by(FRAME);
        while clock.should_step() {
            let dt = clock.consume_step();
            widget.advance(dt);
            elapsed += dt;
            if stop_at.is_some_and(|at| elapsed >= at) && widget.is_running() {
                widget.stop_at(args.progress);
            }
        }
    }

    let mut canvas = RasterCanvas::new(args.size, args.size, Color::BLACK);
    widget.draw(&mut canvas);
    let active = widget.particles().map_or(0, |p| p.active_count());
    widget.free();

    canvas
        .into_image()
        .save(&args.output)
        .with_context(|| format!("Failed to save image to {}", args.output.display()))?;
    println!(
        "Rendered {}x{} after {} ms ({} particles) to {}",
        args.size,
        args.size,
        args.ms,
        active,
        args.output.display()
    );
    Ok(())
}

/// Four alternating white blades
fn pinwheel_sprite(size: u32) -> Sprite {
    let c = size as f32 / 2.0;
    let image = RgbaImage::from_fn(size, size, |x, y| {
        let (dx, dy) = (x as f32 + 0.5 - c, y as f32 + 0.5 - c);
        let angle = dy.atan2(dx).to_degrees().rem_euclid(90.0);
        if (dx * dx + dy * dy).sqrt() <= c && angle < 45.0 {
            Rgba([255, 255, 255, 255])
        } else {
            Rgba([0, 0, 0, 0])
        }
    });
    Sprite::new(image)
}

/// Round dot fading towards its edge
fn dot_sprite(size: u32) -> Sprite {
    let c = size as f32 / 2.0;
    let image = RgbaImage::from_fn(size, size, |x, y| {
        let d = ((x as f32 + 0.5 - c).powi(2) + (y as f32 + 0.5 - c).powi(2)).sqrt() / c;
        let a = ((1.0 - d).clamp(0.0, 1.0) * 255.0) as u8;
        Rgba([255, 255, 255, a])
    });
    Sprite::new(image)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pinwheel_sprite_has_blades_and_gaps() {
        let sprite = pinwheel_sprite(64);
        let image = sprite.image();
        // Just below the +x axis (clockwise) is a blade, just above is a gap
        assert_eq!(image.get_pixel(50, 34).0[3], 255);
        assert_eq!(image.get_pixel(50, 29).0[3], 0);
    }

    #[test]
    fn dot_is_opaque_in_the_middle() {
        let sprite = dot_sprite(8);
        assert!(sprite.image().get_pixel(4, 4).0[3] > 150);
        assert_eq!(sprite.image().get_pixel(0, 0).0[3], 0);
    }

    #[test]
    fn renders_png() {
        let output = std::env::temp_dir().join(format!("pinwheel-render-{}.png", std::process::id()));
        run(RenderArgs {
            output: output.clone(),
            ms: 300,
            size: 64,
            seed: Some(1),
            density: 1.0,
            progress: 50.0,
            stop_at: None,
            config: None,
            pinwheel: None,
            particle: None,
        })
        .unwrap();
        let image = image::open(&output).unwrap();
        assert_eq!(image.width(), 64);
        std::fs::remove_file(output).ok();
    }
}
