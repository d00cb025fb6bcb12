//! Headless particle engine run

use crate::headless::HeadlessSurface;
use anyhow::{Context, Result};
use pinwheel_core::{Color, Rect, Sprite};
use pinwheel_particles::{ParticleConfig, ParticleSystem};
use pinwheel_runtime::{Animated, FrameClock};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Host frame length
const FRAME: Duration = Duration::from_millis(16);
/// Engine ticks are scheduled in whole milliseconds
const STEP: Duration = Duration::from_millis(1);
const SAMPLE_EVERY_MS: u64 = 100;

pub struct SimulateArgs {
    pub config: Option<PathBuf>,
    pub sprite: Option<PathBuf>,
    pub ms: u64,
    pub seed: Option<u64>,
    pub one_shot: bool,
    pub stop_at: Option<u64>,
    pub size: u32,
    pub format: String,
}

#[derive(Debug, Serialize)]
struct Sample {
    real_ms: u64,
    virtual_ms: u64,
    state: String,
    active: usize,
    free: usize,
    activated: usize,
}

pub fn load_config(path: Option<&PathBuf>) -> Result<ParticleConfig> {
    match path {
        Some(path) => {
            let source = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            ParticleConfig::from_toml_str(&source)
                .with_context(|| format!("Invalid particle config {}", path.display()))
        }
        None => Ok(ParticleConfig::pinwheel()),
    }
}

pub fn load_sprite(path: Option<&PathBuf>, fallback: Sprite) -> Result<Arc<Sprite>> {
    match path {
        Some(path) => {
            let sprite = Sprite::open(path)
                .with_context(|| format!("Failed to load sprite {}", path.display()))?;
            Ok(Arc::new(sprite))
        }
        None => Ok(Arc::new(fallback)),
    }
}

pub fn run(args: SimulateArgs) -> Result<()> {
    let config = load_config(args.config.as_ref())?;
    let sprite = load_sprite(args.sprite.as_ref(), Sprite::solid(8, 8, Color::WHITE))?;

    let size = args.size as f32;
    let surface = HeadlessSurface::new(Rect::new(0.0, 0.0, size, size));
    let mut system = ParticleSystem::from_config(&config, Some(sprite));
    if let Some(seed) = args.seed {
        system = system.with_seed(seed);
    }
    system.set_parent(Box::new(surface.clone()));

    if args.one_shot {
        system.one_shot();
    } else {
        system.emit();
    }
    log::info!(
        "simulating {} ms: {} particles, ttl {} ms",
        args.ms,
        config.max_particles,
        config.time_to_live
    );

    let samples = drive(&mut system, &args);

    if args.format == "json" {
        println!("{}", serde_json::to_string_pretty(&samples)?);
    } else {
        println!(
            "{:>8} {:>10} {:>18} {:>7} {:>5} {:>10}",
            "real", "virtual", "state", "active", "free", "activated"
        );
        for s in &samples {
            println!(
                "{:>6}ms {:>8}ms {:>18} {:>7} {:>5} {:>10}",
                s.real_ms, s.virtual_ms, s.state, s.active, s.free, s.activated
            );
        }
        println!(
            "mounted: {}, redraw requests: {}",
            surface.is_mounted(),
            surface.redraws()
        );
    }

    system.free();
    Ok(())
}

/// Feed host frames through a fixed-step clock, sampling every 100 ms
fn drive(system: &mut ParticleSystem, args: &SimulateArgs) -> Vec<Sample> {
    let mut clock = FrameClock::with_fixed_step(STEP);
    let mut samples = Vec::new();
    let mut elapsed_ms = 0;

    while elapsed_ms < args.ms {
        clock.tick_by(FRAME);
        while clock.should_step() && elapsed_ms < args.ms {
            let dt = clock.consume_step();
            system.advance(dt);
            elapsed_ms += 1;

            if args.stop_at == Some(elapsed_ms) {
                log::info!("stop emitting at {elapsed_ms} ms");
                system.stop_emitting();
            }
            if elapsed_ms % SAMPLE_EVERY_MS == 0 {
                samples.push(sample(system, elapsed_ms));
            }
        }
        if args.one_shot && system.is_idle() && elapsed_ms > 0 {
            samples.push(sample(system, elapsed_ms));
            break;
        }
    }
    samples
}

fn sample(system: &ParticleSystem, real_ms: u64) -> Sample {
    Sample {
        real_ms,
        virtual_ms: system.virtual_time_ms(),
        state: format!("{:?}", system.state()),
        active: system.active_count(),
        free: system.free_count(),
        activated: system.activated_count(),
    }
}
