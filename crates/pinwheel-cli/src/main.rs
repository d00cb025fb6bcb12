//! Pinwheel CLI - run the particle engine and the widget headless

mod commands;
mod headless;
mod raster;

use anyhow::Result;
use clap::{Parser, Subcommand};
use commands::{preset, render, simulate};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "pinwheel")]
#[command(about = "Headless driver for the pinwheel particle widget", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the particle engine and print pool statistics
    Simulate {
        /// Particle config TOML (defaults to the built-in preset)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Particle sprite image
        #[arg(long)]
        sprite: Option<PathBuf>,

        /// Real milliseconds to run
        #[arg(long, default_value = "2000")]
        ms: u64,

        /// Random seed for reproducible runs
        #[arg(long)]
        seed: Option<u64>,

        /// Emit once and cancel after the particle lifetime
        #[arg(long)]
        one_shot: bool,

        /// Stop emitting after this many real milliseconds
        #[arg(long)]
        stop_at: Option<u64>,

        /// Side of the square container in pixels
        #[arg(long, default_value = "200")]
        size: u32,

        /// Output format (text or json)
        #[arg(long, default_value = "text", value_parser = parse_format)]
        format: String,
    },

    /// Run the widget start animation and save the last frame as PNG
    Render {
        /// Output image path
        #[arg(short, long, default_value = "pinwheel.png")]
        output: PathBuf,

        /// Real milliseconds to animate before capturing
        #[arg(long, default_value = "1000")]
        ms: u64,

        /// Image width and height in pixels
        #[arg(long, default_value = "256")]
        size: u32,

        /// Random seed for reproducible runs
        #[arg(long)]
        seed: Option<u64>,

        /// Display density (dp to px factor)
        #[arg(long, default_value = "1.0")]
        density: f32,

        /// Progress shown before start and restored on stop
        #[arg(long, default_value = "60")]
        progress: f32,

        /// Call stop after this many milliseconds
        #[arg(long)]
        stop_at: Option<u64>,

        /// Particle config TOML (defaults to the built-in preset)
        #[arg(long)]
        config: Option<PathBuf>,

        /// Pinwheel sprite image
        #[arg(long)]
        pinwheel: Option<PathBuf>,

        /// Particle sprite image
        #[arg(long)]
        particle: Option<PathBuf>,
    },

    /// Print the built-in particle preset as TOML
    Preset,
}

fn parse_format(s: &str) -> Result<String, String> {
    match s {
        "text" | "json" => Ok(s.to_string()),
        _ => Err(format!("unknown format '{}'; valid values: text, json", s)),
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Simulate {
            config,
            sprite,
            ms,
            seed,
            one_shot,
            stop_at,
            size,
            format,
        } => simulate::run(simulate::SimulateArgs {
            config,
            sprite,
            ms,
            seed,
            one_shot,
            stop_at,
            size,
            format,
        }),
        Commands::Render {
            output,
            ms,
            size,
            seed,
            density,
            progress,
            stop_at,
            config,
            pinwheel,
            particle,
        } => render::run(render::RenderArgs {
            output,
            ms,
            size,
            seed,
            density,
            progress,
            stop_at,
            config,
            pinwheel,
            particle,
        }),
        Commands::Preset => preset::run(),
    }
}
