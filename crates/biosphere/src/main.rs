use std::path::PathBuf;

use anyhow::{Context, Result};
use biosphere_core::Difficulty;
use biosphere_creature::Region;
use clap::{Parser, Subcommand};

mod commands;
mod config;

use crate::config::GameConfig;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Configuration file (RON). Defaults to ./biosphere.ron when present
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Override the world save directory
    #[arg(long, global = true)]
    save_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List part definitions, optionally for one region
    Parts {
        /// body, eyes or fins
        #[arg(long)]
        region: Option<Region>,
    },

    /// List saved worlds
    Worlds,

    /// Create a new world with the starter creature
    Create {
        name: String,
        /// easy, medium or hard
        #[arg(long, default_value = "medium")]
        difficulty: Difficulty,
    },

    /// Show a world, its creature and the creature's stats
    Show { name: String },

    /// Select parts for a world's creature (one per region; later ids win)
    Select {
        world: String,
        #[arg(required = true)]
        parts: Vec<String>,
    },

    /// Remove the selected part for a region
    Clear { world: String, region: Region },

    /// Rename a world
    Rename { old: String, new: String },

    /// Delete a world
    Delete { name: String },

    /// Simulate gameplay without a window and save the play time
    Play {
        name: String,

        /// Seconds of gameplay to simulate
        #[arg(long, default_value = "10")]
        seconds: f32,

        /// Simulation frames per second
        #[arg(long, default_value = "60")]
        fps: u32,

        /// Forward input in [-1, 1]
        #[arg(long, default_value = "1.0", allow_hyphen_values = true)]
        forward: f32,

        /// Turn input in [-1, 1] (positive turns clockwise)
        #[arg(long, default_value = "0.0", allow_hyphen_values = true)]
        turn: f32,

        /// Pause after this many seconds; the remaining frames are skipped
        #[arg(long)]
        pause_after: Option<f32>,

        /// RNG seed for reproducible enemy spawns
        #[arg(long)]
        seed: Option<u64>,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => GameConfig::load_from(path)?,
        None => GameConfig::load()?,
    };
    if let Some(dir) = args.save_dir {
        config.world.save_dir = dir;
    }

    let default_level = if config.debug.verbose_logging {
        "debug"
    } else {
        "info"
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    log::debug!("Configuration: {:?}", config);

    let mut app = commands::App::new(&config).context("Failed to start BioSphere")?;

    let result = match args.command {
        Command::Parts { region } => app.parts(region),
        Command::Worlds => app.worlds(),
        Command::Create { name, difficulty } => app.create(&name, difficulty),
        Command::Show { name } => app.show(&name),
        Command::Select { world, parts } => app.select(&world, &parts),
        Command::Clear { world, region } => app.clear(&world, region),
        Command::Rename { old, new } => app.rename(&old, &new),
        Command::Delete { name } => app.delete(&name),
        Command::Play {
            name,
            seconds,
            fps,
            forward,
            turn,
            pause_after,
            seed,
        } => app.play(
            &name,
            commands::PlayOptions {
                seconds,
                fps,
                forward,
                turn,
                pause_after,
                seed,
            },
        ),
    };

    app.flush_notices();
    result
}
