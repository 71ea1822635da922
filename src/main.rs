mod app;
mod input;
mod render;
mod settings;

use anyhow::Result;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub(crate) enum Preset {
    /// rare, wide-kinked strikes with a screen flash
    Classic,
    /// frequent, tighter strikes, no flash
    Storm,
}

#[derive(Parser, Debug, Clone)]
#[command(name = "boltfall")]
#[command(about = "Branching lightning falling through your terminal", long_about = None)]
pub(crate) struct Args {
    /// Frame rate; the storm ticks once per frame
    #[arg(long)]
    pub(crate) fps: Option<u32>,

    /// Seed for a reproducible storm
    #[arg(long)]
    pub(crate) seed: Option<u64>,

    /// Tuning preset, replaces the settings file's lightning section
    #[arg(long, value_enum)]
    pub(crate) preset: Option<Preset>,

    /// Settings file (JSON). Defaults to the platform config directory
    #[arg(long)]
    pub(crate) config: Option<PathBuf>,

    /// Keep a lit floor along the bottom row
    #[arg(long, default_value_t = false)]
    pub(crate) floor: bool,

    /// Hide the status line
    #[arg(long, default_value_t = false)]
    pub(crate) no_hud: bool,

    /// Run this many ticks without a terminal and print the last frame
    #[arg(long, value_name = "TICKS")]
    pub(crate) headless: Option<u64>,

    /// Sky width in pixels for --headless
    #[arg(long, default_value_t = 96)]
    pub(crate) width: usize,

    /// Sky height in pixels for --headless
    #[arg(long, default_value_t = 40)]
    pub(crate) height: usize,

    /// Write the effective settings to the settings file and exit
    #[arg(long, default_value_t = false)]
    pub(crate) write_config: bool,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let args = Args::parse();
    app::run(args)
}
