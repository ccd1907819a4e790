//! Application entry point for the point-vortex viewer.
//!
//! Parses command-line options, builds a [`SimulationEngine`], and either
//! opens the eframe/egui [`Viewer`] or runs headless, logging every step.

mod frames;
mod headless;
mod viewer;

use std::path::PathBuf;

use anyhow::{Result, anyhow};
use clap::Parser;
use tracing::info;
use vortex_core::{SimConfig, SimulationEngine};

use frames::FrameWriter;
use viewer::Viewer;

#[derive(Parser, Debug)]
#[command(name = "vortex-view")]
#[command(about = "Simulate annihilating point vortices on a periodic square")]
struct Args {
    /// Side length of the periodic domain
    #[arg(long, default_value_t = 1e-2)]
    domain: f64,

    /// Charge-signed rotational drag
    #[arg(long, default_value_t = 0.03)]
    alpha: f64,

    /// Isotropic linear damping
    #[arg(long, default_value_t = 1.76e-2)]
    alphap: f64,

    /// Number of vortices placed at start
    #[arg(long, default_value_t = 50)]
    vortices: usize,

    /// Seed for initial placement and injection jitter
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Run without a window, logging diagnostics every step
    #[arg(long)]
    headless: bool,

    /// Stop after this many steps (headless only)
    #[arg(long)]
    max_steps: Option<u64>,

    /// Save a PNG frame for every step
    #[arg(long)]
    save: bool,

    /// Directory for saved frames
    #[arg(long, default_value = "output")]
    output: PathBuf,

    /// Width and height of saved frames in pixels
    #[arg(long, default_value_t = 512)]
    frame_size: u32,
}

impl Args {
    fn sim_config(&self) -> SimConfig {
        SimConfig {
            domain_size: self.domain,
            alpha: self.alpha,
            alphap: self.alphap,
            initial_vortices: self.vortices,
            seed: self.seed,
            ..SimConfig::default()
        }
    }
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();

    let mut engine = SimulationEngine::new(args.sim_config())?;
    let frames = if args.save {
        Some(FrameWriter::create(&args.output, args.frame_size)?)
    } else {
        None
    };
    if let Some(f) = &frames {
        info!(dir = %f.dir().display(), "Saving frames");
    }

    if args.headless {
        headless::run(&mut engine, frames, args.max_steps);
        return Ok(());
    }

    let options = eframe::NativeOptions::default();
    eframe::run_native(
        "Point Vortices",
        options,
        Box::new(|_cc| Ok(Box::new(Viewer::new(engine, frames)))),
    )
    .map_err(|e| anyhow!("viewer failed: {e}"))
}
