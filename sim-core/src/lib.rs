//! Point-vortex gas on a periodic square domain.
//!
//! Main components:
//! - [`store`] — per-slot positions, velocities and charges, with tombstones.
//! - [`kernel`] — induced velocity summed over periodic images.
//! - [`annihilation`] — removal of close opposite-sign pairs.
//! - [`dissipation`] — mutual-friction drag on velocities.
//! - [`integrator`] — position update and periodic wrap.
//! - [`population`] — injection of new dipole rows.
//! - [`engine`] — the fixed-timestep loop and step reports.
//! - [`config`] / [`error`] — simulation parameters and their validation.
//! - [`types`] — slot ids and charges.

pub mod annihilation;
pub mod config;
pub mod dissipation;
pub mod engine;
pub mod error;
pub mod integrator;
pub mod kernel;
pub mod population;
pub mod rng;
pub mod store;
pub mod types;

pub use config::SimConfig;
pub use engine::{RunSummary, SimulationEngine, StepObserver, StepReport, StopReason};
pub use error::ConfigError;
