//! Fixed-timestep driver for the vortex gas.
//!
//! One call to [`SimulationEngine::step`] runs, in order:
//! 1. injection + annihilation, if more than `inject_interval` of
//!    simulated time has passed since the last injection;
//! 2. [`kernel::compute_velocities`];
//! 3. [`dissipation::apply_dissipation`];
//! 4. [`integrator::advance`];
//! 5. [`annihilation::annihilate`];
//! 6. [`integrator::wrap_positions`];
//! 7. time advance and a [`StepReport`] for observers.
//!
//! The run ends when no active vortex is left.

use std::ops::ControlFlow;
use std::time::{Duration, Instant};

use rand_chacha::ChaCha12Rng;
use tracing::{debug, info, warn};

use crate::{
    annihilation, config::SimConfig, dissipation, error::ConfigError, integrator, kernel,
    population::{self, InjectionOutcome},
    rng::create_rng,
    store::VortexStore,
};

/// Diagnostics for a single completed step.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StepReport {
    /// Index of the step, starting at 0.
    pub step: u64,
    /// Simulated time after the step.
    pub time: f64,
    /// Active vortices after the step (total unsigned charge).
    pub active: usize,
    /// Allocated slots after the step, tombstones included.
    pub capacity: usize,
    /// Pairs annihilated during the step, across both sweeps.
    pub annihilated: usize,
    pub injection: Option<InjectionOutcome>,
    /// Pair distances clamped by the singularity guard.
    pub clamped_pairs: u32,
    /// Wall-clock time spent computing the step.
    pub latency: Duration,
}

/// Why [`SimulationEngine::run`] returned.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StopReason {
    /// Every vortex has been annihilated.
    Extinct,
    /// The observer asked to stop.
    Observer,
    /// The step limit was reached.
    StepLimit,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RunSummary {
    pub steps: u64,
    pub reason: StopReason,
}

/// Receives a callback after every completed step.
///
/// Returning [`ControlFlow::Break`] stops [`SimulationEngine::run`] once
/// the current step is done.
pub trait StepObserver {
    fn on_step(&mut self, engine: &SimulationEngine, report: &StepReport) -> ControlFlow<()>;
}

impl<F> StepObserver for F
where
    F: FnMut(&SimulationEngine, &StepReport) -> ControlFlow<()>,
{
    fn on_step(&mut self, engine: &SimulationEngine, report: &StepReport) -> ControlFlow<()> {
        self(engine, report)
    }
}

/// Owns the vortex store and advances it one timestep at a time.
#[derive(Debug)]
pub struct SimulationEngine {
    store: VortexStore,
    cfg: SimConfig,
    rng: ChaCha12Rng,
    time: f64,
    last_injection: f64,
    steps: u64,
}

impl SimulationEngine {
    /// Validates `cfg` and places `cfg.initial_vortices` random vortices.
    pub fn new(cfg: SimConfig) -> Result<Self, ConfigError> {
        cfg.validate()?;
        let mut rng = create_rng(cfg.seed);
        let store = VortexStore::random_dipoles(cfg.initial_vortices, cfg.domain_size, &mut rng);
        Ok(Self::assemble(store, cfg, rng))
    }

    /// Validates `cfg` and starts from an explicit store.
    ///
    /// `cfg.initial_vortices` is ignored.
    pub fn with_store(cfg: SimConfig, store: VortexStore) -> Result<Self, ConfigError> {
        cfg.validate()?;
        let rng = create_rng(cfg.seed);
        Ok(Self::assemble(store, cfg, rng))
    }

    fn assemble(store: VortexStore, cfg: SimConfig, rng: ChaCha12Rng) -> Self {
        info!(
            vortices = store.active_count(),
            domain = cfg.domain_size,
            dt = cfg.dt,
            seed = cfg.seed,
            "Simulation initialised"
        );
        Self {
            store,
            cfg,
            rng,
            time: 0.0,
            last_injection: 0.0,
            steps: 0,
        }
    }

    /// Rebuilds the initial state from the current configuration.
    pub fn reset(&mut self) {
        let mut rng = create_rng(self.cfg.seed);
        let store =
            VortexStore::random_dipoles(self.cfg.initial_vortices, self.cfg.domain_size, &mut rng);
        *self = Self::assemble(store, self.cfg.clone(), rng);
    }

    /// Replaces the configuration, keeping the current vortices.
    pub fn set_config(&mut self, cfg: SimConfig) -> Result<(), ConfigError> {
        cfg.validate()?;
        self.cfg = cfg;
        Ok(())
    }

    pub fn store(&self) -> &VortexStore {
        &self.store
    }

    pub fn config(&self) -> &SimConfig {
        &self.cfg
    }

    /// Simulated time elapsed.
    pub fn time(&self) -> f64 {
        self.time
    }

    /// Number of completed steps.
    pub fn steps(&self) -> u64 {
        self.steps
    }

    /// `true` once the total unsigned charge is zero.
    pub fn is_extinct(&self) -> bool {
        self.store.active_count() == 0
    }

    /// Advances the simulation by one timestep.
    pub fn step(&mut self) -> StepReport {
        let started = Instant::now();
        let mut annihilated = 0;

        let injection = if self.cfg.inject_pairs > 0
            && self.time - self.last_injection > self.cfg.inject_interval
        {
            let npairs = self.cfg.inject_pairs;
            let outcome = population::inject(&mut self.store, npairs, &self.cfg, &mut self.rng);
            annihilated += annihilation::annihilate(&mut self.store, &self.cfg);
            self.last_injection = self.time;
            info!(
                time = self.time,
                ?outcome,
                capacity = self.store.capacity(),
                "Injected dipole row"
            );
            Some(outcome)
        } else {
            None
        };

        let clamped_pairs = kernel::compute_velocities(&mut self.store, &self.cfg);
        if clamped_pairs > 0 {
            warn!(
                step = self.steps,
                clamped_pairs, "Near-coincident vortices hit the separation floor"
            );
        }
        dissipation::apply_dissipation(&mut self.store, &self.cfg);
        integrator::advance(&mut self.store, &self.cfg);
        annihilated += annihilation::annihilate(&mut self.store, &self.cfg);
        integrator::wrap_positions(&mut self.store, &self.cfg);

        self.time += self.cfg.dt;
        let report = StepReport {
            step: self.steps,
            time: self.time,
            active: self.store.active_count(),
            capacity: self.store.capacity(),
            annihilated,
            injection,
            clamped_pairs,
            latency: started.elapsed(),
        };
        self.steps += 1;

        debug!(
            step = report.step,
            time = report.time,
            active = report.active,
            capacity = report.capacity,
            annihilated = report.annihilated,
            latency_us = report.latency.as_micros() as u64,
            "Step complete"
        );
        if report.active == 0 {
            info!(step = report.step, time = report.time, "All vortices annihilated");
        }

        report
    }

    /// Steps until extinction, an observer break, or `max_steps` steps.
    pub fn run(&mut self, observer: &mut impl StepObserver, max_steps: Option<u64>) -> RunSummary {
        let mut steps = 0;
        loop {
            if max_steps.is_some_and(|limit| steps >= limit) {
                return RunSummary {
                    steps,
                    reason: StopReason::StepLimit,
                };
            }
            let report = self.step();
            steps += 1;

            if observer.on_step(self, &report).is_break() {
                return RunSummary {
                    steps,
                    reason: StopReason::Observer,
                };
            }
            if self.is_extinct() {
                return RunSummary {
                    steps,
                    reason: StopReason::Extinct,
                };
            }
        }
    }
}
