//! Window-less runner that logs step diagnostics and optionally saves frames.

use std::ops::ControlFlow;

use tracing::{error, info};
use vortex_core::{RunSummary, SimulationEngine, StepObserver, StepReport};

use crate::frames::FrameWriter;

/// Logs each step and writes a PNG frame when a [`FrameWriter`] is set.
pub struct HeadlessObserver {
    frames: Option<FrameWriter>,
    saved: u64,
}

impl HeadlessObserver {
    pub fn new(frames: Option<FrameWriter>) -> Self {
        Self { frames, saved: 0 }
    }

    /// Number of frames written so far.
    pub fn saved(&self) -> u64 {
        self.saved
    }
}

impl StepObserver for HeadlessObserver {
    fn on_step(&mut self, engine: &SimulationEngine, report: &StepReport) -> ControlFlow<()> {
        info!(
            frame = report.step,
            latency_s = report.latency.as_secs_f64(),
            t = report.time,
            active = report.active,
            capacity = report.capacity,
            "step"
        );

        if let Some(frames) = &self.frames {
            match frames.save(engine.store(), engine.config().domain_size, report.step) {
                Ok(_) => self.saved += 1,
                Err(err) => {
                    error!(error = %err, "Stopping: could not save frame");
                    return ControlFlow::Break(());
                }
            }
        }
        ControlFlow::Continue(())
    }
}

/// Runs the engine without a window until extinction or `max_steps`.
pub fn run(
    engine: &mut SimulationEngine,
    frames: Option<FrameWriter>,
    max_steps: Option<u64>,
) -> RunSummary {
    let mut observer = HeadlessObserver::new(frames);
    let summary = engine.run(&mut observer, max_steps);
    info!(
        steps = summary.steps,
        reason = ?summary.reason,
        frames = observer.saved(),
        "Headless run finished"
    );
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use vortex_core::{SimConfig, StopReason};

    #[test]
    fn headless_run_saves_one_frame_per_step() {
        let dir = tempfile::tempdir().unwrap();
        let frames = FrameWriter::create(dir.path(), 32).unwrap();
        let mut engine = SimulationEngine::new(SimConfig::default()).unwrap();

        let summary = run(&mut engine, Some(frames), Some(3));

        assert_eq!(summary.reason, StopReason::StepLimit);
        for i in 0..3 {
            assert!(dir.path().join(format!("frame{i:08}.png")).exists());
        }
    }

    #[test]
    fn observer_counts_saved_frames() {
        let dir = tempfile::tempdir().unwrap();
        let frames = FrameWriter::create(dir.path(), 8).unwrap();
        let mut engine = SimulationEngine::new(SimConfig::default()).unwrap();
        let mut observer = HeadlessObserver::new(Some(frames));

        engine.run(&mut observer, Some(2));

        assert_eq!(observer.saved(), 2);
    }
}
