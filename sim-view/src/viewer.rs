//! Interactive vortex-gas viewer built with eframe/egui.
//!
//! This module defines [`Viewer`], which owns a [`SimulationEngine`] and
//! implements [`eframe::App`] to render and control it through an egui UI.

use eframe::App;
use glam::DVec2;
use tracing::{error, warn};
use vortex_core::{
    SimConfig, SimulationEngine, StepReport,
    config::{AnnihilationMode, TombstoneMotion},
};

use crate::frames::FrameWriter;

/// Main application state for the interactive viewer.
///
/// The typical per-frame update is:
/// 1. Handle UI interactions / input.
/// 2. If `running` is `true` and enough wall time has passed, call
///    [`Viewer::step_once`].
/// 3. Render the domain and its vortices.
///
/// ### Fields
/// - `engine` - The simulation being displayed.
/// - `draft` - Configuration edited in the side panel, applied on demand.
/// - `frames` - Optional PNG writer; every step is saved when set.
///
/// - `running` - Whether the simulation is currently auto-advancing.
/// - `zoom` - Multiplier on the fit-to-window scale.
/// - `pan` - Screen-space pan offset in pixels.
///
/// - `last_report` - Diagnostics from the most recent step.
/// - `status` - Last config or I/O message shown in the status bar.
///
/// - `step_interval` - Target wall time between automatic steps (seconds).
/// - `last_step_time` - Time stamp of the last step (egui time).
pub struct Viewer {
    engine: SimulationEngine,
    draft: SimConfig,
    frames: Option<FrameWriter>,

    running: bool,
    zoom: f32,
    pan: egui::Vec2,

    last_report: Option<StepReport>,
    status: Option<String>,

    step_interval: f64,
    last_step_time: f64,
}

impl Viewer {
    /// Creates a viewer around an already validated engine.
    ///
    /// The camera starts fitted to the window with no pan.
    pub fn new(engine: SimulationEngine, frames: Option<FrameWriter>) -> Self {
        let draft = engine.config().clone();
        Self {
            engine,
            draft,
            frames,
            running: false,
            zoom: 0.9,
            pan: egui::vec2(0.0, 0.0),
            last_report: None,
            status: None,
            step_interval: 0.01,
            last_step_time: 0.0,
        }
    }

    /// Restarts from the initial population of the current config.
    fn reset(&mut self) {
        self.engine.reset();
        self.last_report = None;
        self.running = false;
    }

    /// Restarts with a fresh random seed.
    fn reseed(&mut self) {
        let cfg = SimConfig {
            seed: rand::random(),
            ..self.engine.config().clone()
        };
        match SimulationEngine::new(cfg) {
            Ok(engine) => {
                self.draft.seed = engine.config().seed;
                self.engine = engine;
                self.last_report = None;
                self.running = false;
            }
            Err(err) => self.status = Some(err.to_string()),
        }
    }

    /// Validates the draft config and hands it to the engine.
    fn apply_draft(&mut self) {
        match self.engine.set_config(self.draft.clone()) {
            Ok(()) => self.status = Some("config applied".to_owned()),
            Err(err) => {
                warn!(error = %err, "Rejected config from side panel");
                self.status = Some(err.to_string());
            }
        }
    }

    /// Advances the simulation by a single step.
    ///
    /// Stops auto-running once every vortex is gone, and saves a frame
    /// if a [`FrameWriter`] was configured.
    fn step_once(&mut self) {
        let report = self.engine.step();

        if let Some(frames) = &self.frames
            && let Err(err) = frames.save(
                self.engine.store(),
                self.engine.config().domain_size,
                report.step,
            )
        {
            error!(error = %err, "Could not save frame; disabling capture");
            self.status = Some(format!("frame capture stopped: {err}"));
            self.frames = None;
        }

        if self.engine.is_extinct() {
            self.running = false;
            self.status = Some("all vortices annihilated".to_owned());
        }
        self.last_report = Some(report);
    }

    /// Pixels per world unit, before zoom, for a drawing area.
    fn fit_scale(&self, rect: egui::Rect) -> f32 {
        rect.width().min(rect.height()) / self.engine.config().domain_size as f32
    }

    /// Converts a world-space position to screen-space.
    ///
    /// The domain center maps to the center of `rect`, offset by `pan`.
    /// The y-axis is flipped so that positive y goes up in world space.
    fn world_to_screen(&self, p: DVec2, rect: egui::Rect) -> egui::Pos2 {
        let center = rect.center();
        let half = self.engine.config().domain_size / 2.0;
        let s = self.fit_scale(rect) * self.zoom;
        egui::pos2(
            center.x + (p.x - half) as f32 * s + self.pan.x,
            center.y - (p.y - half) as f32 * s + self.pan.y,
        )
    }

    /// Converts a screen-space position back to world-space.
    ///
    /// This is the inverse of [`Viewer::world_to_screen`] up to floating
    /// point rounding.
    fn screen_to_world(&self, p: egui::Pos2, rect: egui::Rect) -> DVec2 {
        let center = rect.center();
        let half = self.engine.config().domain_size / 2.0;
        let s = self.fit_scale(rect) * self.zoom;
        let x = (p.x - center.x - self.pan.x) / s;
        let y = (center.y - p.y + self.pan.y) / s;
        DVec2::new(x as f64 + half, y as f64 + half)
    }

    /// Helper to draw a labeled logarithmic `f64` slider.
    fn labeled_log_f64(
        ui: &mut egui::Ui,
        label: &str,
        value: &mut f64,
        range: std::ops::RangeInclusive<f64>,
    ) {
        ui.horizontal(|ui| {
            ui.label(label);
            ui.add(egui::Slider::new(value, range).logarithmic(true));
        });
    }

    /// Helper to draw a labeled `usize` [`egui::DragValue`].
    fn labeled_drag_usize(
        ui: &mut egui::Ui,
        label: &str,
        value: &mut usize,
        range: std::ops::RangeInclusive<usize>,
        speed: f64,
    ) {
        ui.horizontal(|ui| {
            ui.label(label);
            ui.add(egui::DragValue::new(value).range(range).speed(speed));
        });
    }

    /// Builds the top panel UI (run controls, stepping, zoom).
    fn ui_top_panel(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("top_panel").show(ctx, |ui| {
            ui.horizontal(|ui| {
                if ui
                    .button(if self.running { "⏸ Pause" } else { "▶ Run" })
                    .clicked()
                {
                    self.running = !self.running;
                }

                ui.add(
                    egui::DragValue::new(&mut self.step_interval)
                        .prefix("frame interval = ")
                        .range(0.0..=1.0)
                        .speed(0.005),
                );

                if ui.button("Step").clicked() {
                    self.step_once();
                    self.last_step_time = ctx.input(|i| i.time);
                }

                if ui.button("Reset").clicked() {
                    self.reset();
                }

                if ui.button("New seed").clicked() {
                    self.reseed();
                }

                ui.separator();
                ui.add(egui::Slider::new(&mut self.zoom, 0.1..=10.0).text("Zoom"));
            });
        });
    }

    /// Builds the bottom status bar (time, population, latency).
    fn ui_status_bar(&self, ctx: &egui::Context) {
        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if let Some(r) = &self.last_report {
                    ui.label(format!("step = {:.3} ms", r.latency.as_secs_f64() * 1e3));
                    ui.label(format!("annihilated = {}", r.annihilated));
                }
                ui.separator();
                ui.label(format!("capacity = {}", self.engine.store().capacity()));
                ui.label(format!("active = {}", self.engine.store().active_count()));
                ui.label(format!("t = {:.5}", self.engine.time()));
                if let Some(msg) = &self.status {
                    ui.separator();
                    ui.label(msg);
                }
            });
        });
    }

    /// Builds the right-hand configuration panel for simulation parameters.
    fn ui_config_panel(&mut self, ctx: &egui::Context) {
        egui::SidePanel::right("config_panel")
            .resizable(true)
            .default_width(240.0)
            .show(ctx, |ui| {
                ui.heading("Config");

                ui.separator();
                ui.label("Drag");
                Self::labeled_log_f64(ui, "alpha:", &mut self.draft.alpha, 0.0..=1.0);
                Self::labeled_log_f64(ui, "alphap:", &mut self.draft.alphap, 0.0..=1.0);

                ui.separator();
                ui.label("Time");
                Self::labeled_log_f64(ui, "dt:", &mut self.draft.dt, 1e-7..=1e-2);

                ui.separator();
                ui.label("Interaction");
                Self::labeled_log_f64(ui, "kappa:", &mut self.draft.kappa, 1e-6..=1e-1);
                Self::labeled_log_f64(
                    ui,
                    "a0:",
                    &mut self.draft.annihilation_radius,
                    0.0..=1e-2,
                );

                ui.separator();
                ui.label("Injection");
                Self::labeled_drag_usize(ui, "pairs:", &mut self.draft.inject_pairs, 0..=100, 1.0);
                Self::labeled_log_f64(
                    ui,
                    "interval:",
                    &mut self.draft.inject_interval,
                    1e-6..=1.0,
                );
                Self::labeled_log_f64(
                    ui,
                    "jitter:",
                    &mut self.draft.injection_jitter,
                    0.0..=0.5,
                );

                ui.separator();
                ui.label("Policies");
                ui.horizontal(|ui| {
                    ui.selectable_value(
                        &mut self.draft.annihilation_mode,
                        AnnihilationMode::MarkThenCommit,
                        "Mark/commit",
                    );
                    ui.selectable_value(
                        &mut self.draft.annihilation_mode,
                        AnnihilationMode::Sequential,
                        "Sequential",
                    );
                });
                ui.horizontal(|ui| {
                    ui.selectable_value(
                        &mut self.draft.tombstone_motion,
                        TombstoneMotion::Stale,
                        "Stale tombstones",
                    );
                    ui.selectable_value(
                        &mut self.draft.tombstone_motion,
                        TombstoneMotion::Frozen,
                        "Frozen",
                    );
                });

                ui.separator();
                if ui.button("Apply").clicked() {
                    self.apply_draft();
                }
                if ui.button("Reset cfg to default").clicked() {
                    self.draft = SimConfig::default();
                }
            });
    }

    /// Builds the central panel where the domain and vortices are drawn.
    fn ui_central_panel(&mut self, ctx: &egui::Context) {
        egui::CentralPanel::default().show(ctx, |ui| {
            let response = ui.allocate_response(ui.available_size(), egui::Sense::click_and_drag());
            let rect = response.rect;
            let painter = ui.painter_at(rect);

            // Pan with drag.
            if response.dragged() {
                self.pan += response.drag_delta();
            }

            // Zoom around the mouse cursor.
            let scroll = ui.ctx().input(|i| i.raw_scroll_delta.y);
            if scroll != 0.0 {
                let pointer_screen = response.hover_pos().unwrap_or(rect.center());
                let world_before = self.screen_to_world(pointer_screen, rect);

                let factor = (1.0 + scroll * 0.001).clamp(0.5, 2.0);
                self.zoom = (self.zoom * factor).clamp(0.1, 10.0);

                let screen_after = self.world_to_screen(world_before, rect);
                self.pan += pointer_screen - screen_after;
            }

            // Domain outline.
            let d = self.engine.config().domain_size;
            let corners = [
                DVec2::new(0.0, 0.0),
                DVec2::new(d, 0.0),
                DVec2::new(d, d),
                DVec2::new(0.0, d),
            ];
            let outline: Vec<egui::Pos2> = corners
                .iter()
                .map(|&c| self.world_to_screen(c, rect))
                .collect();
            painter.add(egui::Shape::closed_line(
                outline,
                egui::Stroke::new(1.0, egui::Color32::GRAY),
            ));

            // Vortices: positive red, negative blue.
            let store = self.engine.store();
            for p in store.positive_positions() {
                painter.circle_filled(self.world_to_screen(p, rect), 2.5, egui::Color32::RED);
            }
            for p in store.negative_positions() {
                painter.circle_filled(
                    self.world_to_screen(p, rect),
                    2.5,
                    egui::Color32::LIGHT_BLUE,
                );
            }

            // Auto-run simulation if requested.
            if self.running {
                let now = ctx.input(|i| i.time);
                if now - self.last_step_time >= self.step_interval {
                    self.step_once();
                    self.last_step_time = now;
                }
                ctx.request_repaint();
            }
        });
    }
}

impl App for Viewer {
    /// eframe callback that builds all UI panels for each frame.
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.ui_top_panel(ctx);
        self.ui_status_bar(ctx);
        self.ui_config_panel(ctx);
        self.ui_central_panel(ctx);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_rect() -> egui::Rect {
        egui::Rect::from_min_size(egui::Pos2::new(0.0, 0.0), egui::vec2(800.0, 600.0))
    }

    fn viewer() -> Viewer {
        Viewer::new(SimulationEngine::new(SimConfig::default()).unwrap(), None)
    }

    #[test]
    fn world_to_screen_and_back_is_roundtrip() {
        let mut viewer = viewer();
        // Use non-trivial zoom and pan to exercise the math.
        viewer.zoom = 2.0;
        viewer.pan = egui::vec2(15.0, -7.0);
        let rect = test_rect();
        let d = viewer.engine.config().domain_size;

        let world_points = [
            DVec2::new(0.0, 0.0),
            DVec2::new(0.3 * d, 0.9 * d),
            DVec2::new(d, 0.5 * d),
        ];

        // f32 screen math on a 1e-2 domain.
        let eps = 1e-6 * d.max(1.0);

        for p in world_points {
            let screen = viewer.world_to_screen(p, rect);
            let back = viewer.screen_to_world(screen, rect);

            assert!(
                (back.x - p.x).abs() < eps && (back.y - p.y).abs() < eps,
                "roundtrip mismatch: p={:?}, back={:?}",
                p,
                back
            );
        }
    }

    #[test]
    fn domain_center_maps_to_rect_center() {
        let viewer = viewer();
        let rect = test_rect();
        let half = viewer.engine.config().domain_size / 2.0;

        let screen = viewer.world_to_screen(DVec2::splat(half), rect);

        assert_eq!(screen, rect.center());
    }

    #[test]
    fn step_once_records_report() {
        let mut viewer = viewer();
        viewer.step_once();

        let report = viewer.last_report.expect("report after step");
        assert_eq!(report.step, 0);
        assert_eq!(viewer.engine.steps(), 1);
    }

    #[test]
    fn reset_restores_basic_state() {
        let mut viewer = viewer();
        let initial = viewer.engine.store().positions().to_vec();
        viewer.step_once();
        viewer.running = true;

        viewer.reset();

        assert_eq!(viewer.engine.steps(), 0);
        assert_eq!(viewer.engine.store().positions(), initial.as_slice());
        assert!(viewer.last_report.is_none());
        assert!(!viewer.running);
    }

    #[test]
    fn invalid_draft_is_rejected_and_engine_keeps_old_config() {
        let mut viewer = viewer();
        viewer.draft.dt = 0.0;

        viewer.apply_draft();

        assert_eq!(viewer.engine.config().dt, SimConfig::default().dt);
        assert!(viewer.status.as_deref().unwrap_or("").contains("dt"));
    }

    #[test]
    fn valid_draft_is_applied() {
        let mut viewer = viewer();
        viewer.draft.alpha = 0.5;

        viewer.apply_draft();

        assert_eq!(viewer.engine.config().alpha, 0.5);
    }

    #[test]
    fn running_stops_on_extinction() {
        let cfg = SimConfig {
            initial_vortices: 0,
            inject_pairs: 0,
            ..SimConfig::default()
        };
        let mut viewer = Viewer::new(SimulationEngine::new(cfg).unwrap(), None);
        viewer.running = true;

        viewer.step_once();

        assert!(!viewer.running);
    }
}
