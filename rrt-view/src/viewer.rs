//! Interactive RRT viewer built with eframe/egui.
//!
//! This module defines [`Viewer`], which owns a [`Planner`] and implements
//! [`eframe::App`] to grow the tree step by step and draw it projected
//! onto one of the coordinate planes.

use eframe::App;
use glam::Vec2;
use rrt_core::{
    Config, ConfigError, GrowthState, NodeId, Planner, Point3, planner::DefaultSampler,
};

/// Coordinate plane the 3-D tree is projected onto.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Plane {
    XY,
    XZ,
    YZ,
}

impl Plane {
    pub const ALL: [Plane; 3] = [Plane::XY, Plane::XZ, Plane::YZ];

    /// Drops the axis orthogonal to the plane.
    pub fn project(self, p: Point3) -> Vec2 {
        let (u, v) = match self {
            Plane::XY => (p.x, p.y),
            Plane::XZ => (p.x, p.z),
            Plane::YZ => (p.y, p.z),
        };
        Vec2::new(u as f32, v as f32)
    }

    pub fn label(self) -> &'static str {
        match self {
            Plane::XY => "XY",
            Plane::XZ => "XZ",
            Plane::YZ => "YZ",
        }
    }
}

/// Main application state for the interactive viewer.
///
/// [`Viewer`] glues together:
/// - The planner being grown, plus an editable copy of its [`Config`].
/// - View settings (projection plane, pan/zoom, timing).
/// - eframe/egui callbacks for drawing and user interaction.
///
/// ### Fields
/// - `planner` - Planner currently being grown.
/// - `cfg` - Configuration edited in the side panel; applied on reset.
/// - `plane` - Projection plane used for drawing.
///
/// - `running` - Whether the planner is currently auto-advancing.
/// - `zoom` - Zoom factor for world-to-screen coordinate mapping.
/// - `pan` - Screen-space pan offset in pixels.
///
/// - `last_new_ids` - Node ids created in the last step (for highlighting).
/// - `error` - Last configuration or planning error, shown in the status bar.
///
/// - `step_interval` - Target time between automatic steps (seconds).
/// - `last_step_time` - Time stamp of the last step (egui time).
/// - `last_step_dt` - Actual time delta between the last two steps.
pub struct Viewer {
    planner: Planner<DefaultSampler>,
    cfg: Config,
    plane: Plane,

    running: bool,
    zoom: f32,
    pan: egui::Vec2,

    last_new_ids: Vec<NodeId>,
    error: Option<String>,

    step_interval: f64,
    last_step_time: f64,
    last_step_dt: f64,
}

impl Viewer {
    /// Creates a viewer with a fresh planner for the default configuration.
    ///
    /// The seed is drawn at random so every launch grows a different tree,
    /// but it is recorded in `cfg` and shown in the status bar.
    pub fn new() -> Result<Self, ConfigError> {
        Self::with_seed(rand::random())
    }

    /// Creates a viewer whose planner samples from the given seed.
    pub fn with_seed(seed: u64) -> Result<Self, ConfigError> {
        let cfg = Config {
            seed: Some(seed),
            ..Config::default()
        };
        let planner = Planner::from_config(cfg.clone())?;

        Ok(Self {
            planner,
            cfg,
            plane: Plane::XY,
            running: false,
            zoom: 8.0,
            pan: egui::vec2(0.0, 0.0),
            last_new_ids: Vec::with_capacity(1),
            error: None,
            step_interval: 0.05,
            last_step_time: 0.0,
            last_step_dt: 0.0,
        })
    }

    /// Rebuilds the planner from the edited configuration with a new seed.
    fn reset(&mut self) {
        self.reseed(rand::random());
    }

    /// Rebuilds the planner from the edited configuration with `seed`.
    ///
    /// If the configuration is invalid, the current planner is kept and the
    /// error is shown instead. Auto-running always stops.
    fn reseed(&mut self, seed: u64) {
        self.cfg.seed = Some(seed);
        match Planner::from_config(self.cfg.clone()) {
            Ok(planner) => {
                self.planner = planner;
                self.error = None;
            }
            Err(e) => self.error = Some(e.to_string()),
        }
        self.last_new_ids.clear();
        self.running = false;
    }

    /// Advances the planner by a single growth step.
    ///
    /// Ids of nodes attached in this step are stored in `last_new_ids` so
    /// they can be highlighted. Reaching a terminal state or failing stops
    /// auto-running.
    fn step_once(&mut self) {
        let before = self.planner.tree().len();
        match self.planner.step() {
            Ok(state) => {
                if state.is_terminal() {
                    self.running = false;
                }
            }
            Err(e) => {
                self.error = Some(e.to_string());
                self.running = false;
            }
        }
        self.last_new_ids = (before..self.planner.tree().len()).collect();
    }

    /// Projects a point so that the centre of the volume lands on the origin.
    fn project(&self, p: Point3) -> Vec2 {
        let center = self.planner.config().bounds * 0.5;
        self.plane.project(p - center)
    }

    /// Converts a world-space position to screen-space.
    ///
    /// World coordinates are scaled by `zoom`, offset by `pan`, and then
    /// centered inside the given `rect`. The y-axis is flipped so that
    /// positive y goes up in world space.
    fn world_to_screen(&self, p: Vec2, rect: egui::Rect) -> egui::Pos2 {
        let center = rect.center();
        egui::pos2(
            center.x + p.x * self.zoom + self.pan.x,
            center.y - p.y * self.zoom + self.pan.y,
        )
    }

    /// Converts a screen-space position back to world-space.
    ///
    /// This is the inverse of [`Viewer::world_to_screen`] (up to floating
    /// point rounding).
    fn screen_to_world(&self, p: egui::Pos2, rect: egui::Rect) -> Vec2 {
        let center = rect.center();
        let x = (p.x - center.x - self.pan.x) / self.zoom;
        let y = (center.y - p.y + self.pan.y) / self.zoom;
        Vec2::new(x, y)
    }

    fn point_to_screen(&self, p: Point3, rect: egui::Rect) -> egui::Pos2 {
        self.world_to_screen(self.project(p), rect)
    }

    fn status_text(&self) -> &'static str {
        match self.planner.state() {
            GrowthState::Growing => "growing",
            GrowthState::Succeeded => "path found",
            GrowthState::ExhaustedIterations => "no path (budget exhausted)",
        }
    }

    /// Helper to draw a labeled `f64` [`egui::DragValue`].
    fn labeled_drag_f64(
        ui: &mut egui::Ui,
        label: &str,
        value: &mut f64,
        range: std::ops::RangeInclusive<f64>,
        speed: f64,
    ) {
        ui.horizontal(|ui| {
            ui.label(label);
            ui.add(egui::DragValue::new(value).range(range).speed(speed));
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

    /// Builds the top panel UI (run controls, stepping, projection, zoom).
    fn ui_top_panel(&mut self, ctx: &egui::Context) {
        egui::TopBottomPanel::top("top_panel").show(ctx, |ui| {
            ui.horizontal(|ui| {
                let finished = self.planner.state().is_terminal();
                if ui
                    .add_enabled(
                        !finished,
                        egui::Button::new(if self.running { "⏸ Pause" } else { "▶ Run" }),
                    )
                    .clicked()
                {
                    self.running = !self.running;
                }

                ui.add(
                    egui::DragValue::new(&mut self.step_interval)
                        .prefix("dt target = ")
                        .range(0.0..=1.0)
                        .speed(0.01),
                );

                if ui.add_enabled(!finished, egui::Button::new("Step")).clicked() {
                    let now = ctx.input(|i| i.time);
                    if self.last_step_time > 0.0 {
                        self.last_step_dt = now - self.last_step_time;
                    }
                    self.step_once();
                    self.last_step_time = now;
                }

                if ui.button("Reset").clicked() {
                    self.reset();
                }

                ui.separator();
                for plane in Plane::ALL {
                    if ui.selectable_label(self.plane == plane, plane.label()).clicked() {
                        self.plane = plane;
                    }
                }

                ui.separator();
                ui.add(egui::Slider::new(&mut self.zoom, 0.5..=40.0).text("Zoom"));
            });
        });
    }

    /// Builds the bottom status bar (state, iterations, node count, seed).
    fn ui_status_bar(&self, ctx: &egui::Context) {
        egui::TopBottomPanel::bottom("status_bar").show(ctx, |ui| {
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                ui.label(format!("dt last = {:.3} s", self.last_step_dt));
                ui.separator();
                if let Some(seed) = self.planner.config().seed {
                    ui.label(format!("seed = {seed}"));
                }
                ui.label(format!("nodes = {}", self.planner.tree().len()));
                ui.label(format!(
                    "iterations = {} / {}",
                    self.planner.iterations(),
                    self.planner.config().max_iterations
                ));
                ui.label(self.status_text());
                if let Some(err) = &self.error {
                    ui.separator();
                    ui.colored_label(egui::Color32::RED, err.as_str());
                }
            });
        });
    }

    /// Builds the right-hand configuration panel. Edits apply on reset.
    fn ui_config_panel(&mut self, ctx: &egui::Context) {
        egui::SidePanel::right("config_panel")
            .resizable(true)
            .default_width(220.0)
            .show(ctx, |ui| {
                ui.heading("Config");

                ui.separator();
                ui.label("Edge length");
                Self::labeled_drag_f64(
                    ui,
                    "min_distance:",
                    &mut self.cfg.min_distance,
                    0.1..=100.0,
                    0.1,
                );
                Self::labeled_drag_f64(
                    ui,
                    "max_distance:",
                    &mut self.cfg.max_distance,
                    0.1..=100.0,
                    0.1,
                );

                ui.separator();
                ui.label("Volume bounds");
                Self::labeled_drag_f64(ui, "x:", &mut self.cfg.bounds.x, 1.0..=1000.0, 1.0);
                Self::labeled_drag_f64(ui, "y:", &mut self.cfg.bounds.y, 1.0..=1000.0, 1.0);
                Self::labeled_drag_f64(ui, "z:", &mut self.cfg.bounds.z, 1.0..=1000.0, 1.0);

                ui.separator();
                ui.label("Goal");
                Self::labeled_drag_f64(ui, "x:", &mut self.cfg.goal.x, 0.0..=1000.0, 1.0);
                Self::labeled_drag_f64(ui, "y:", &mut self.cfg.goal.y, 0.0..=1000.0, 1.0);
                Self::labeled_drag_f64(ui, "z:", &mut self.cfg.goal.z, 0.0..=1000.0, 1.0);

                ui.separator();
                ui.label("Budget");
                Self::labeled_drag_usize(
                    ui,
                    "max_iterations:",
                    &mut self.cfg.max_iterations,
                    0..=100_000,
                    10.0,
                );
                ui.checkbox(&mut self.cfg.lattice, "integer lattice");

                ui.separator();
                if ui.button("Apply (reset)").clicked() {
                    self.reset();
                }
                if ui.button("Reset cfg to default").clicked() {
                    self.cfg = Config::default();
                }
            });
    }

    /// Builds the central panel where the tree is drawn.
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
                self.zoom = (self.zoom * factor).clamp(0.5, 40.0);

                let screen_after = self.world_to_screen(world_before, rect);
                self.pan += pointer_screen - screen_after;
            }

            let tree = self.planner.tree();

            // Volume outline.
            let bounds = self.planner.config().bounds;
            let (lo, hi) = (self.project(Point3::ZERO), self.project(bounds));
            let outline = [
                Vec2::new(lo.x, lo.y),
                Vec2::new(hi.x, lo.y),
                Vec2::new(hi.x, hi.y),
                Vec2::new(lo.x, hi.y),
            ]
            .iter()
            .map(|&v| self.world_to_screen(v, rect))
            .collect();
            painter.add(egui::Shape::closed_line(
                outline,
                egui::Stroke::new(1.0, egui::Color32::DARK_GRAY),
            ));

            // Tree edges.
            for node in tree.nodes() {
                for &child in &node.children {
                    let a = self.point_to_screen(node.pos, rect);
                    let b = self.point_to_screen(tree.nodes()[child].pos, rect);
                    painter
                        .line_segment([a, b], egui::Stroke::new(1.0, egui::Color32::LIGHT_GREEN));
                }
            }

            // Tree nodes (highlighting the latest attachment in red).
            for (i, node) in tree.nodes().iter().enumerate() {
                let p = self.point_to_screen(node.pos, rect);
                let color = if self.last_new_ids.contains(&i) {
                    egui::Color32::RED
                } else {
                    egui::Color32::LIGHT_BLUE
                };
                painter.circle_filled(p, 2.0, color);
            }

            // Extracted path.
            let path = self.planner.path_points();
            if path.len() > 1 {
                let pts = path.iter().map(|&p| self.point_to_screen(p, rect)).collect();
                painter.add(egui::Shape::line(
                    pts,
                    egui::Stroke::new(3.0, egui::Color32::GOLD),
                ));
            }

            // Start and goal markers, goal tolerance ring.
            let cfg = self.planner.config();
            let start = self.point_to_screen(cfg.start, rect);
            painter.circle_filled(start, 5.0, egui::Color32::GREEN);
            let goal = self.point_to_screen(cfg.goal, rect);
            painter.circle_filled(goal, 5.0, egui::Color32::YELLOW);
            painter.circle_stroke(
                goal,
                cfg.goal_tolerance() as f32 * self.zoom,
                egui::Stroke::new(1.0, egui::Color32::YELLOW),
            );

            // Auto-run if requested.
            if self.running {
                let now = ctx.input(|i| i.time);
                let elapsed = now - self.last_step_time;
                if elapsed >= self.step_interval {
                    if self.last_step_time > 0.0 {
                        self.last_step_dt = elapsed;
                    }
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

    #[test]
    fn world_to_screen_and_back_is_roundtrip() {
        let mut viewer = Viewer::with_seed(7).unwrap();
        viewer.zoom = 2.0;
        viewer.pan = egui::vec2(15.0, -7.0);
        let rect = test_rect();

        let eps = 1e-5;
        for p in [
            Vec2::new(0.0, 0.0),
            Vec2::new(10.0, -5.0),
            Vec2::new(-3.5, 8.25),
        ] {
            let back = viewer.screen_to_world(viewer.world_to_screen(p, rect), rect);
            assert!(
                (back.x - p.x).abs() < eps && (back.y - p.y).abs() < eps,
                "roundtrip mismatch: p={:?}, back={:?}",
                p,
                back
            );
        }
    }

    #[test]
    fn plane_projection_drops_one_axis() {
        let p = Point3::new(1.0, 2.0, 3.0);
        assert_eq!(Plane::XY.project(p), Vec2::new(1.0, 2.0));
        assert_eq!(Plane::XZ.project(p), Vec2::new(1.0, 3.0));
        assert_eq!(Plane::YZ.project(p), Vec2::new(2.0, 3.0));
    }

    #[test]
    fn volume_center_projects_to_origin() {
        let viewer = Viewer::with_seed(7).unwrap();
        let center = viewer.planner.config().bounds * 0.5;
        assert_eq!(viewer.project(center), Vec2::ZERO);
    }

    #[test]
    fn step_once_attaches_and_highlights_one_node() {
        let mut viewer = Viewer::with_seed(7).unwrap();
        viewer.step_once();

        assert_eq!(viewer.planner.tree().len(), 2);
        assert_eq!(viewer.planner.iterations(), 1);
        assert_eq!(viewer.last_new_ids, vec![1]);
        assert!(viewer.error.is_none());
    }

    #[test]
    fn step_once_stops_running_when_budget_is_spent() {
        let mut viewer = Viewer::with_seed(7).unwrap();
        viewer.cfg.max_iterations = 0;
        viewer.reseed(8);
        viewer.running = true;

        viewer.step_once();

        assert_eq!(viewer.planner.state(), GrowthState::ExhaustedIterations);
        assert!(!viewer.running);
        assert!(viewer.last_new_ids.is_empty());
    }

    #[test]
    fn reset_restores_bare_tree() {
        let mut viewer = Viewer::with_seed(7).unwrap();
        for _ in 0..5 {
            viewer.step_once();
        }
        viewer.running = true;

        viewer.reseed(8);

        assert_eq!(viewer.planner.tree().len(), 1);
        assert_eq!(viewer.planner.iterations(), 0);
        assert!(viewer.last_new_ids.is_empty());
        assert!(!viewer.running);
        assert_eq!(viewer.planner.config().seed, Some(8));
    }

    #[test]
    fn same_seed_grows_same_tree() {
        let mut a = Viewer::with_seed(21).unwrap();
        let mut b = Viewer::with_seed(21).unwrap();
        for _ in 0..10 {
            a.step_once();
            b.step_once();
        }
        let positions = |v: &Viewer| -> Vec<Point3> {
            v.planner.tree().nodes().iter().map(|n| n.pos).collect()
        };
        assert_eq!(positions(&a), positions(&b));
    }

    #[test]
    fn reset_with_invalid_config_keeps_planner() {
        let mut viewer = Viewer::with_seed(7).unwrap();
        viewer.step_once();
        viewer.cfg.min_distance = 20.0;
        viewer.cfg.max_distance = 10.0;

        viewer.reseed(8);

        assert!(viewer.error.is_some());
        assert_eq!(viewer.planner.tree().len(), 2);
    }
}
