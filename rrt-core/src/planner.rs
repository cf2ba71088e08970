//! The RRT growth loop.
//!
//! Each call to [`Planner::step`] runs one iteration:
//! 1. Draw samples until one is at least `min_distance` from its nearest
//!    tree node (see [`steer`]).
//! 2. Pull the sample in to `max_distance` if it lies farther out.
//! 3. If the candidate is within [`Config::goal_tolerance`] of the goal,
//!    attach the goal node under the candidate's nearest node and stop.
//! 4. Otherwise attach the candidate itself and keep growing.
//!
//! The loop stops with [`GrowthState::ExhaustedIterations`] once
//! `max_iterations` attachments were made without reaching the goal.

use crate::{
    config::Config,
    error::{ConfigError, PlannerError},
    path,
    sampler::{Sampler, Steered, UniformSampler, steer},
    tree::Tree,
    types::{NodeId, Point3, distance},
};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::fmt;

/// Sampler used when none is supplied.
pub type DefaultSampler = UniformSampler<ChaCha8Rng>;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GrowthState {
    Growing,
    Succeeded,
    ExhaustedIterations,
}

impl GrowthState {
    #[inline]
    pub fn is_terminal(self) -> bool {
        !matches!(self, GrowthState::Growing)
    }
}

/// Whether the goal node has joined the tree yet.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GoalState {
    Detached,
    Attached { id: NodeId, parent: NodeId },
}

/// The fixed target point, kept outside the tree until the run succeeds.
#[derive(Clone, Debug)]
pub struct Goal {
    pub pos: Point3,
    state: GoalState,
}

impl Goal {
    pub fn new(pos: Point3) -> Self {
        Self {
            pos,
            state: GoalState::Detached,
        }
    }

    #[inline]
    pub fn state(&self) -> GoalState {
        self.state
    }

    /// Tree id of the goal, once attached.
    pub fn id(&self) -> Option<NodeId> {
        match self.state {
            GoalState::Detached => None,
            GoalState::Attached { id, .. } => Some(id),
        }
    }

    /// Moves the goal into `tree` under `parent`.
    ///
    /// ### Returns
    /// The goal's new node id, or [`PlannerError::GoalAlreadyAttached`] on a
    /// second call.
    pub fn attach(&mut self, tree: &mut Tree, parent: NodeId) -> Result<NodeId, PlannerError> {
        if let GoalState::Attached { .. } = self.state {
            return Err(PlannerError::GoalAlreadyAttached);
        }
        let id = tree.add_child(parent, self.pos)?;
        self.state = GoalState::Attached { id, parent };
        Ok(id)
    }
}

/// Final outcome of a run, ready to be handed to whatever reports it.
#[derive(Clone, Debug, PartialEq)]
pub struct PlanReport {
    pub start: Point3,
    pub goal: Point3,
    pub succeeded: bool,
    pub iterations: usize,
    pub nodes: usize,
    /// Root-to-goal positions; empty unless `succeeded`.
    pub path: Vec<Point3>,
}

impl fmt::Display for PlanReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Start: {}", Coords(self.start))?;
        writeln!(f, "Finish: {}", Coords(self.goal))?;
        if !self.succeeded {
            writeln!(f, "Max iterations")?;
            return writeln!(f, "Path not found");
        }
        writeln!(f, "Found path")?;
        writeln!(f, "Iterations: {}", self.iterations)?;
        writeln!(f, "Path:")?;
        for (i, p) in self.path.iter().enumerate() {
            writeln!(f, "{} {}", i + 1, Coords(*p))?;
        }
        Ok(())
    }
}

/// `(x, y, z)` rendering of a point.
struct Coords(Point3);

impl fmt::Display for Coords {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.0.x, self.0.y, self.0.z)
    }
}

/// Grows a tree from `cfg.start` until it reaches `cfg.goal` or runs out
/// of iterations.
#[derive(Debug)]
pub struct Planner<S> {
    cfg: Config,
    tree: Tree,
    goal: Goal,
    sampler: S,
    iterations: usize,
    state: GrowthState,
    path: Vec<NodeId>,
}

impl Planner<DefaultSampler> {
    /// Builds a planner that samples with a ChaCha RNG.
    ///
    /// The RNG is seeded from `cfg.seed` when present, otherwise from the OS.
    pub fn from_config(cfg: Config) -> Result<Self, ConfigError> {
        let rng = match cfg.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_os_rng(),
        };
        let sampler = UniformSampler::new(cfg.bounds, rng).with_lattice(cfg.lattice);
        Self::new(cfg, sampler)
    }
}

impl<S: Sampler> Planner<S> {
    /// Validates `cfg` and sets up a tree holding only the start node.
    pub fn new(cfg: Config, sampler: S) -> Result<Self, ConfigError> {
        cfg.validate()?;
        let tree = Tree::with_capacity(cfg.start, cfg.max_iterations.min(4096) + 2);
        let goal = Goal::new(cfg.goal);
        Ok(Self {
            cfg,
            tree,
            goal,
            sampler,
            iterations: 0,
            state: GrowthState::Growing,
            path: Vec::new(),
        })
    }

    #[inline]
    pub fn config(&self) -> &Config {
        &self.cfg
    }

    #[inline]
    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    #[inline]
    pub fn goal(&self) -> &Goal {
        &self.goal
    }

    #[inline]
    pub fn state(&self) -> GrowthState {
        self.state
    }

    /// Accepted attachments so far, the goal attachment included.
    #[inline]
    pub fn iterations(&self) -> usize {
        self.iterations
    }

    /// The last extracted path, root first. Empty before success.
    #[inline]
    pub fn path(&self) -> &[NodeId] {
        &self.path
    }

    pub fn path_points(&self) -> Vec<Point3> {
        path::points(&self.tree, &self.path)
    }

    /// Advances the growth loop by one iteration.
    ///
    /// In a terminal state this does nothing and returns that state.
    ///
    /// ### Returns
    /// The state after the iteration, or an error if sampling stalled.
    pub fn step(&mut self) -> Result<GrowthState, PlannerError> {
        if self.state.is_terminal() {
            return Ok(self.state);
        }
        if self.iterations >= self.cfg.max_iterations {
            self.state = GrowthState::ExhaustedIterations;
            log::info!(
                "no path after {} iterations ({} nodes)",
                self.iterations,
                self.tree.len()
            );
            return Ok(self.state);
        }

        let (nearest, candidate) = self.draw_candidate()?;

        if distance(self.goal.pos, candidate) <= self.cfg.goal_tolerance() {
            let id = self.goal.attach(&mut self.tree, nearest)?;
            self.iterations += 1;
            self.state = GrowthState::Succeeded;
            log::debug!("goal attached as node {id} under {nearest}");
            self.extract_path()?;
            log::info!(
                "found path of {} nodes after {} iterations",
                self.path.len(),
                self.iterations
            );
        } else {
            self.tree.add_child(nearest, candidate)?;
            self.iterations += 1;
        }
        Ok(self.state)
    }

    /// Steps until the loop reaches a terminal state.
    pub fn run(&mut self) -> Result<PlanReport, PlannerError> {
        log::info!(
            "growing tree from {} toward {} (budget {})",
            self.cfg.start,
            self.cfg.goal,
            self.cfg.max_iterations
        );
        while !self.step()?.is_terminal() {}
        Ok(self.report())
    }

    /// Recomputes the root-to-goal path, replacing the previous one.
    ///
    /// ### Returns
    /// [`PlannerError::GoalDetached`] if the goal is not in the tree yet.
    pub fn extract_path(&mut self) -> Result<&[NodeId], PlannerError> {
        let goal = self.goal.id().ok_or(PlannerError::GoalDetached)?;
        self.path = path::extract(&self.tree, goal)?;
        Ok(&self.path)
    }

    pub fn report(&self) -> PlanReport {
        let succeeded = self.state == GrowthState::Succeeded;
        PlanReport {
            start: self.cfg.start,
            goal: self.cfg.goal,
            succeeded,
            iterations: self.iterations,
            nodes: self.tree.len(),
            path: if succeeded {
                self.path_points()
            } else {
                Vec::new()
            },
        }
    }

    /// Draws until a sample is far enough from the tree, then steers it.
    ///
    /// ### Returns
    /// The nearest node id and the steered candidate position.
    fn draw_candidate(&mut self) -> Result<(NodeId, Point3), PlannerError> {
        let (min, max) = (self.cfg.min_distance, self.cfg.max_distance);
        for _ in 0..self.cfg.max_sample_retries {
            let sample = self.sampler.sample();
            let (nearest, _) = self.tree.find_nearest(sample);
            match steer(sample, self.tree.nodes()[nearest].pos, min, max) {
                Steered::Rejected => continue,
                Steered::Unchanged(p) => return Ok((nearest, p)),
                Steered::Rescaled(p) => {
                    log::trace!("rescaled sample {sample} to {p}");
                    return Ok((nearest, p));
                }
            }
        }
        Err(PlannerError::SamplingStalled {
            retries: self.cfg.max_sample_retries,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sampler::ScriptedSampler;

    fn p(x: f64, y: f64, z: f64) -> Point3 {
        Point3::new(x, y, z)
    }

    fn line_config() -> Config {
        Config {
            start: Point3::ZERO,
            goal: p(40.0, 0.0, 0.0),
            bounds: Point3::splat(50.0),
            min_distance: 5.0,
            max_distance: 10.0,
            max_iterations: 100,
            max_sample_retries: 10,
            seed: None,
            lattice: false,
        }
    }

    #[test]
    fn new_rejects_invalid_config() {
        let cfg = Config {
            min_distance: 10.0,
            max_distance: 5.0,
            ..line_config()
        };
        let err = Planner::new(cfg, ScriptedSampler::new(vec![Point3::ONE])).unwrap_err();
        assert!(matches!(err, ConfigError::MaxBelowMin { .. }));
    }

    #[test]
    fn step_attaches_steered_candidate_under_nearest() {
        let sampler = ScriptedSampler::new(vec![p(30.0, 0.0, 0.0)]);
        let mut planner = Planner::new(line_config(), sampler).unwrap();

        assert_eq!(planner.step(), Ok(GrowthState::Growing));
        assert_eq!(planner.iterations(), 1);
        assert_eq!(planner.tree().len(), 2);

        let child = &planner.tree().nodes()[1];
        assert_eq!(child.parent, Some(0));
        assert_eq!(child.pos, p(10.0, 0.0, 0.0));
        assert_eq!(planner.goal().state(), GoalState::Detached);
    }

    #[test]
    fn step_retries_rejected_samples() {
        // Two samples too close to the root before an acceptable one.
        let sampler = ScriptedSampler::new(vec![
            p(1.0, 0.0, 0.0),
            p(0.0, 4.9, 0.0),
            p(0.0, 0.0, 7.0),
        ]);
        let mut planner = Planner::new(line_config(), sampler).unwrap();

        planner.step().unwrap();
        assert_eq!(planner.sampler.drawn(), 3);
        assert_eq!(planner.iterations(), 1);
        assert_eq!(planner.tree().nodes()[1].pos, p(0.0, 0.0, 7.0));
    }

    #[test]
    fn step_fails_when_sampling_stalls() {
        let sampler = ScriptedSampler::new(vec![p(1.0, 1.0, 1.0)]);
        let mut planner = Planner::new(line_config(), sampler).unwrap();

        assert_eq!(
            planner.step(),
            Err(PlannerError::SamplingStalled { retries: 10 })
        );
        assert_eq!(planner.sampler.drawn(), 10);
        assert_eq!(planner.tree().len(), 1);
        assert_eq!(planner.iterations(), 0);
    }

    #[test]
    fn goal_within_tolerance_attaches_goal_not_candidate() {
        // Every sample lies far out on +x, so the tree grows in 10-unit
        // hops: 10, 20, 30. At 30 the next candidate is 40, which is the
        // goal itself and triggers the goal attachment under node 30.
        let sampler = ScriptedSampler::new(vec![p(50.0, 0.0, 0.0)]);
        let mut planner = Planner::new(line_config(), sampler).unwrap();

        let report = planner.run().unwrap();
        assert!(report.succeeded);
        assert_eq!(planner.state(), GrowthState::Succeeded);
        assert_eq!(report.iterations, 4);

        let goal_id = planner.goal().id().unwrap();
        assert_eq!(
            planner.goal().state(),
            GoalState::Attached {
                id: goal_id,
                parent: 3
            }
        );
        assert_eq!(planner.tree().nodes()[goal_id].pos, p(40.0, 0.0, 0.0));
        assert_eq!(planner.path(), &[0, 1, 2, 3, goal_id]);
        assert_eq!(
            report.path,
            vec![
                Point3::ZERO,
                p(10.0, 0.0, 0.0),
                p(20.0, 0.0, 0.0),
                p(30.0, 0.0, 0.0),
                p(40.0, 0.0, 0.0),
            ]
        );
        assert_eq!(planner.tree().validate(), Ok(()));
    }

    #[test]
    fn goal_uses_tolerance_band_not_exact_hit() {
        // Candidate lands at (25, 0, 0); goal at (31, 0, 0) is exactly
        // min_distance + 1 away, which counts.
        let cfg = Config {
            goal: p(31.0, 0.0, 0.0),
            ..line_config()
        };
        let sampler = ScriptedSampler::new(vec![p(10.0, 0.0, 0.0), p(25.0, 0.0, 0.0)]);
        let mut planner = Planner::new(cfg, sampler).unwrap();

        assert_eq!(planner.step(), Ok(GrowthState::Growing));
        assert_eq!(planner.step(), Ok(GrowthState::Growing));
        assert_eq!(planner.tree().nodes()[2].pos, p(20.0, 0.0, 0.0));

        // Next draw is (10,0,0) again: rejected, it sits on node 1. Then
        // (25,0,0) is 5 from node 2 and 6 from the goal.
        assert_eq!(planner.step(), Ok(GrowthState::Succeeded));
        let goal_id = planner.goal().id().unwrap();
        assert_eq!(planner.tree().nodes()[goal_id].parent, Some(2));
    }

    #[test]
    fn zero_budget_exhausts_immediately() {
        let cfg = Config {
            max_iterations: 0,
            ..line_config()
        };
        let sampler = ScriptedSampler::new(vec![p(50.0, 0.0, 0.0)]);
        let mut planner = Planner::new(cfg, sampler).unwrap();

        let report = planner.run().unwrap();
        assert!(!report.succeeded);
        assert_eq!(report.iterations, 0);
        assert_eq!(report.nodes, 1);
        assert!(report.path.is_empty());
        assert_eq!(planner.state(), GrowthState::ExhaustedIterations);
        assert_eq!(planner.sampler.drawn(), 0);
    }

    #[test]
    fn budget_caps_attachments() {
        let cfg = Config {
            goal: p(50.0, 50.0, 50.0),
            max_iterations: 3,
            ..line_config()
        };
        // Wander along y, away from the goal.
        let sampler = ScriptedSampler::new(vec![p(0.0, 50.0, 0.0)]);
        let mut planner = Planner::new(cfg, sampler).unwrap();

        let report = planner.run().unwrap();
        assert_eq!(planner.state(), GrowthState::ExhaustedIterations);
        assert_eq!(report.iterations, 3);
        assert_eq!(report.nodes, 4);
        assert_eq!(planner.extract_path(), Err(PlannerError::GoalDetached));
    }

    #[test]
    fn terminal_states_are_sticky() {
        let sampler = ScriptedSampler::new(vec![p(50.0, 0.0, 0.0)]);
        let mut planner = Planner::new(line_config(), sampler).unwrap();
        planner.run().unwrap();

        let nodes = planner.tree().len();
        let drawn = planner.sampler.drawn();
        assert_eq!(planner.step(), Ok(GrowthState::Succeeded));
        assert_eq!(planner.tree().len(), nodes);
        assert_eq!(planner.sampler.drawn(), drawn);
    }

    #[test]
    fn goal_cannot_attach_twice() {
        let mut tree = Tree::new(Point3::ZERO);
        let mut goal = Goal::new(p(6.0, 0.0, 0.0));
        let id = goal.attach(&mut tree, 0).unwrap();
        assert_eq!(goal.id(), Some(id));
        assert_eq!(goal.attach(&mut tree, 0), Err(PlannerError::GoalAlreadyAttached));
        assert_eq!(tree.len(), 2);
    }

    #[test]
    fn extract_path_is_repeatable() {
        let sampler = ScriptedSampler::new(vec![p(50.0, 0.0, 0.0)]);
        let mut planner = Planner::new(line_config(), sampler).unwrap();
        planner.run().unwrap();

        let first = planner.path().to_vec();
        let second = planner.extract_path().unwrap().to_vec();
        assert_eq!(first, second);
    }

    #[test]
    fn report_renders_path_lines() {
        let sampler = ScriptedSampler::new(vec![p(50.0, 0.0, 0.0)]);
        let mut planner = Planner::new(line_config(), sampler).unwrap();
        let text = planner.run().unwrap().to_string();

        assert!(text.starts_with("Start: (0, 0, 0)\nFinish: (40, 0, 0)\n"));
        assert!(text.contains("Found path\nIterations: 4\nPath:\n"));
        assert!(text.contains("1 (0, 0, 0)\n"));
        assert!(text.ends_with("5 (40, 0, 0)\n"));

        let failed = PlanReport {
            succeeded: false,
            path: Vec::new(),
            ..planner.report()
        };
        assert!(failed.to_string().ends_with("Max iterations\nPath not found\n"));
    }

    #[test]
    fn seeded_runs_are_reproducible() {
        let cfg = Config {
            seed: Some(9),
            ..Config::default()
        };
        let a = Planner::from_config(cfg.clone()).unwrap().run().unwrap();
        let b = Planner::from_config(cfg).unwrap().run().unwrap();
        assert_eq!(a, b);
    }
}
