//! Random sampling of the planning volume and edge-length steering.
//!
//! - [`Sampler`] is the seam for the point source; [`UniformSampler`] draws
//!   from an RNG and [`ScriptedSampler`] replays fixed points for tests.
//! - [`steer`] turns a raw sample into a candidate node position.

use crate::types::{Point3, distance};
use rand::Rng;

/// Source of candidate points for the growth loop.
pub trait Sampler {
    fn sample(&mut self) -> Point3;
}

/// Draws every coordinate uniformly from `[0, bound]` on its axis.
#[derive(Debug, Clone)]
pub struct UniformSampler<R> {
    bounds: Point3,
    lattice: bool,
    rng: R,
}

impl<R: Rng> UniformSampler<R> {
    pub fn new(bounds: Point3, rng: R) -> Self {
        Self {
            bounds,
            lattice: false,
            rng,
        }
    }

    /// Restricts samples to whole-number coordinates.
    pub fn with_lattice(mut self, lattice: bool) -> Self {
        self.lattice = lattice;
        self
    }
}

impl<R: Rng> Sampler for UniformSampler<R> {
    fn sample(&mut self) -> Point3 {
        if self.lattice {
            let x = self.rng.random_range(0..=self.bounds.x.floor() as i64);
            let y = self.rng.random_range(0..=self.bounds.y.floor() as i64);
            let z = self.rng.random_range(0..=self.bounds.z.floor() as i64);
            Point3::new(x as f64, y as f64, z as f64)
        } else {
            let x = self.rng.random_range(0.0..=self.bounds.x);
            let y = self.rng.random_range(0.0..=self.bounds.y);
            let z = self.rng.random_range(0.0..=self.bounds.z);
            Point3::new(x, y, z)
        }
    }
}

/// Replays a fixed list of points, wrapping around at the end.
#[derive(Debug, Clone)]
pub struct ScriptedSampler {
    points: Vec<Point3>,
    next: usize,
}

impl ScriptedSampler {
    /// ### Panics
    /// Panics if `points` is empty.
    pub fn new(points: Vec<Point3>) -> Self {
        assert!(!points.is_empty(), "scripted sampler needs at least one point");
        Self { points, next: 0 }
    }

    /// Number of points handed out so far.
    pub fn drawn(&self) -> usize {
        self.next
    }
}

impl Sampler for ScriptedSampler {
    fn sample(&mut self) -> Point3 {
        let p = self.points[self.next % self.points.len()];
        self.next += 1;
        p
    }
}

/// Outcome of steering a sample toward its nearest tree node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Steered {
    /// Closer than `min_distance`; draw again.
    Rejected,
    /// Already within `[min_distance, max_distance]`.
    Unchanged(Point3),
    /// Pulled in to exactly `max_distance` from the nearest node.
    Rescaled(Point3),
}

impl Steered {
    /// The candidate position, if the sample was accepted.
    pub fn point(self) -> Option<Point3> {
        match self {
            Steered::Rejected => None,
            Steered::Unchanged(p) | Steered::Rescaled(p) => Some(p),
        }
    }
}

/// Bounds the edge from `nearest` to `sample`.
///
/// Pure function of its inputs. Samples exactly at `min_distance` or
/// `max_distance` are returned as they are.
pub fn steer(sample: Point3, nearest: Point3, min_distance: f64, max_distance: f64) -> Steered {
    let d = distance(sample, nearest);
    if d < min_distance {
        Steered::Rejected
    } else if d > max_distance {
        // d > max_distance > 0, so the direction is well defined.
        let dir = (sample - nearest) / d;
        Steered::Rescaled(nearest + dir * max_distance)
    } else {
        Steered::Unchanged(sample)
    }
}
