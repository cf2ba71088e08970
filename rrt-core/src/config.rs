use crate::{error::ConfigError, types::Point3};
use serde::{Deserialize, Serialize};

/// Planner parameters, fixed for the whole run.
///
/// The volume spans `[0, bounds.x] x [0, bounds.y] x [0, bounds.z]`.
/// [`Config::default`] is the reference scenario: a 50-unit cube with the
/// start in one corner and the goal in the opposite one.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub start: Point3,
    pub goal: Point3,
    pub bounds: Point3,
    pub min_distance: f64,
    pub max_distance: f64,
    pub max_iterations: usize,
    /// Upper limit on draws within one growth step before giving up.
    pub max_sample_retries: usize,
    /// Fixed RNG seed; `None` seeds from the OS.
    pub seed: Option<u64>,
    /// Draw each coordinate uniformly from the whole numbers in `[0, bound]`.
    pub lattice: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            start: Point3::ZERO,
            goal: Point3::splat(50.0),
            bounds: Point3::splat(50.0),
            min_distance: 5.0,
            max_distance: 10.0,
            max_iterations: 10_000,
            max_sample_retries: 100_000,
            seed: None,
            lattice: false,
        }
    }
}

impl Config {
    /// Distance from the goal at which a candidate counts as having reached it.
    #[inline]
    pub fn goal_tolerance(&self) -> f64 {
        self.min_distance + 1.0
    }

    /// Length of the main diagonal of the region samples can land in.
    ///
    /// With `lattice` set, samples only reach the whole-number part of each
    /// bound.
    #[inline]
    pub fn diagonal(&self) -> f64 {
        if self.lattice {
            self.bounds.floor().length()
        } else {
            self.bounds.length()
        }
    }

    /// Returns `true` if `p` lies inside the closed sampling volume.
    pub fn contains(&self, p: Point3) -> bool {
        p.cmpge(Point3::ZERO).all() && p.cmple(self.bounds).all()
    }

    /// Checks the preconditions the growth loop relies on.
    ///
    /// ### Returns
    /// - `Ok(())` if the configuration can be planned with.
    /// - `Err` with the first violated precondition otherwise.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.start.is_finite() {
            return Err(ConfigError::NotFinite("start"));
        }
        if !self.goal.is_finite() {
            return Err(ConfigError::NotFinite("goal"));
        }
        if !self.bounds.is_finite() {
            return Err(ConfigError::NotFinite("bounds"));
        }
        if !self.min_distance.is_finite() {
            return Err(ConfigError::NotFinite("min_distance"));
        }
        if !self.max_distance.is_finite() {
            return Err(ConfigError::NotFinite("max_distance"));
        }

        if !self.bounds.cmpgt(Point3::ZERO).all() {
            return Err(ConfigError::NonPositiveBounds {
                x: self.bounds.x,
                y: self.bounds.y,
                z: self.bounds.z,
            });
        }
        if self.min_distance <= 0.0 {
            return Err(ConfigError::NonPositiveMinDistance(self.min_distance));
        }
        if self.max_distance < self.min_distance {
            return Err(ConfigError::MaxBelowMin {
                min: self.min_distance,
                max: self.max_distance,
            });
        }
        let diagonal = self.diagonal();
        if self.min_distance >= diagonal {
            return Err(ConfigError::MinDistanceExceedsVolume {
                min: self.min_distance,
                diagonal,
            });
        }
        if !self.contains(self.start) {
            return Err(ConfigError::StartOutsideVolume {
                x: self.start.x,
                y: self.start.y,
                z: self.start.z,
            });
        }
        if self.max_sample_retries == 0 {
            return Err(ConfigError::ZeroSampleRetries);
        }
        Ok(())
    }
}
