//! Rapidly-exploring random tree (RRT) planning in a bounded 3-D volume.
//!
//! Main components:
//! - [`types`] — node ids, the point type and the distance metric.
//! - [`config`] — run parameters and their validation.
//! - [`tree`] — the arena-backed search tree and nearest-neighbor search.
//! - [`sampler`] — sampling of the volume and edge-length steering.
//! - [`planner`] — the growth loop state machine and its report.
//! - [`path`] — root-to-node path extraction.
//! - [`error`] — configuration and planning errors.

pub mod config;
pub mod error;
pub mod path;
pub mod planner;
pub mod sampler;
pub mod tree;
pub mod types;

pub use config::Config;
pub use error::{ConfigError, PlannerError};
pub use planner::{GrowthState, PlanReport, Planner};
pub use types::{NodeId, Point3, distance};
