//! Error types for the planner.

use crate::types::NodeId;
use thiserror::Error;

/// A configuration that the planner refuses to run with.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// Some parameter is NaN or infinite.
    #[error("{0} must be finite")]
    NotFinite(&'static str),

    /// Volume extent along some axis is zero or negative.
    #[error("volume bounds must be positive, got ({x}, {y}, {z})")]
    NonPositiveBounds { x: f64, y: f64, z: f64 },

    /// Minimum edge length is zero or negative.
    #[error("min_distance must be positive, got {0}")]
    NonPositiveMinDistance(f64),

    /// Maximum edge length is below the minimum.
    #[error("max_distance ({max}) is smaller than min_distance ({min})")]
    MaxBelowMin { min: f64, max: f64 },

    /// No point of the volume can be `min_distance` away from anything.
    #[error("min_distance ({min}) is not smaller than the volume diagonal ({diagonal})")]
    MinDistanceExceedsVolume { min: f64, diagonal: f64 },

    /// Start point lies outside the sampling volume.
    #[error("start point ({x}, {y}, {z}) lies outside the volume")]
    StartOutsideVolume { x: f64, y: f64, z: f64 },

    /// The rejection loop would not be allowed a single draw.
    #[error("max_sample_retries must be at least 1")]
    ZeroSampleRetries,
}

/// Errors that can occur while growing the tree or extracting a path.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PlannerError {
    /// Construction was attempted with an invalid configuration.
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    /// Every draw of one growth step landed too close to the tree.
    #[error("no acceptable sample after {retries} draws")]
    SamplingStalled { retries: usize },

    /// The goal node can only join the tree once.
    #[error("goal node is already attached")]
    GoalAlreadyAttached,

    /// Path extraction needs the goal to be part of the tree.
    #[error("goal node is not attached to the tree")]
    GoalDetached,

    /// A node id that does not belong to the tree.
    #[error("node not found: {0}")]
    UnknownNode(NodeId),
}

/// A structural defect found by [`crate::tree::Tree::validate`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TreeError {
    /// Node 0 must be the one and only parentless node.
    #[error("node {0} has no parent but is not the root")]
    ExtraRoot(NodeId),

    /// The root was given a parent.
    #[error("root has a parent")]
    RootHasParent,

    /// A parent link without the matching child entry, or the reverse.
    #[error("parent/child links disagree at node {0}")]
    LinkMismatch(NodeId),

    /// A node reached twice while walking down from the root.
    #[error("node {0} is reachable along more than one path")]
    Revisited(NodeId),

    /// A node the root cannot reach.
    #[error("node {0} is unreachable from the root")]
    Unreachable(NodeId),
}
