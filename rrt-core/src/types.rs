use glam::DVec3;

/// Identifier for a node in a [`crate::tree::Tree`].
///
/// This is an index into `Tree::nodes`, and is only meaningful within
/// the lifetime of a given `Tree` instance.
pub type NodeId = usize;

/// A point in the planning volume.
pub type Point3 = DVec3;

/// Euclidean distance between two points.
///
/// This is the only metric used by the planner: nearest-neighbor search,
/// steering and the goal test all go through it.
#[inline]
pub fn distance(a: Point3, b: Point3) -> f64 {
    a.distance(b)
}
