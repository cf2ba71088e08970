use crate::{
    error::PlannerError,
    tree::Tree,
    types::{NodeId, Point3},
};

/// Walks parent links from `id` up to the root.
///
/// ### Returns
/// Node ids in root-to-`id` order, so the first element is the root and the
/// last one is `id`. The length is the depth of `id` plus one.
pub fn extract(tree: &Tree, id: NodeId) -> Result<Vec<NodeId>, PlannerError> {
    let mut current = tree.node(id).ok_or(PlannerError::UnknownNode(id))?;
    let mut path = vec![id];
    while let Some(parent) = current.parent {
        path.push(parent);
        current = &tree.nodes()[parent];
    }
    path.reverse();
    Ok(path)
}

/// Positions of the nodes along `path`.
pub fn points(tree: &Tree, path: &[NodeId]) -> Vec<Point3> {
    path.iter().map(|&id| tree.nodes()[id].pos).collect()
}
