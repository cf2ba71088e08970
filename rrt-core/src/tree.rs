use crate::{
    error::{PlannerError, TreeError},
    types::{NodeId, Point3, distance},
};
use std::collections::VecDeque;

/// One node of the search tree.
///
/// `parent` is a plain index back toward the root and never owns anything;
/// the arena in [`Tree`] owns every node, and `children` records the
/// parent-to-child relation in attachment order.
#[derive(Debug, Clone)]
pub struct TreeNode {
    pub pos: Point3,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
}

/// Arena-backed tree rooted at node `0`.
///
/// Nodes are only ever appended, so every id handed out stays valid for the
/// lifetime of the tree and dropping the tree frees all nodes at once.
#[derive(Debug, Clone)]
pub struct Tree {
    nodes: Vec<TreeNode>,
}

impl TreeNode {
    pub fn new_root(pos: Point3) -> Self {
        Self {
            pos,
            parent: None,
            children: Vec::with_capacity(4),
        }
    }

    pub fn new_child(pos: Point3, parent: NodeId) -> Self {
        Self {
            pos,
            parent: Some(parent),
            children: Vec::with_capacity(4),
        }
    }
}

impl Tree {
    /// Id of the root node.
    pub const ROOT: NodeId = 0;

    pub fn new(root_pos: Point3) -> Self {
        Self {
            nodes: vec![TreeNode::new_root(root_pos)],
        }
    }

    pub fn with_capacity(root_pos: Point3, capacity: usize) -> Self {
        let mut nodes = Vec::with_capacity(capacity.max(1));
        nodes.push(TreeNode::new_root(root_pos));
        Self { nodes }
    }

    #[inline]
    pub fn root(&self) -> NodeId {
        Self::ROOT
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// A tree always holds at least its root.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    #[inline]
    pub fn nodes(&self) -> &[TreeNode] {
        &self.nodes
    }

    #[inline]
    pub fn node(&self, id: NodeId) -> Option<&TreeNode> {
        self.nodes.get(id)
    }

    #[inline]
    pub fn contains(&self, id: NodeId) -> bool {
        id < self.nodes.len()
    }

    /// Creates a node at `pos` and attaches it under `parent`.
    ///
    /// The new node is appended to the parent's children and gets `parent`
    /// as its back-reference, so both sides of the link are set together.
    ///
    /// ### Returns
    /// The id of the new node, or [`PlannerError::UnknownNode`] if `parent`
    /// is not in the tree.
    pub fn add_child(&mut self, parent: NodeId, pos: Point3) -> Result<NodeId, PlannerError> {
        if !self.contains(parent) {
            return Err(PlannerError::UnknownNode(parent));
        }
        let id = self.nodes.len();
        self.nodes.push(TreeNode::new_child(pos, parent));
        self.nodes[parent].children.push(id);
        log::trace!("attached node {id} under {parent} at {pos}");
        Ok(id)
    }

    /// Finds the node closest to `query`.
    ///
    /// Walks the whole tree breadth-first from the root. The best candidate
    /// is only replaced on a strictly smaller distance, so on ties the node
    /// visited first wins.
    ///
    /// ### Returns
    /// The nearest node id and its distance to `query`.
    pub fn find_nearest(&self, query: Point3) -> (NodeId, f64) {
        let mut best = Self::ROOT;
        let mut best_d = distance(self.nodes[Self::ROOT].pos, query);

        let mut queue = VecDeque::with_capacity(self.nodes.len());
        queue.push_back(Self::ROOT);
        while let Some(id) = queue.pop_front() {
            let node = &self.nodes[id];
            queue.extend(node.children.iter().copied());

            let d = distance(node.pos, query);
            if d < best_d {
                best_d = d;
                best = id;
            }
        }
        (best, best_d)
    }

    /// Number of edges between `id` and the root.
    pub fn depth(&self, id: NodeId) -> Result<usize, PlannerError> {
        let mut current = self.node(id).ok_or(PlannerError::UnknownNode(id))?;
        let mut depth = 0;
        while let Some(parent) = current.parent {
            current = &self.nodes[parent];
            depth += 1;
        }
        Ok(depth)
    }

    /// Checks that the arena still forms a single tree.
    ///
    /// Verifies that only the root lacks a parent, that parent and child
    /// links agree in both directions, and that a walk from the root
    /// reaches every node exactly once.
    pub fn validate(&self) -> Result<(), TreeError> {
        if self.nodes[Self::ROOT].parent.is_some() {
            return Err(TreeError::RootHasParent);
        }

        for (id, node) in self.nodes.iter().enumerate() {
            match node.parent {
                None if id != Self::ROOT => return Err(TreeError::ExtraRoot(id)),
                Some(p) => {
                    let linked = self
                        .nodes
                        .get(p)
                        .is_some_and(|parent| parent.children.contains(&id));
                    if !linked {
                        return Err(TreeError::LinkMismatch(id));
                    }
                }
                None => {}
            }
            for &child in &node.children {
                if self.nodes.get(child).and_then(|c| c.parent) != Some(id) {
                    return Err(TreeError::LinkMismatch(child));
                }
            }
        }

        let mut seen = vec![false; self.nodes.len()];
        let mut queue = VecDeque::from([Self::ROOT]);
        while let Some(id) = queue.pop_front() {
            if std::mem::replace(&mut seen[id], true) {
                return Err(TreeError::Revisited(id));
            }
            queue.extend(self.nodes[id].children.iter().copied());
        }
        match seen.iter().position(|&s| !s) {
            Some(id) => Err(TreeError::Unreachable(id)),
            None => Ok(()),
        }
    }

    #[cfg(test)]
    pub(crate) fn nodes_mut(&mut self) -> &mut Vec<TreeNode> {
        &mut self.nodes
    }
}
