//! Arena-backed node storage shared by all builders.
//!
//! Nodes never own each other: `left`, `right`, `parent` and `children` are
//! arena indices, so the arena is the single owner of every node allocated
//! during a build pass.

use std::fmt;

use generational_arena::{Arena, Index};
use tracing::instrument;

use crate::domain::error::{DomainError, DomainResult};

/// Handle of a node inside a [`NodeArena`].
pub type NodeId = Index;

/// Label carried by synthetic placeholder nodes.
pub const PLACEHOLDER_LABEL: &str = "Empty";

/// Which slot of its parent a node occupies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Left,
    Right,
    #[default]
    None,
}

/// A single tree or graph vertex.
#[derive(Debug, Clone)]
pub struct Node {
    pub raw_value: String,
    /// Parsed value, `NaN` when `raw_value` is not numeric
    pub numeric_value: f64,
    pub is_null_marker: bool,
    pub left: Option<NodeId>,
    pub right: Option<NodeId>,
    pub parent: Option<NodeId>,
    /// Render order: left slot first; graph nodes list adjacent nodes
    pub children: Vec<NodeId>,
    pub side: Side,
}

impl Node {
    pub fn new(raw_value: impl Into<String>) -> Self {
        let raw_value = raw_value.into();
        let numeric_value = raw_value.trim().parse::<f64>().unwrap_or(f64::NAN);
        Self {
            raw_value,
            numeric_value,
            is_null_marker: false,
            left: None,
            right: None,
            parent: None,
            children: Vec::new(),
            side: Side::None,
        }
    }

    /// Node standing in for an explicit null token.
    pub fn null_marker(raw_value: impl Into<String>) -> Self {
        Self {
            is_null_marker: true,
            numeric_value: f64::NAN,
            ..Self::new(raw_value)
        }
    }

    /// Hidden filler inserted by the completion pass.
    pub fn placeholder(side: Side) -> Self {
        Self {
            side,
            ..Self::null_marker(PLACEHOLDER_LABEL)
        }
    }

    pub fn is_placeholder(&self) -> bool {
        self.is_null_marker && self.raw_value == PLACEHOLDER_LABEL
    }

    pub fn is_numeric(&self) -> bool {
        !self.numeric_value.is_nan()
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.raw_value)
    }
}

/// Owner of every node created by one build pass.
#[derive(Debug, Default, Clone)]
pub struct NodeArena {
    arena: Arena<Node>,
}

impl NodeArena {
    pub fn new() -> Self {
        Self::default()
    }

    #[instrument(level = "trace", skip(self))]
    pub fn insert(&mut self, node: Node) -> NodeId {
        self.arena.insert(node)
    }

    pub fn get(&self, idx: NodeId) -> Option<&Node> {
        self.arena.get(idx)
    }

    pub fn get_mut(&mut self, idx: NodeId) -> Option<&mut Node> {
        self.arena.get_mut(idx)
    }

    /// Lookup that turns a dangling handle into a build failure.
    pub fn node(&self, idx: NodeId) -> DomainResult<&Node> {
        self.arena
            .get(idx)
            .ok_or_else(|| DomainError::Internal(format!("dangling node handle {idx:?}")))
    }

    pub fn node_mut(&mut self, idx: NodeId) -> DomainResult<&mut Node> {
        self.arena
            .get_mut(idx)
            .ok_or_else(|| DomainError::Internal(format!("dangling node handle {idx:?}")))
    }

    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    /// Attach `child` to `parent` on the given side, recording the back-reference.
    #[instrument(level = "trace", skip(self))]
    pub fn attach(&mut self, parent: NodeId, child: NodeId, side: Side) -> DomainResult<()> {
        let parent_node = self.node_mut(parent)?;
        match side {
            Side::Left => parent_node.left = Some(child),
            Side::Right => parent_node.right = Some(child),
            Side::None => {
                return Err(DomainError::Internal(
                    "cannot attach a child without a side".to_string(),
                ))
            }
        }
        let child_node = self.node_mut(child)?;
        child_node.parent = Some(parent);
        child_node.side = side;
        Ok(())
    }

    /// Pre-order walk over the binary slots (`left`, `right`) from `root`.
    pub fn iter_preorder(&self, root: Option<NodeId>) -> PreOrderIterator<'_> {
        PreOrderIterator::new(self, root)
    }

    /// In-order walk over the binary slots (`left`, `right`) from `root`.
    pub fn iter_inorder(&self, root: Option<NodeId>) -> InOrderIterator<'_> {
        InOrderIterator::new(self, root)
    }

    /// Number of levels below and including `root`, following binary slots.
    pub fn depth(&self, root: Option<NodeId>) -> usize {
        let mut max_depth = 0;
        let mut stack: Vec<(NodeId, usize)> = root.map(|r| (r, 1)).into_iter().collect();
        while let Some((idx, depth)) = stack.pop() {
            max_depth = max_depth.max(depth);
            if let Some(node) = self.get(idx) {
                for child in [node.left, node.right].into_iter().flatten() {
                    stack.push((child, depth + 1));
                }
            }
        }
        max_depth
    }
}

pub struct PreOrderIterator<'a> {
    arena: &'a NodeArena,
    stack: Vec<NodeId>,
}

impl<'a> PreOrderIterator<'a> {
    fn new(arena: &'a NodeArena, root: Option<NodeId>) -> Self {
        Self {
            arena,
            stack: root.into_iter().collect(),
        }
    }
}

impl<'a> Iterator for PreOrderIterator<'a> {
    type Item = (NodeId, &'a Node);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some(current_idx) = self.stack.pop() {
            if let Some(node) = self.arena.get(current_idx) {
                // right first so that left is popped next
                if let Some(right) = node.right {
                    self.stack.push(right);
                }
                if let Some(left) = node.left {
                    self.stack.push(left);
                }
                return Some((current_idx, node));
            }
        }
        None
    }
}

pub struct InOrderIterator<'a> {
    arena: &'a NodeArena,
    stack: Vec<(NodeId, bool)>,
}

impl<'a> InOrderIterator<'a> {
    fn new(arena: &'a NodeArena, root: Option<NodeId>) -> Self {
        Self {
            arena,
            stack: root.map(|r| (r, false)).into_iter().collect(),
        }
    }
}

impl<'a> Iterator for InOrderIterator<'a> {
    type Item = (NodeId, &'a Node);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((current_idx, expanded)) = self.stack.pop() {
            if let Some(node) = self.arena.get(current_idx) {
                if expanded {
                    return Some((current_idx, node));
                }
                if let Some(right) = node.right {
                    self.stack.push((right, false));
                }
                self.stack.push((current_idx, true));
                if let Some(left) = node.left {
                    self.stack.push((left, false));
                }
            }
        }
        None
    }
}
