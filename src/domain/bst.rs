//! Binary search tree construction by sequential insertion.

use std::cmp::Ordering;

use tracing::{debug, instrument, trace};

use crate::domain::arena::{Node, NodeArena, NodeId, Side};
use crate::domain::completion::complete_tree;
use crate::domain::error::DomainResult;
use crate::domain::level_order::LevelOrderBuilder;
use crate::domain::model::{BuildMode, BuildResult};
use crate::domain::token::{has_null_markers, Token};

/// Order of a candidate key relative to a node already in the tree.
///
/// Numeric candidates compare numerically, a non-numeric node counting as
/// `0`. Non-numeric candidates compare their raw text lexicographically.
pub fn compare_keys(candidate: &Node, current: &Node) -> Ordering {
    if candidate.is_numeric() {
        let b = if current.is_numeric() {
            current.numeric_value
        } else {
            0.0
        };
        candidate
            .numeric_value
            .partial_cmp(&b)
            .unwrap_or(Ordering::Equal)
    } else {
        candidate.raw_value.cmp(&current.raw_value)
    }
}

/// Builds a BST from tokens whose first element is the root.
///
/// Expects input that passed [`crate::domain::validator::validate`];
/// duplicate keys are not rejected here and would descend to the right.
#[derive(Debug, Default)]
pub struct BstBuilder;

impl BstBuilder {
    pub fn new() -> Self {
        Self
    }

    /// Null markers mean the caller spelled out the shape, so the tokens
    /// are laid out in level order instead of being inserted by key.
    #[instrument(level = "debug", skip(self, tokens), fields(tokens = tokens.len()))]
    pub fn build(&self, tokens: &[Token]) -> DomainResult<BuildResult> {
        if has_null_markers(tokens) {
            debug!("null markers present, using level-order layout");
            let mut result = LevelOrderBuilder::new().build(tokens)?;
            result.mode = BuildMode::Bst;
            return Ok(result);
        }

        let mut arena = NodeArena::new();
        let mut nodes = Vec::with_capacity(tokens.len());
        let mut root = None;

        for token in tokens {
            let idx = arena.insert(Node::new(token.raw.as_str()));
            nodes.push(idx);
            match root {
                None => {
                    debug!(root = %token.raw, "BST root");
                    root = Some(idx);
                }
                Some(root_idx) => insert(&mut arena, root_idx, idx)?,
            }
        }

        complete_tree(&mut arena, root)?;
        Ok(BuildResult::tree(BuildMode::Bst, arena, root, nodes))
    }
}

/// Descend from `root` and hang `idx` into the first free slot on its path.
///
/// Smaller keys go left, ties and larger keys go right. A null-marker
/// candidate fills the left slot when free and otherwise moves right.
pub fn insert(arena: &mut NodeArena, root: NodeId, idx: NodeId) -> DomainResult<()> {
    let mut current = root;
    loop {
        let (side, next) = {
            let cur = arena.node(current)?;
            let candidate = arena.node(idx)?;
            let side = if candidate.is_null_marker {
                if cur.left.is_none() {
                    Side::Left
                } else {
                    Side::Right
                }
            } else if compare_keys(candidate, cur) == Ordering::Less {
                Side::Left
            } else {
                Side::Right
            };
            let next = match side {
                Side::Left => cur.left,
                _ => cur.right,
            };
            (side, next)
        };

        match next {
            Some(child) => current = child,
            None => {
                trace!(parent = ?current, ?side, "inserted node");
                return arena.attach(current, idx, side);
            }
        }
    }
}
