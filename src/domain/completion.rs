//! Completion pass: give every node with one child a hidden sibling slot.

use tracing::{instrument, trace};

use crate::domain::arena::{Node, NodeArena, NodeId, Side};
use crate::domain::error::DomainResult;

/// Fill `children` of every node reachable from `root` and insert a
/// placeholder opposite each lone child.
///
/// Walks pre-order with an explicit stack, so skewed trees cannot exhaust
/// the call stack. Returns the number of placeholders inserted.
#[instrument(level = "debug", skip(arena))]
pub fn complete_tree(arena: &mut NodeArena, root: Option<NodeId>) -> DomainResult<usize> {
    let mut inserted = 0;
    let mut stack: Vec<NodeId> = root.into_iter().collect();

    while let Some(idx) = stack.pop() {
        let (left, right) = {
            let node = arena.node(idx)?;
            (node.left, node.right)
        };

        let children = match (left, right) {
            (Some(l), Some(r)) => vec![l, r],
            (Some(l), None) => vec![l, placeholder(arena, idx, Side::Right)?],
            (None, Some(r)) => vec![placeholder(arena, idx, Side::Left)?, r],
            (None, None) => Vec::new(),
        };
        if left.is_some() != right.is_some() {
            inserted += 1;
        }
        trace!(node = ?idx, children = children.len(), "completed node");
        arena.node_mut(idx)?.children = children;

        if let Some(r) = right {
            stack.push(r);
        }
        if let Some(l) = left {
            stack.push(l);
        }
    }

    Ok(inserted)
}

fn placeholder(arena: &mut NodeArena, parent: NodeId, side: Side) -> DomainResult<NodeId> {
    let idx = arena.insert(Node::placeholder(side));
    arena.node_mut(idx)?.parent = Some(parent);
    Ok(idx)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_lone_left_child_when_completing_then_adds_right_placeholder() {
        let mut arena = NodeArena::new();
        let root = arena.insert(Node::new("2"));
        let left = arena.insert(Node::new("1"));
        arena.attach(root, left, Side::Left).unwrap();

        let inserted = complete_tree(&mut arena, Some(root)).unwrap();

        assert_eq!(inserted, 1);
        let children = &arena.get(root).unwrap().children;
        assert_eq!(children.len(), 2);
        assert_eq!(children[0], left);
        let filler = arena.get(children[1]).unwrap();
        assert!(filler.is_placeholder());
        assert_eq!(filler.side, Side::Right);
        assert_eq!(filler.parent, Some(root));
        // binary slots stay untouched
        assert_eq!(arena.get(root).unwrap().right, None);
    }

    #[test]
    fn given_lone_right_child_when_completing_then_placeholder_comes_first() {
        let mut arena = NodeArena::new();
        let root = arena.insert(Node::new("1"));
        let right = arena.insert(Node::new("2"));
        arena.attach(root, right, Side::Right).unwrap();

        complete_tree(&mut arena, Some(root)).unwrap();

        let children = &arena.get(root).unwrap().children;
        assert!(arena.get(children[0]).unwrap().is_placeholder());
        assert_eq!(children[1], right);
    }

    #[test]
    fn given_deep_skewed_tree_when_completing_then_terminates() {
        let mut arena = NodeArena::new();
        let root = arena.insert(Node::new("0"));
        let mut current = root;
        for i in 1..50_000 {
            let next = arena.insert(Node::new(i.to_string()));
            arena.attach(current, next, Side::Right).unwrap();
            current = next;
        }

        let inserted = complete_tree(&mut arena, Some(root)).unwrap();

        assert_eq!(inserted, 49_999);
    }

    #[test]
    fn given_empty_tree_when_completing_then_nothing_happens() {
        let mut arena = NodeArena::new();
        assert_eq!(complete_tree(&mut arena, None).unwrap(), 0);
        assert!(arena.is_empty());
    }
}
