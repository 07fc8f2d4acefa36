//! Search trace through a built BST, used to highlight a lookup.

use std::cmp::Ordering;

use tracing::{debug, instrument};

use crate::domain::arena::{Node, NodeId};
use crate::domain::bst::compare_keys;
use crate::domain::model::BuildResult;

/// Nodes touched by a lookup.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchTrace {
    /// Path from the root, in visiting order (includes `found`)
    pub visited: Vec<NodeId>,
    pub found: Option<NodeId>,
    /// Value nodes of every branch the lookup did not take
    pub dimmed: Vec<NodeId>,
}

/// Walk from the root towards `probe` using the BST ordering.
#[instrument(level = "debug", skip(result))]
pub fn search_trace(result: &BuildResult, probe: &str) -> SearchTrace {
    let probe_node = Node::new(probe);
    let mut trace = SearchTrace::default();
    let mut current = result.root;

    while let Some(idx) = current {
        let Some(node) = result.arena.get(idx) else {
            break;
        };
        trace.visited.push(idx);

        if matches(&probe_node, node) {
            trace.found = Some(idx);
            break;
        }

        let (next, other) = if compare_keys(&probe_node, node) == Ordering::Less {
            (node.left, node.right)
        } else {
            (node.right, node.left)
        };
        trace.dimmed.extend(
            result
                .arena
                .iter_preorder(other)
                .filter(|(_, n)| !n.is_null_marker)
                .map(|(i, _)| i),
        );
        current = next;
    }

    debug!(
        visited = trace.visited.len(),
        found = trace.found.is_some(),
        "search finished"
    );
    trace
}

fn matches(probe: &Node, node: &Node) -> bool {
    if probe.is_numeric() && node.is_numeric() {
        probe.numeric_value == node.numeric_value
    } else {
        probe.raw_value == node.raw_value
    }
}
