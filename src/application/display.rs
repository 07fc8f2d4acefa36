//! Plain-text rendering of a build result.

use std::collections::HashMap;

use termtree::Tree;

use crate::domain::graph::DEFAULT_WEIGHT;
use crate::domain::{BuildResult, NodeId, Side};

pub trait TreeDisplay {
    fn to_tree_string(&self) -> Tree<String>;
}

impl TreeDisplay for BuildResult {
    fn to_tree_string(&self) -> Tree<String> {
        if self.mode.is_tree() {
            tree_view(self)
        } else {
            graph_view(self)
        }
    }
}

fn label(result: &BuildResult, idx: NodeId) -> String {
    match result.arena.get(idx) {
        Some(node) => match node.side {
            Side::Left => format!("L: {}", node.raw_value),
            Side::Right => format!("R: {}", node.raw_value),
            Side::None => node.raw_value.clone(),
        },
        None => "?".to_string(),
    }
}

/// Built bottom-up in post-order so deep trees need no recursion.
fn tree_view(result: &BuildResult) -> Tree<String> {
    let Some(root) = result.root else {
        return Tree::new("Empty tree".to_string());
    };

    let mut finished: HashMap<NodeId, Tree<String>> = HashMap::new();
    let mut stack = vec![(root, false)];

    while let Some((idx, expanded)) = stack.pop() {
        let Some(node) = result.arena.get(idx) else {
            continue;
        };
        let slots = [node.left, node.right];
        if expanded {
            let leaves: Vec<Tree<String>> = slots
                .into_iter()
                .flatten()
                .filter_map(|child| finished.remove(&child))
                .collect();
            finished.insert(idx, Tree::new(label(result, idx)).with_leaves(leaves));
        } else {
            stack.push((idx, true));
            for child in slots.into_iter().flatten().rev() {
                stack.push((child, false));
            }
        }
    }

    finished
        .remove(&root)
        .unwrap_or_else(|| Tree::new("Empty tree".to_string()))
}

fn graph_view(result: &BuildResult) -> Tree<String> {
    let mut tree = Tree::new(format!(
        "graph: {} nodes, {} edges, {} components",
        result.nodes.len(),
        result.edges.len(),
        result.components.len()
    ));

    for (pos, component) in result.components.iter().enumerate() {
        let members: Vec<Tree<String>> = component
            .nodes
            .iter()
            .map(|&idx| Tree::new(result.value(idx).to_string()))
            .collect();
        tree.push(Tree::new(format!("component {}", pos + 1)).with_leaves(members));
    }

    if !result.edges.is_empty() {
        let edges: Vec<Tree<String>> = result
            .edges
            .iter()
            .map(|e| {
                let arrow = if e.directed { "->" } else { "--" };
                if e.weight == DEFAULT_WEIGHT {
                    Tree::new(format!("{} {} {}", e.source, arrow, e.target))
                } else {
                    Tree::new(format!("{} {} {} ({})", e.source, arrow, e.target, e.weight))
                }
            })
            .collect();
        tree.push(Tree::new("edges".to_string()).with_leaves(edges));
    }

    tree
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::dispatcher::build;
    use crate::domain::{BuildMode, BuildOptions};

    #[test]
    fn given_bst_when_rendering_then_shows_sides_and_hides_placeholders() {
        let result = build("2 1", &BuildOptions::default()).unwrap();

        let text = result.to_tree_string().to_string();

        assert!(text.starts_with("2\n"));
        assert!(text.contains("L: 1"));
        assert!(!text.contains("Empty"));
    }

    #[test]
    fn given_graph_when_rendering_then_lists_components_and_edges() {
        let options = BuildOptions {
            mode: BuildMode::Graph,
            weighted: true,
            directed: true,
            ..BuildOptions::default()
        };
        let result = build("A,B,3 C", &options).unwrap();

        let text = result.to_tree_string().to_string();

        assert!(text.contains("component 1"));
        assert!(text.contains("component 2"));
        assert!(text.contains("A -> B (3)"));
    }
}
