//! Canonical build output handed to renderers.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::arena::{NodeArena, NodeId};

/// Default token standing for "no node here".
pub const DEFAULT_NULL_MARKER: &str = "null";

/// Construction discipline applied to the input tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildMode {
    /// Binary search tree (ordered insertion)
    #[default]
    Bst,
    /// Binary tree in level order
    Bt,
    Graph,
}

impl BuildMode {
    pub fn is_tree(&self) -> bool {
        matches!(self, BuildMode::Bst | BuildMode::Bt)
    }

    /// Usage text shown next to the input field for this mode.
    pub fn input_hint(&self, weighted: bool) -> &'static str {
        match self {
            BuildMode::Bst => {
                "Enter values separated by space. The root is the first element.\n\
                 You can use \"null\" to represent empty nodes.\n\
                 Ex: 10 5 15 null 7 null 20"
            }
            BuildMode::Bt => {
                "Enter values separated by space in level order (breadth-first).\n\
                 You can use \"null\" to represent empty nodes.\n\
                 Ex: 10 5 15 null 7 null 20"
            }
            BuildMode::Graph if weighted => {
                "Enter weighted edges: source,target,weight\n\
                 Ex: A,B,5 A,C,3 B,D,2 C,E,4\n\
                 For standalone nodes: F G H"
            }
            BuildMode::Graph => {
                "Enter unweighted edges: source,target\n\
                 Ex: A,B A,C B,D C,E\n\
                 For standalone nodes: F G H"
            }
        }
    }
}

impl fmt::Display for BuildMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BuildMode::Bst => "bst",
            BuildMode::Bt => "bt",
            BuildMode::Graph => "graph",
        };
        write!(f, "{name}")
    }
}

impl FromStr for BuildMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "bst" => Ok(BuildMode::Bst),
            "bt" => Ok(BuildMode::Bt),
            "graph" => Ok(BuildMode::Graph),
            other => Err(format!("unknown build mode '{other}' (expected bst, bt or graph)")),
        }
    }
}

/// Explicit parameters of a single build pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildOptions {
    pub mode: BuildMode,
    pub weighted: bool,
    pub directed: bool,
    /// Compared case-insensitively
    pub null_marker: String,
    /// Reject `A,` style edge tokens instead of coercing them
    pub strict_edges: bool,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            mode: BuildMode::default(),
            weighted: false,
            directed: false,
            null_marker: DEFAULT_NULL_MARKER.to_string(),
            strict_edges: false,
        }
    }
}

impl BuildOptions {
    pub fn with_mode(mode: BuildMode) -> Self {
        Self {
            mode,
            ..Self::default()
        }
    }
}

/// Graph edge; endpoints are keyed by node value.
#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    pub source: String,
    pub target: String,
    pub source_id: NodeId,
    pub target_id: NodeId,
    pub weight: String,
    pub directed: bool,
}

/// Nodes that are mutually reachable, in discovery order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Component {
    pub nodes: Vec<NodeId>,
}

impl Component {
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// Non-fatal issues found while building.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildWarning {
    /// Level-order tokens left over after every branch terminated
    UnconsumedTokens { entries: Vec<(usize, String)> },
    /// Edge token missing an endpoint, kept as a standalone node
    CoercedEdge { index: usize, token: String },
}

impl fmt::Display for BuildWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuildWarning::UnconsumedTokens { entries } => {
                let listed: Vec<String> = entries
                    .iter()
                    .map(|(index, value)| format!("{value} (index {index})"))
                    .collect();
                write!(
                    f,
                    "ignored tokens below terminated branches: {}",
                    listed.join(", ")
                )
            }
            BuildWarning::CoercedEdge { index, token } => write!(
                f,
                "edge '{token}' at position {index} has a missing endpoint, treated as standalone node"
            ),
        }
    }
}

/// Finished node/edge model of one build pass.
#[derive(Debug, Clone)]
pub struct BuildResult {
    pub mode: BuildMode,
    pub arena: NodeArena,
    /// Tree modes only
    pub root: Option<NodeId>,
    /// Value nodes in input order (tree modes) or first-encounter order (graph)
    pub nodes: Vec<NodeId>,
    /// Graph mode only
    pub components: Vec<Component>,
    /// Graph mode only
    pub edges: Vec<Edge>,
    pub warnings: Vec<BuildWarning>,
}

impl BuildResult {
    pub fn tree(mode: BuildMode, arena: NodeArena, root: Option<NodeId>, nodes: Vec<NodeId>) -> Self {
        Self {
            mode,
            arena,
            root,
            nodes,
            components: Vec::new(),
            edges: Vec::new(),
            warnings: Vec::new(),
        }
    }

    pub fn graph(
        arena: NodeArena,
        nodes: Vec<NodeId>,
        components: Vec<Component>,
        edges: Vec<Edge>,
    ) -> Self {
        Self {
            mode: BuildMode::Graph,
            arena,
            root: None,
            nodes,
            components,
            edges,
            warnings: Vec::new(),
        }
    }

    /// Raw value of a node, empty when the handle is unknown.
    pub fn value(&self, idx: NodeId) -> &str {
        self.arena
            .get(idx)
            .map(|n| n.raw_value.as_str())
            .unwrap_or_default()
    }

    /// Raw values of the tree in in-order, placeholders skipped.
    pub fn inorder_values(&self) -> Vec<String> {
        self.arena
            .iter_inorder(self.root)
            .filter(|(_, n)| !n.is_null_marker)
            .map(|(_, n)| n.raw_value.clone())
            .collect()
    }

    /// Raw values of the tree in pre-order, placeholders skipped.
    pub fn preorder_values(&self) -> Vec<String> {
        self.arena
            .iter_preorder(self.root)
            .filter(|(_, n)| !n.is_null_marker)
            .map(|(_, n)| n.raw_value.clone())
            .collect()
    }

    /// Level-order serialisation with `null_marker` for absent slots,
    /// trailing nulls trimmed.
    pub fn level_order_values(&self, null_marker: &str) -> Vec<String> {
        let mut out = Vec::new();
        let mut queue = std::collections::VecDeque::new();
        if let Some(root) = self.root {
            queue.push_back(Some(root));
        }
        while let Some(slot) = queue.pop_front() {
            match slot.and_then(|idx| self.arena.get(idx)) {
                Some(node) => {
                    out.push(node.raw_value.clone());
                    queue.push_back(node.left);
                    queue.push_back(node.right);
                }
                None => out.push(null_marker.to_string()),
            }
        }
        while out.last().is_some_and(|v| v == null_marker) {
            out.pop();
        }
        out
    }

    /// Distinct raw values of all value nodes, first occurrence first.
    pub fn distinct_values(&self) -> Vec<String> {
        let mut seen = HashSet::new();
        self.nodes
            .iter()
            .filter_map(|&idx| self.arena.get(idx))
            .filter(|n| !n.is_null_marker)
            .filter(|n| seen.insert(n.raw_value.clone()))
            .map(|n| n.raw_value.clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_mode_names_when_parsing_then_round_trips_display() {
        for mode in [BuildMode::Bst, BuildMode::Bt, BuildMode::Graph] {
            assert_eq!(mode.to_string().parse::<BuildMode>().unwrap(), mode);
        }
        assert_eq!("GRAPH".parse::<BuildMode>().unwrap(), BuildMode::Graph);
        assert!("heap".parse::<BuildMode>().is_err());
    }

    #[test]
    fn given_graph_mode_when_asking_hint_then_depends_on_weighting() {
        assert!(BuildMode::Graph.input_hint(true).contains("weight"));
        assert!(BuildMode::Graph.input_hint(false).contains("unweighted"));
        assert!(BuildMode::Bt.input_hint(false).contains("level order"));
    }

    #[test]
    fn given_default_options_when_created_then_uses_null_marker_and_bst() {
        let options = BuildOptions::default();
        assert_eq!(options.mode, BuildMode::Bst);
        assert_eq!(options.null_marker, "null");
        assert!(!options.weighted);
        assert!(!options.directed);
        assert!(!options.strict_edges);
    }

    #[test]
    fn given_unconsumed_warning_when_displaying_then_lists_indices() {
        let warning = BuildWarning::UnconsumedTokens {
            entries: vec![(5, "3".to_string())],
        };
        assert_eq!(
            warning.to_string(),
            "ignored tokens below terminated branches: 3 (index 5)"
        );
    }
}
