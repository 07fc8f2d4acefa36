//! Serialisable render model handed to an external renderer.
//!
//! Arena handles are replaced by positional ids (`0..n`), so two builds of
//! the same input produce equal models.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::application::{ApplicationError, ApplicationResult};
use crate::domain::{BuildMode, BuildResult, NodeId, Side};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderNode {
    pub id: usize,
    pub value: String,
    /// Parsed value; `None` for text and for values out of `f64` range
    pub numeric: Option<f64>,
    pub null_marker: bool,
    /// Hidden slot filler, not to be drawn
    pub placeholder: bool,
    pub side: Side,
    pub left: Option<usize>,
    pub right: Option<usize>,
    pub parent: Option<usize>,
    pub children: Vec<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenderEdge {
    pub source: String,
    pub target: String,
    pub weight: String,
    pub directed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderModel {
    pub mode: BuildMode,
    pub root: Option<usize>,
    pub nodes: Vec<RenderNode>,
    pub components: Vec<Vec<usize>>,
    pub edges: Vec<RenderEdge>,
    pub warnings: Vec<String>,
}

impl RenderModel {
    /// Tree modes list nodes in pre-order over `children` (placeholders
    /// included); graph mode keeps first-encounter order.
    pub fn from_result(result: &BuildResult) -> Self {
        let order = if result.mode.is_tree() {
            tree_order(result)
        } else {
            result.nodes.clone()
        };
        let ids: HashMap<NodeId, usize> = order
            .iter()
            .enumerate()
            .map(|(pos, &idx)| (idx, pos))
            .collect();
        let id_of = |idx: Option<NodeId>| idx.and_then(|i| ids.get(&i).copied());

        let nodes = order
            .iter()
            .enumerate()
            .filter_map(|(id, &idx)| {
                let node = result.arena.get(idx)?;
                Some(RenderNode {
                    id,
                    value: node.raw_value.clone(),
                    numeric: Some(node.numeric_value).filter(|v| v.is_finite()),
                    null_marker: node.is_null_marker,
                    placeholder: node.is_placeholder(),
                    side: node.side,
                    left: id_of(node.left),
                    right: id_of(node.right),
                    parent: id_of(node.parent),
                    children: node.children.iter().filter_map(|&c| id_of(Some(c))).collect(),
                })
            })
            .collect();

        Self {
            mode: result.mode,
            root: id_of(result.root),
            nodes,
            components: result
                .components
                .iter()
                .map(|c| c.nodes.iter().filter_map(|&i| id_of(Some(i))).collect())
                .collect(),
            edges: result
                .edges
                .iter()
                .map(|e| RenderEdge {
                    source: e.source.clone(),
                    target: e.target.clone(),
                    weight: e.weight.clone(),
                    directed: e.directed,
                })
                .collect(),
            warnings: result.warnings.iter().map(|w| w.to_string()).collect(),
        }
    }

    pub fn to_json(&self) -> ApplicationResult<String> {
        serde_json::to_string_pretty(self).map_err(|e| ApplicationError::Render {
            message: format!("serialize render model: {e}"),
        })
    }

    /// Nodes a renderer should draw.
    pub fn visible_nodes(&self) -> impl Iterator<Item = &RenderNode> {
        self.nodes.iter().filter(|n| !n.placeholder)
    }
}

fn tree_order(result: &BuildResult) -> Vec<NodeId> {
    let mut order = Vec::new();
    let mut stack: Vec<NodeId> = result.root.into_iter().collect();
    while let Some(idx) = stack.pop() {
        order.push(idx);
        if let Some(node) = result.arena.get(idx) {
            stack.extend(node.children.iter().rev());
        }
    }
    order
}
