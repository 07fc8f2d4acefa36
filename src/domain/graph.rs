//! Graph construction from edge tokens and connected-component discovery.

use std::collections::{HashMap, HashSet};

use tracing::{debug, info, instrument, warn};

use crate::domain::arena::{Node, NodeArena, NodeId};
use crate::domain::error::DomainResult;
use crate::domain::model::{BuildResult, BuildWarning, Component, Edge};
use crate::domain::token::Token;

/// Weight given to edges without one, and to every edge of an unweighted graph.
pub const DEFAULT_WEIGHT: &str = "1";

/// Meaning of a single graph-mode token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GraphToken {
    /// `source,target[,weight]`; fields past the third are ignored
    Edge {
        source: String,
        target: String,
        weight: Option<String>,
    },
    Standalone(String),
    /// Comma token missing an endpoint; `survivor` is the endpoint that is present
    Malformed { survivor: Option<String> },
}

impl GraphToken {
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        if !raw.contains(',') {
            return GraphToken::Standalone(raw.to_string());
        }

        let mut parts = raw.split(',').map(str::trim);
        let source = parts.next().unwrap_or_default();
        let target = parts.next().unwrap_or_default();
        let weight = parts.next().filter(|w| !w.is_empty()).map(str::to_string);

        match (source.is_empty(), target.is_empty()) {
            (false, false) => GraphToken::Edge {
                source: source.to_string(),
                target: target.to_string(),
                weight,
            },
            (false, true) => GraphToken::Malformed {
                survivor: Some(source.to_string()),
            },
            (true, false) => GraphToken::Malformed {
                survivor: Some(target.to_string()),
            },
            (true, true) => GraphToken::Malformed { survivor: None },
        }
    }
}

/// Builds a graph whose nodes are deduplicated by value.
///
/// `children` of a node lists its out-neighbours (both directions when
/// undirected). Components are weakly connected: edge direction is ignored
/// for reachability.
#[derive(Debug)]
pub struct GraphBuilder {
    weighted: bool,
    directed: bool,
    registry: HashMap<String, NodeId>,
    neighbours: HashMap<NodeId, Vec<NodeId>>,
}

impl GraphBuilder {
    pub fn new(weighted: bool, directed: bool) -> Self {
        Self {
            weighted,
            directed,
            registry: HashMap::new(),
            neighbours: HashMap::new(),
        }
    }

    #[instrument(level = "debug", skip(self, tokens), fields(tokens = tokens.len()))]
    pub fn build(&mut self, tokens: &[Token]) -> DomainResult<BuildResult> {
        // Reset state for a fresh pass
        self.registry.clear();
        self.neighbours.clear();

        let mut arena = NodeArena::new();
        let mut nodes = Vec::new();
        let mut edges = Vec::new();
        let mut warnings = Vec::new();

        for (index, token) in tokens.iter().enumerate() {
            match GraphToken::parse(&token.raw) {
                GraphToken::Edge {
                    source,
                    target,
                    weight,
                } => {
                    let weight = match weight {
                        Some(w) if self.weighted => w,
                        _ => DEFAULT_WEIGHT.to_string(),
                    };
                    let edge = self.add_edge(&mut arena, &mut nodes, source, target, weight)?;
                    edges.push(edge);
                }
                GraphToken::Standalone(key) => {
                    if !key.is_empty() {
                        self.node_for(&mut arena, &mut nodes, &key);
                    }
                }
                GraphToken::Malformed { survivor } => {
                    warn!(index, token = %token.raw, "edge with missing endpoint");
                    warnings.push(BuildWarning::CoercedEdge {
                        index,
                        token: token.raw.clone(),
                    });
                    if let Some(key) = survivor {
                        self.node_for(&mut arena, &mut nodes, &key);
                    }
                }
            }
        }

        let components = self.components(&nodes);
        info!(
            nodes = nodes.len(),
            edges = edges.len(),
            components = components.len(),
            "graph built"
        );

        let mut result = BuildResult::graph(arena, nodes, components, edges);
        result.warnings = warnings;
        Ok(result)
    }

    /// Existing node for `key`, or a new one registered in encounter order.
    fn node_for(&mut self, arena: &mut NodeArena, nodes: &mut Vec<NodeId>, key: &str) -> NodeId {
        if let Some(&idx) = self.registry.get(key) {
            return idx;
        }
        debug!(key, "new graph node");
        let idx = arena.insert(Node::new(key));
        self.registry.insert(key.to_string(), idx);
        nodes.push(idx);
        idx
    }

    fn add_edge(
        &mut self,
        arena: &mut NodeArena,
        nodes: &mut Vec<NodeId>,
        source: String,
        target: String,
        weight: String,
    ) -> DomainResult<Edge> {
        let source_id = self.node_for(arena, nodes, &source);
        let target_id = self.node_for(arena, nodes, &target);

        let forward = &mut arena.node_mut(source_id)?.children;
        if !forward.contains(&target_id) {
            forward.push(target_id);
        }
        if !self.directed {
            let backward = &mut arena.node_mut(target_id)?.children;
            if !backward.contains(&source_id) {
                backward.push(source_id);
            }
        }

        link(&mut self.neighbours, source_id, target_id);
        link(&mut self.neighbours, target_id, source_id);

        debug!(%source, %target, %weight, directed = self.directed, "edge");
        Ok(Edge {
            source,
            target,
            source_id,
            target_id,
            weight,
            directed: self.directed,
        })
    }

    /// Depth-first discovery with an explicit stack, started from each
    /// unvisited node in encounter order.
    fn components(&self, nodes: &[NodeId]) -> Vec<Component> {
        let mut visited = HashSet::new();
        let mut components = Vec::new();

        for &start in nodes {
            if visited.contains(&start) {
                continue;
            }
            let mut component = Component::default();
            let mut stack = vec![start];
            while let Some(idx) = stack.pop() {
                if !visited.insert(idx) {
                    continue;
                }
                component.nodes.push(idx);
                if let Some(adjacent) = self.neighbours.get(&idx) {
                    // reversed so the first neighbour is explored first
                    for &next in adjacent.iter().rev() {
                        if !visited.contains(&next) {
                            stack.push(next);
                        }
                    }
                }
            }
            components.push(component);
        }

        components
    }
}

fn link(neighbours: &mut HashMap<NodeId, Vec<NodeId>>, from: NodeId, to: NodeId) {
    let adjacent = neighbours.entry(from).or_default();
    if !adjacent.contains(&to) {
        adjacent.push(to);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn tokens(input: &str) -> Vec<Token> {
        input.split_whitespace().map(Token::value).collect()
    }

    fn component_values(result: &BuildResult) -> Vec<Vec<String>> {
        result
            .components
            .iter()
            .map(|c| {
                let mut values: Vec<String> =
                    c.nodes.iter().map(|&i| result.value(i).to_string()).collect();
                values.sort();
                values
            })
            .collect()
    }

    #[rstest]
    #[case("A,B", GraphToken::Edge { source: "A".into(), target: "B".into(), weight: None })]
    #[case("A,B,5", GraphToken::Edge { source: "A".into(), target: "B".into(), weight: Some("5".into()) })]
    #[case("A,B,,", GraphToken::Edge { source: "A".into(), target: "B".into(), weight: None })]
    #[case("F", GraphToken::Standalone("F".into()))]
    #[case("A,", GraphToken::Malformed { survivor: Some("A".into()) })]
    #[case(",B", GraphToken::Malformed { survivor: Some("B".into()) })]
    #[case(",", GraphToken::Malformed { survivor: None })]
    fn given_raw_token_when_parsing_then_classifies(#[case] raw: &str, #[case] expected: GraphToken) {
        assert_eq!(GraphToken::parse(raw), expected);
    }

    #[test]
    fn given_connected_edges_when_building_then_one_component() {
        let result = GraphBuilder::new(false, false)
            .build(&tokens("A,B A,C B,D"))
            .unwrap();

        assert_eq!(component_values(&result), vec![vec!["A", "B", "C", "D"]]);
        assert_eq!(result.edges.len(), 3);
        assert!(result.edges.iter().all(|e| e.weight == "1" && !e.directed));
        assert_eq!(result.nodes.len(), 4);
    }

    #[test]
    fn given_repeated_keys_when_building_then_reuses_nodes() {
        let result = GraphBuilder::new(false, false)
            .build(&tokens("A,B B,A A"))
            .unwrap();

        assert_eq!(result.nodes.len(), 2);
        assert_eq!(result.edges.len(), 2);
        let a = result.nodes[0];
        // parallel links collapse into one child entry
        assert_eq!(result.arena.get(a).unwrap().children.len(), 1);
    }

    #[test]
    fn given_weighted_flag_when_building_then_uses_third_field() {
        let weighted = GraphBuilder::new(true, false)
            .build(&tokens("A,B,5 B,C"))
            .unwrap();
        let weights: Vec<_> = weighted.edges.iter().map(|e| e.weight.as_str()).collect();
        assert_eq!(weights, vec!["5", "1"]);

        let unweighted = GraphBuilder::new(false, false)
            .build(&tokens("A,B,5"))
            .unwrap();
        assert_eq!(unweighted.edges[0].weight, "1");
    }

    #[test]
    fn given_directed_edges_when_building_then_children_follow_direction() {
        let result = GraphBuilder::new(false, true)
            .build(&tokens("A,B C,B"))
            .unwrap();

        let a = result.nodes[0];
        let b = result.nodes[1];
        assert_eq!(result.arena.get(a).unwrap().children, vec![b]);
        assert!(result.arena.get(b).unwrap().children.is_empty());
        // weakly connected
        assert_eq!(component_values(&result), vec![vec!["A", "B", "C"]]);
        assert!(result.edges.iter().all(|e| e.directed));
    }

    #[test]
    fn given_standalone_nodes_when_building_then_separate_components() {
        let result = GraphBuilder::new(false, false)
            .build(&tokens("A,B F G,H"))
            .unwrap();

        assert_eq!(
            component_values(&result),
            vec![vec!["A", "B"], vec!["F"], vec!["G", "H"]]
        );
    }

    #[test]
    fn given_half_edge_when_building_then_coerces_with_warning() {
        let result = GraphBuilder::new(false, false)
            .build(&tokens("A,B C, ,"))
            .unwrap();

        assert_eq!(result.nodes.len(), 3);
        assert_eq!(result.warnings.len(), 2);
        assert!(matches!(
            result.warnings[0],
            BuildWarning::CoercedEdge { index: 1, .. }
        ));
    }

    #[test]
    fn given_self_loop_when_building_then_single_child_entry() {
        let result = GraphBuilder::new(false, false).build(&tokens("A,A")).unwrap();
        let a = result.nodes[0];
        assert_eq!(result.arena.get(a).unwrap().children, vec![a]);
        assert_eq!(result.components.len(), 1);
    }

    #[test]
    fn given_long_chain_when_discovering_components_then_no_recursion_limit() {
        let input: Vec<Token> = (0..50_000)
            .map(|i| Token::value(format!("n{i},n{}", i + 1)))
            .collect();
        let result = GraphBuilder::new(false, false).build(&input).unwrap();
        assert_eq!(result.components.len(), 1);
        assert_eq!(result.components[0].len(), 50_001);
    }
}
