//! Binary tree construction from a breadth-first (level-order) layout.

use std::collections::VecDeque;

use tracing::{debug, instrument, warn};

use crate::domain::arena::{Node, NodeArena, NodeId, Side};
use crate::domain::completion::complete_tree;
use crate::domain::error::DomainResult;
use crate::domain::model::{BuildMode, BuildResult, BuildWarning};
use crate::domain::token::Token;

/// Which token owns which slot when tokens are consumed breadth-first.
///
/// Validation and construction both read this, so a layout that passes
/// validation is exactly the layout that gets built.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SlotLayout {
    /// `(parent index, side)` of every consumed slot; `None` for the root
    /// and for tokens past `consumed`
    pub owners: Vec<Option<(usize, Side)>>,
    /// Tokens `0..consumed` were assigned a slot
    pub consumed: usize,
    /// Null positions in consumption order (root included when null)
    pub dead: Vec<usize>,
}

impl SlotLayout {
    /// Each value token dequeued takes the next two tokens as its left and
    /// right slot. Null tokens take a slot but never get slots of their own.
    pub fn of(tokens: &[Token]) -> Self {
        let mut layout = SlotLayout {
            owners: vec![None; tokens.len()],
            consumed: tokens.len().min(1),
            dead: Vec::new(),
        };
        let mut queue = VecDeque::new();
        match tokens.first() {
            Some(root) if !root.is_null => queue.push_back(0),
            Some(_) => layout.dead.push(0),
            None => return layout,
        }

        while layout.consumed < tokens.len() {
            let Some(parent) = queue.pop_front() else {
                break;
            };
            for side in [Side::Left, Side::Right] {
                let index = layout.consumed;
                let Some(token) = tokens.get(index) else {
                    break;
                };
                layout.owners[index] = Some((parent, side));
                if token.is_null {
                    layout.dead.push(index);
                } else {
                    queue.push_back(index);
                }
                layout.consumed += 1;
            }
        }
        layout
    }

    /// Null position whose slot `index` would be if nulls had children.
    ///
    /// Continues the breadth-first walk over the null positions, whose own
    /// slots are all null up to `index`.
    pub fn orphan_parent(&self, index: usize) -> usize {
        let mut dead: VecDeque<usize> = self.dead.iter().copied().collect();
        let mut next = self.consumed;
        while let Some(parent) = dead.pop_front() {
            for slot in [next, next + 1] {
                if slot == index {
                    return parent;
                }
                dead.push_back(slot);
            }
            next += 2;
            if next > index {
                break;
            }
        }
        index.saturating_sub(1) / 2
    }
}

/// Assigns tokens to child slots breadth-first.
///
/// Each dequeued node takes the next two unconsumed tokens as its left and
/// right child; null tokens consume a slot without creating a node. Tokens
/// left once the queue runs dry are reported as a warning and dropped
/// (validated input never has any).
#[derive(Debug, Default)]
pub struct LevelOrderBuilder;

impl LevelOrderBuilder {
    pub fn new() -> Self {
        Self
    }

    #[instrument(level = "debug", skip(self, tokens), fields(tokens = tokens.len()))]
    pub fn build(&self, tokens: &[Token]) -> DomainResult<BuildResult> {
        let mut arena = NodeArena::new();
        let mut nodes = Vec::new();

        let root = match tokens.first() {
            Some(first) if !first.is_null => arena.insert(Node::new(first.raw.as_str())),
            _ => {
                debug!("no root value, empty tree");
                return Ok(BuildResult::tree(BuildMode::Bt, arena, None, nodes));
            }
        };
        nodes.push(root);

        let layout = SlotLayout::of(tokens);
        let mut placed: Vec<Option<NodeId>> = vec![None; tokens.len()];
        placed[0] = Some(root);

        for index in 1..layout.consumed {
            let token = &tokens[index];
            let Some((parent, side)) = layout.owners[index] else {
                continue;
            };
            if token.is_null {
                continue;
            }
            let Some(parent_idx) = placed[parent] else {
                continue;
            };
            let child = arena.insert(Node::new(token.raw.as_str()));
            arena.attach(parent_idx, child, side)?;
            placed[index] = Some(child);
            nodes.push(child);
        }

        let mut result = BuildResult::tree(BuildMode::Bt, arena, Some(root), nodes);

        let entries: Vec<(usize, String)> = tokens
            .iter()
            .enumerate()
            .skip(layout.consumed)
            .filter(|(_, t)| !t.is_null)
            .map(|(index, t)| (index, t.raw.clone()))
            .collect();
        if !entries.is_empty() {
            warn!(?entries, "tokens below terminated branches ignored");
            result.warnings.push(BuildWarning::UnconsumedTokens { entries });
        }

        complete_tree(&mut result.arena, result.root)?;
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(input: &str) -> Vec<Token> {
        input
            .split_whitespace()
            .map(|raw| {
                if raw == "null" {
                    Token::null(raw)
                } else {
                    Token::value(raw)
                }
            })
            .collect()
    }

    fn child(result: &BuildResult, idx: NodeId, side: Side) -> Option<String> {
        let node = result.arena.get(idx)?;
        let slot = match side {
            Side::Left => node.left,
            _ => node.right,
        };
        slot.map(|c| result.value(c).to_string())
    }

    #[test]
    fn given_level_order_with_nulls_when_building_then_skips_null_slots() {
        let result = LevelOrderBuilder::new()
            .build(&tokens("1 2 3 null 4 5 null"))
            .unwrap();

        let root = result.root.unwrap();
        let two = result.arena.get(root).unwrap().left.unwrap();
        let three = result.arena.get(root).unwrap().right.unwrap();
        assert_eq!(result.value(two), "2");
        assert_eq!(child(&result, two, Side::Left), None);
        assert_eq!(child(&result, two, Side::Right), Some("4".to_string()));
        assert_eq!(child(&result, three, Side::Left), Some("5".to_string()));
        assert_eq!(child(&result, three, Side::Right), None);
        assert!(result.warnings.is_empty());
        assert_eq!(result.nodes.len(), 5);
    }

    #[test]
    fn given_built_tree_when_reading_children_then_placeholders_fill_gaps() {
        let result = LevelOrderBuilder::new().build(&tokens("1 2 3 null 4")).unwrap();

        let two = result.arena.get(result.root.unwrap()).unwrap().left.unwrap();
        let children = &result.arena.get(two).unwrap().children;
        assert_eq!(children.len(), 2);
        assert!(result.arena.get(children[0]).unwrap().is_placeholder());
        assert_eq!(result.value(children[1]), "4");
    }

    #[test]
    fn given_children_of_null_slots_when_building_then_warns_and_excludes() {
        let result = LevelOrderBuilder::new()
            .build(&tokens("1 null 2 null null 3"))
            .unwrap();

        assert_eq!(result.preorder_values(), vec!["1", "2"]);
        assert_eq!(
            result.warnings,
            vec![BuildWarning::UnconsumedTokens {
                entries: vec![(5, "3".to_string())]
            }]
        );
    }

    #[test]
    fn given_children_after_null_sibling_when_building_then_attach_to_next_value() {
        let result = LevelOrderBuilder::new()
            .build(&tokens("1 null 2 3 4"))
            .unwrap();

        let two = result.arena.get(result.root.unwrap()).unwrap().right.unwrap();
        assert_eq!(child(&result, two, Side::Left), Some("3".to_string()));
        assert_eq!(child(&result, two, Side::Right), Some("4".to_string()));
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn given_sparse_tokens_when_laying_out_then_nulls_own_no_slots() {
        let layout = SlotLayout::of(&tokens("1 null 2 null null 3"));

        assert_eq!(layout.consumed, 5);
        assert_eq!(layout.owners[2], Some((0, Side::Right)));
        assert_eq!(layout.owners[4], Some((2, Side::Right)));
        assert_eq!(layout.owners[5], None);
        assert_eq!(layout.dead, vec![1, 3, 4]);
        assert_eq!(layout.orphan_parent(5), 1);
    }

    #[test]
    fn given_trailing_nulls_when_building_then_no_warning() {
        let result = LevelOrderBuilder::new()
            .build(&tokens("1 null null null null"))
            .unwrap();
        assert!(result.warnings.is_empty());
        assert_eq!(result.level_order_values("null"), vec!["1"]);
    }

    #[test]
    fn given_null_root_when_building_then_tree_is_empty() {
        let result = LevelOrderBuilder::new().build(&tokens("null")).unwrap();
        assert!(result.root.is_none());
        assert!(result.nodes.is_empty());
    }
}
