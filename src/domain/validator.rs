//! Structural legality checks, run before any node is allocated.

use itertools::Itertools;
use tracing::{debug, instrument, warn};

use crate::domain::error::{DomainError, DomainResult};
use crate::domain::graph::GraphToken;
use crate::domain::level_order::SlotLayout;
use crate::domain::model::{BuildMode, BuildOptions};
use crate::domain::token::{has_null_markers, Token};

/// Run every check that applies to `options.mode`.
///
/// BST input containing null markers is laid out in level order, so it
/// must also pass the level-order position check.
#[instrument(level = "debug", skip(tokens), fields(tokens = tokens.len()))]
pub fn validate(tokens: &[Token], options: &BuildOptions) -> DomainResult<()> {
    ensure_not_empty(tokens, options.mode)?;
    match options.mode {
        BuildMode::Bst => {
            ensure_unique_keys(tokens)?;
            if has_null_markers(tokens) {
                ensure_reachable_positions(tokens)?;
            }
        }
        BuildMode::Bt => ensure_reachable_positions(tokens)?,
        BuildMode::Graph => {
            if options.strict_edges {
                ensure_well_formed_edges(tokens)?;
            }
        }
    }
    debug!("input valid for {} mode", options.mode);
    Ok(())
}

/// Tree modes need at least one non-null value, graph mode one token.
pub fn ensure_not_empty(tokens: &[Token], mode: BuildMode) -> DomainResult<()> {
    let usable = if mode.is_tree() {
        tokens.iter().any(|t| !t.is_null)
    } else {
        !tokens.is_empty()
    };
    if usable {
        Ok(())
    } else {
        Err(DomainError::EmptyInput)
    }
}

/// Non-null values must be pairwise distinct (compared as written).
pub fn ensure_unique_keys(tokens: &[Token]) -> DomainResult<()> {
    let values: Vec<String> = tokens
        .iter()
        .filter(|t| !t.is_null)
        .map(|t| t.raw.clone())
        .duplicates()
        .collect();
    if values.is_empty() {
        Ok(())
    } else {
        warn!(?values, "duplicate BST keys");
        Err(DomainError::DuplicateKey { values })
    }
}

/// Every value must land in a slot of a value node when tokens are
/// consumed breadth-first, the same way the level-order builder reads them.
pub fn ensure_reachable_positions(tokens: &[Token]) -> DomainResult<()> {
    let layout = SlotLayout::of(tokens);
    let orphan = tokens
        .iter()
        .enumerate()
        .find(|(index, token)| !token.is_null && layout.owners[*index].is_none() && *index > 0);
    if let Some((index, token)) = orphan {
        let parent_index = layout.orphan_parent(index);
        warn!(index, parent_index, value = %token.raw, "unreachable level-order position");
        return Err(DomainError::InvalidLevelOrder {
            value: token.raw.clone(),
            index,
            parent_index,
        });
    }
    Ok(())
}

/// Every comma token must name both a source and a target.
pub fn ensure_well_formed_edges(tokens: &[Token]) -> DomainResult<()> {
    for (index, token) in tokens.iter().enumerate() {
        if let GraphToken::Malformed { .. } = GraphToken::parse(&token.raw) {
            return Err(DomainError::MalformedEdge {
                token: token.raw.clone(),
                index,
            });
        }
    }
    Ok(())
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

    #[test]
    fn given_repeated_values_when_checking_keys_then_lists_each_once() {
        let err = ensure_unique_keys(&tokens("10 5 5 7 5 7")).unwrap_err();
        assert_eq!(
            err,
            DomainError::DuplicateKey {
                values: vec!["5".into(), "7".into()]
            }
        );
    }

    #[test]
    fn given_repeated_nulls_when_checking_keys_then_passes() {
        assert!(ensure_unique_keys(&tokens("1 null null 2")).is_ok());
    }

    #[test]
    fn given_value_below_null_when_checking_positions_then_names_parent() {
        // 1 takes slots 1 and 2, both null, so nothing owns index 3
        let err = ensure_reachable_positions(&tokens("1 null null 3")).unwrap_err();
        assert_eq!(
            err,
            DomainError::InvalidLevelOrder {
                value: "3".into(),
                index: 3,
                parent_index: 1
            }
        );
    }

    #[test]
    fn given_children_after_null_sibling_when_checking_positions_then_passes() {
        // 2 owns indices 3 and 4 when slots are consumed breadth-first
        assert!(ensure_reachable_positions(&tokens("1 null 2 3 4")).is_ok());
    }

    #[test]
    fn given_heap_spelled_children_of_null_when_checking_positions_then_fails() {
        let err = ensure_reachable_positions(&tokens("1 null 2 null null 3 4")).unwrap_err();
        assert_eq!(
            err,
            DomainError::InvalidLevelOrder {
                value: "3".into(),
                index: 5,
                parent_index: 1
            }
        );
    }

    #[test]
    fn given_null_root_when_checking_positions_then_first_child_fails() {
        let err = ensure_reachable_positions(&tokens("null 1")).unwrap_err();
        assert!(matches!(
            err,
            DomainError::InvalidLevelOrder { index: 1, parent_index: 0, .. }
        ));
    }

    #[test]
    fn given_only_nulls_when_checking_emptiness_then_tree_modes_fail() {
        assert_eq!(
            ensure_not_empty(&tokens("null null"), BuildMode::Bt),
            Err(DomainError::EmptyInput)
        );
        assert!(ensure_not_empty(&tokens("null"), BuildMode::Graph).is_ok());
        assert!(ensure_not_empty(&[], BuildMode::Graph).is_err());
    }

    #[test]
    fn given_strict_graph_options_when_validating_then_rejects_half_edges() {
        let options = BuildOptions {
            mode: BuildMode::Graph,
            strict_edges: true,
            ..BuildOptions::default()
        };
        let err = validate(&tokens("A,B C,"), &options).unwrap_err();
        assert_eq!(
            err,
            DomainError::MalformedEdge {
                token: "C,".into(),
                index: 1
            }
        );
        let lenient = BuildOptions::with_mode(BuildMode::Graph);
        assert!(validate(&tokens("A,B C,"), &lenient).is_ok());
    }

    #[test]
    fn given_bst_with_nulls_when_validating_then_checks_positions_too() {
        let options = BuildOptions::with_mode(BuildMode::Bst);
        assert!(validate(&tokens("1 2 3 null 4"), &options).is_ok());
        assert!(validate(&tokens("1 null null 4"), &options).is_err());
    }
}
