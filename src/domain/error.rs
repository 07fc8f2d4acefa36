//! Domain-level errors (no external dependencies)

use thiserror::Error;

/// Validation and construction failures of a build pass.
///
/// Every variant carries enough detail for a caller to render a
/// diagnostic without looking at the input again.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("nothing to visualize: no usable tokens in input")]
    EmptyInput,

    #[error("BST cannot have duplicate values, duplicates found: {}", .values.join(", "))]
    DuplicateKey { values: Vec<String> },

    #[error(
        "invalid level order: value {value} at index {index} has no parent (index {parent_index} is empty)"
    )]
    InvalidLevelOrder {
        value: String,
        index: usize,
        parent_index: usize,
    },

    #[error("malformed edge '{token}' at position {index}: expected source,target[,weight]")]
    MalformedEdge { token: String, index: usize },

    #[error("build failed: {0}")]
    Internal(String),
}

impl DomainError {
    /// Empty input is reported but should render an empty state, not a failure.
    pub fn is_empty_state(&self) -> bool {
        matches!(self, DomainError::EmptyInput)
    }
}

/// Result type for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_duplicate_key_when_displaying_then_lists_values() {
        let err = DomainError::DuplicateKey {
            values: vec!["5".into(), "7".into()],
        };
        assert_eq!(
            err.to_string(),
            "BST cannot have duplicate values, duplicates found: 5, 7"
        );
    }

    #[test]
    fn given_invalid_level_order_when_displaying_then_names_indices() {
        let err = DomainError::InvalidLevelOrder {
            value: "4".into(),
            index: 3,
            parent_index: 1,
        };
        let msg = err.to_string();
        assert!(msg.contains("index 3"));
        assert!(msg.contains("index 1"));
        assert!(!err.is_empty_state());
        assert!(DomainError::EmptyInput.is_empty_state());
    }
}
