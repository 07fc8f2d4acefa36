//! Token classification of the raw input field.

use regex::Regex;
use tracing::{debug, instrument};

use crate::domain::model::{BuildMode, DEFAULT_NULL_MARKER};

/// A retained input token. Its position in the classified sequence is its
/// level-order index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub raw: String,
    pub is_null: bool,
}

impl Token {
    pub fn value(raw: impl Into<String>) -> Self {
        Self {
            raw: raw.into(),
            is_null: false,
        }
    }

    pub fn null(raw: impl Into<String>) -> Self {
        Self {
            raw: raw.into(),
            is_null: true,
        }
    }
}

/// Splits input on whitespace and keeps the tokens a mode can use.
pub struct TokenClassifier {
    number_pattern: Regex,
    null_marker: String,
}

impl Default for TokenClassifier {
    fn default() -> Self {
        Self::new(DEFAULT_NULL_MARKER)
    }
}

impl TokenClassifier {
    pub fn new(null_marker: &str) -> Self {
        let null_marker = if null_marker.trim().is_empty() {
            DEFAULT_NULL_MARKER
        } else {
            null_marker.trim()
        };
        Self {
            number_pattern: Regex::new(r"^[+-]?(?:\d+(?:\.\d*)?|\.\d+)(?:[eE][+-]?\d+)?$")
                .expect("number pattern is valid"),
            null_marker: null_marker.to_lowercase(),
        }
    }

    pub fn null_marker(&self) -> &str {
        &self.null_marker
    }

    pub fn is_null_marker(&self, raw: &str) -> bool {
        raw.to_lowercase() == self.null_marker
    }

    pub fn is_number(&self, raw: &str) -> bool {
        self.number_pattern.is_match(raw)
    }

    /// Tree modes keep null markers and decimal numbers, graph mode keeps
    /// every non-empty token verbatim. Other tokens are dropped silently.
    #[instrument(level = "debug", skip(self, input))]
    pub fn classify(&self, input: &str, mode: BuildMode) -> Vec<Token> {
        let mut tokens = Vec::new();
        let mut dropped = Vec::new();

        for raw in input.split_whitespace() {
            if !mode.is_tree() {
                tokens.push(Token::value(raw));
            } else if self.is_null_marker(raw) {
                tokens.push(Token::null(raw));
            } else if self.is_number(raw) {
                tokens.push(Token::value(raw));
            } else {
                dropped.push(raw);
            }
        }

        if !dropped.is_empty() {
            debug!(?dropped, "dropped tokens not usable in {} mode", mode);
        }
        debug!("classified {} tokens", tokens.len());
        tokens
    }
}

/// `true` when any token is a null marker.
pub fn has_null_markers(tokens: &[Token]) -> bool {
    tokens.iter().any(|t| t.is_null)
}
