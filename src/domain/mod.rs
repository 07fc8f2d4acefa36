//! Domain layer: node model and structure construction
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod arena;
pub mod bst;
pub mod completion;
pub mod error;
pub mod graph;
pub mod level_order;
pub mod model;
pub mod search;
pub mod token;
pub mod validator;

pub use arena::{Node, NodeArena, NodeId, Side, PLACEHOLDER_LABEL};
pub use bst::BstBuilder;
pub use error::{DomainError, DomainResult};
pub use graph::{GraphBuilder, GraphToken};
pub use level_order::{LevelOrderBuilder, SlotLayout};
pub use model::{
    BuildMode, BuildOptions, BuildResult, BuildWarning, Component, Edge, DEFAULT_NULL_MARKER,
};
pub use search::{search_trace, SearchTrace};
pub use token::{Token, TokenClassifier};
