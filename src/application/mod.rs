//! Application layer: build orchestration and renderer hand-off
//!
//! This layer drives the domain builders and shapes their output for consumers.

pub mod dispatcher;
pub mod display;
pub mod error;
pub mod export;

pub use dispatcher::{build, Session, SessionState};
pub use display::TreeDisplay;
pub use error::{ApplicationError, ApplicationResult};
pub use export::{RenderEdge, RenderModel, RenderNode};
