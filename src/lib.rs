//! treeviz: build binary search trees, level-order binary trees and graphs
//! from whitespace-separated token input.
//!
//! Layers:
//! - `domain`: token classification, validation and the three builders
//! - `application`: build dispatch, session state, render model export
//! - `cli`: argument parsing, command execution, terminal output

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod util;
