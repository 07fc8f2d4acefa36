//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum, ValueHint};

use crate::config::OutputFormat;
use crate::domain::{BuildMode, BuildOptions};

/// Build binary search trees, level-order binary trees and graphs from flat token input
#[derive(Parser, Debug)]
#[command(name = "treeviz")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Log verbosity (-d info, -dd debug, -ddd trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub debug: u8,

    /// Directory with a local .treeviz.toml (default: cwd)
    #[arg(short = 'C', long, global = true, value_hint = ValueHint::DirPath)]
    pub config_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build a tree or graph and print it
    Build {
        #[command(flatten)]
        build: BuildArgs,

        /// Output format
        #[arg(short, long, value_enum)]
        format: Option<FormatArg>,
    },

    /// Trace a lookup through a BST built from the tokens
    Search {
        /// Value to look up
        #[arg(short, long, allow_hyphen_values = true)]
        value: String,

        /// Tokens (read from stdin when omitted)
        #[arg(allow_hyphen_values = true)]
        tokens: Vec<String>,
    },

    /// Show the input format of a mode
    Hint {
        /// Mode (default: configured mode)
        #[arg(short, long, value_enum)]
        mode: Option<ModeArg>,

        /// Graph weighting
        #[arg(short, long, value_enum)]
        weight: Option<WeightArg>,
    },

    /// Manage settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

/// Selectors shared by build-like commands; unset values come from settings.
#[derive(Args, Debug, Default)]
pub struct BuildArgs {
    /// Construction mode
    #[arg(short, long, value_enum)]
    pub mode: Option<ModeArg>,

    /// Graph weighting
    #[arg(short, long, value_enum)]
    pub weight: Option<WeightArg>,

    /// Graph edge direction
    #[arg(short = 'D', long, value_enum)]
    pub direction: Option<DirectionArg>,

    /// Token standing for an empty slot
    #[arg(short, long)]
    pub null_marker: Option<String>,

    /// Fail on edge tokens with a missing endpoint
    #[arg(long)]
    pub strict_edges: bool,

    /// Tokens (read from stdin when omitted)
    #[arg(allow_hyphen_values = true)]
    pub tokens: Vec<String>,
}

impl BuildArgs {
    /// Override `options` with every selector given on the command line.
    pub fn apply(&self, options: &mut BuildOptions) {
        if let Some(mode) = self.mode {
            options.mode = mode.into();
        }
        if let Some(weight) = self.weight {
            options.weighted = weight == WeightArg::Weighted;
        }
        if let Some(direction) = self.direction {
            options.directed = direction == DirectionArg::Directed;
        }
        if let Some(marker) = &self.null_marker {
            options.null_marker = marker.clone();
        }
        if self.strict_edges {
            options.strict_edges = true;
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeArg {
    /// Binary search tree (insertion order)
    Bst,
    /// Binary tree (level order)
    Bt,
    /// Graph (edges source,target[,weight])
    Graph,
}

impl From<ModeArg> for BuildMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Bst => BuildMode::Bst,
            ModeArg::Bt => BuildMode::Bt,
            ModeArg::Graph => BuildMode::Graph,
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeightArg {
    Weighted,
    Unweighted,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectionArg {
    Directed,
    Undirected,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatArg {
    Tree,
    Json,
}

impl From<FormatArg> for OutputFormat {
    fn from(format: FormatArg) -> Self {
        match format {
            FormatArg::Tree => OutputFormat::Tree,
            FormatArg::Json => OutputFormat::Json,
        }
    }
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show effective settings
    Show,
    /// Print a config template
    Template,
    /// Show the global config path
    Path,
}
