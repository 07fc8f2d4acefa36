//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/treeviz/treeviz.toml`
//! 3. Local config: `<dir>/.treeviz.toml`
//! 4. Environment variables: `TREEVIZ_*` prefix
//!
//! Command-line flags are applied on top by the CLI layer.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::application::ApplicationError;
use crate::domain::{BuildMode, BuildOptions, DEFAULT_NULL_MARKER};

/// How `build` prints its result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Indented text tree
    #[default]
    Tree,
    /// Render model as JSON
    Json,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Tree => write!(f, "tree"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "tree" => Ok(OutputFormat::Tree),
            "json" => Ok(OutputFormat::Json),
            other => Err(format!("unknown output format '{other}' (expected tree or json)")),
        }
    }
}

/// Raw settings for intermediate parsing (all fields optional to detect "not specified").
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub mode: Option<BuildMode>,
    pub weighted: Option<bool>,
    pub directed: Option<bool>,
    pub null_marker: Option<String>,
    pub strict_edges: Option<bool>,
    pub format: Option<OutputFormat>,
}

/// Unified configuration for treeviz.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Construction mode used when none is given (default: bst)
    pub mode: BuildMode,
    /// Read a weight from the third field of graph edges
    pub weighted: bool,
    /// Graph edges only point from source to target
    pub directed: bool,
    /// Token meaning "no node here" (default: null, case-insensitive)
    pub null_marker: String,
    /// Reject edge tokens with a missing endpoint
    pub strict_edges: bool,
    /// Output format of `build`
    pub format: OutputFormat,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            mode: BuildMode::Bst,
            weighted: false,
            directed: false,
            null_marker: DEFAULT_NULL_MARKER.to_string(),
            strict_edges: false,
            format: OutputFormat::Tree,
        }
    }
}

/// Get the XDG config directory for treeviz.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "treeviz").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("treeviz.toml"))
}

/// Get the path to the local config file in a directory.
pub fn local_config_path(dir: &Path) -> PathBuf {
    dir.join(".treeviz.toml")
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> Result<RawSettings, ApplicationError> {
    let content = std::fs::read_to_string(path).map_err(|e| ApplicationError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    toml::from_str(&content).map_err(|e| ApplicationError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

impl Settings {
    /// Overlay wins for every field it specifies.
    fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            mode: overlay.mode.unwrap_or(self.mode),
            weighted: overlay.weighted.unwrap_or(self.weighted),
            directed: overlay.directed.unwrap_or(self.directed),
            null_marker: overlay
                .null_marker
                .clone()
                .filter(|m| !m.trim().is_empty())
                .unwrap_or_else(|| self.null_marker.clone()),
            strict_edges: overlay.strict_edges.unwrap_or(self.strict_edges),
            format: overlay.format.unwrap_or(self.format),
        }
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `local_dir` - Optional directory holding a `.treeviz.toml`
    pub fn load(local_dir: Option<&Path>) -> Result<Self, ApplicationError> {
        let mut current = Self::default();

        if let Some(global_path) = global_config_path() {
            if global_path.exists() {
                debug!("loading global config {}", global_path.display());
                current = current.merge_with(&load_raw_settings(&global_path)?);
            }
        }

        if let Some(dir) = local_dir {
            let local_path = local_config_path(dir);
            if local_path.exists() {
                debug!("loading local config {}", local_path.display());
                current = current.merge_with(&load_raw_settings(&local_path)?);
            }
        }

        Self::apply_env_overrides(current)
    }

    /// Apply TREEVIZ_* environment variables as explicit overrides.
    fn apply_env_overrides(settings: Self) -> Result<Self, ApplicationError> {
        let config = Config::builder()
            .add_source(Environment::with_prefix("TREEVIZ").separator("__"))
            .build()
            .map_err(config_err)?;

        let mut raw = RawSettings::default();
        if let Ok(val) = config.get_string("mode") {
            raw.mode = Some(val.parse().map_err(|message| ApplicationError::Config { message })?);
        }
        if let Ok(val) = config.get_bool("weighted") {
            raw.weighted = Some(val);
        }
        if let Ok(val) = config.get_bool("directed") {
            raw.directed = Some(val);
        }
        if let Ok(val) = config.get_string("null_marker") {
            raw.null_marker = Some(val);
        }
        if let Ok(val) = config.get_bool("strict_edges") {
            raw.strict_edges = Some(val);
        }
        if let Ok(val) = config.get_string("format") {
            raw.format = Some(val.parse().map_err(|message| ApplicationError::Config { message })?);
        }

        Ok(settings.merge_with(&raw))
    }

    /// Parameters of a build pass derived from these settings.
    pub fn build_options(&self) -> BuildOptions {
        BuildOptions {
            mode: self.mode,
            weighted: self.weighted,
            directed: self.directed,
            null_marker: self.null_marker.clone(),
            strict_edges: self.strict_edges,
        }
    }

    /// Show the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize config: {e}"),
        })
    }

    /// Generate a template config file.
    pub fn template() -> String {
        r#"# treeviz configuration
#
# Locations (by precedence, lowest to highest):
#   Global: ~/.config/treeviz/treeviz.toml
#   Local:  <dir>/.treeviz.toml
#   Env:    TREEVIZ_* environment variables (explicit overrides)
#   CLI flags override everything.

# Construction mode: "bst", "bt" or "graph"
# mode = "bst"

# Graph edges carry a weight in their third field (source,target,weight)
# weighted = false

# Graph edges point from source to target
# directed = false

# Token standing for an empty tree slot (case-insensitive)
# null_marker = "null"

# Fail on edge tokens missing an endpoint ("A," or ",B") instead of
# keeping the present endpoint as a standalone node
# strict_edges = false

# Output of `treeviz build`: "tree" or "json"
# format = "tree"
"#
        .to_string()
    }
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}
