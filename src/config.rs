//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/taxotree/taxotree.toml`
//! 3. Local config: `<dir>/.taxotree.toml` (usually the working directory)
//! 4. Environment variables: `TAXOTREE_*` prefix

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::application::ApplicationError;
use crate::domain::{DEFAULT_LABEL, DEFAULT_VERSION};

/// Terminal rendering options.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct DisplayConfig {
    /// Decimal places for scores in tree drawings
    pub precision: usize,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self { precision: 2 }
    }
}

/// Raw display config for intermediate parsing (`None` → not specified).
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawDisplayConfig {
    pub precision: Option<usize>,
}

/// Raw settings for intermediate parsing.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub label: Option<String>,
    pub version: Option<String>,
    pub include_metadata: Option<bool>,
    #[serde(default)]
    pub display: RawDisplayConfig,
}

/// Unified configuration for taxotree.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Name of the synthesized root of loaded taxonomies
    pub label: String,
    /// Version tag attached to loaded taxonomies
    pub version: String,
    /// Keep extra source columns as item metadata
    pub include_metadata: bool,
    pub display: DisplayConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            label: DEFAULT_LABEL.to_string(),
            version: DEFAULT_VERSION.to_string(),
            include_metadata: false,
            display: DisplayConfig::default(),
        }
    }
}

/// Get the XDG config directory for taxotree.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "taxotree").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("taxotree.toml"))
}

/// Get the path to the local config file in a directory.
pub fn local_config_path(dir: &Path) -> PathBuf {
    dir.join(".taxotree.toml")
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
    /// Merge overlay config onto self (base): overlay wins if specified.
    pub fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            label: overlay.label.clone().unwrap_or_else(|| self.label.clone()),
            version: overlay
                .version
                .clone()
                .unwrap_or_else(|| self.version.clone()),
            include_metadata: overlay.include_metadata.unwrap_or(self.include_metadata),
            display: DisplayConfig {
                precision: overlay.display.precision.unwrap_or(self.display.precision),
            },
        }
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `local_dir` - Optional directory holding a `.taxotree.toml`
    pub fn load(local_dir: Option<&Path>) -> Result<Self, ApplicationError> {
        // 1. Start with defaults
        let mut current = Self::default();

        // 2. Global config
        if let Some(global_path) = global_config_path() {
            if global_path.exists() {
                let raw = load_raw_settings(&global_path)?;
                current = current.merge_with(&raw);
            }
        }

        // 3. Local config
        if let Some(dir) = local_dir {
            let local_path = local_config_path(dir);
            if local_path.exists() {
                let raw = load_raw_settings(&local_path)?;
                current = current.merge_with(&raw);
            }
        }

        // 4. Environment variables (explicit override)
        Self::apply_env_overrides(current)
    }

    /// Apply TAXOTREE_* environment variables as explicit overrides.
    fn apply_env_overrides(mut settings: Self) -> Result<Self, ApplicationError> {
        let config = Config::builder()
            .add_source(
                Environment::with_prefix("TAXOTREE")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()
            .map_err(config_err)?;

        if let Ok(val) = config.get_string("label") {
            settings.label = val;
        }
        if let Ok(val) = config.get_string("version") {
            settings.version = val;
        }
        if let Ok(val) = config.get_bool("include_metadata") {
            settings.include_metadata = val;
        }
        if let Ok(val) = config.get_int("display.precision") {
            settings.display.precision = usize::try_from(val).map_err(|_| ApplicationError::Config {
                message: format!("display.precision must be non-negative, got {}", val),
            })?;
        }

        Ok(settings)
    }

    /// Serialize current settings to TOML.
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize settings: {}", e),
        })
    }

    /// Commented template for a new config file.
    pub fn template() -> String {
        format!(
            r#"# taxotree configuration
# Global: $XDG_CONFIG_HOME/taxotree/taxotree.toml
# Local:  ./.taxotree.toml
# Env:    TAXOTREE_LABEL, TAXOTREE_DISPLAY__PRECISION, ...

# Name of the root item created when loading a taxonomy
label = "{}"

# Version tag attached to loaded taxonomies
version = "{}"

# Keep extra source columns as item metadata
include_metadata = false

[display]
# Decimal places for scores in tree drawings
precision = 2
"#,
            DEFAULT_LABEL, DEFAULT_VERSION
        )
    }
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}
