use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::Result;

/// Default configuration file name looked up in the current directory.
pub const CONFIG_FILE: &str = "repotools.toml";

/// Represents the complete configuration for repo-tools.
///
/// Contains the commit linter settings and the release helper settings.
/// Every key is optional.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
pub struct Config {
    #[serde(default)]
    pub commit: CommitConfig,

    #[serde(default)]
    pub release: ReleaseConfig,
}

fn default_workspace_scope() -> String {
    "workspace".to_string()
}

/// Configuration for the commit message linter.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct CommitConfig {
    /// Pseudo-scope that always maps to the repository root
    #[serde(default = "default_workspace_scope")]
    pub workspace_scope: String,
}

impl Default for CommitConfig {
    fn default() -> Self {
        CommitConfig {
            workspace_scope: default_workspace_scope(),
        }
    }
}

fn default_cliff_config() -> String {
    ".gitcliff.toml".to_string()
}

fn default_include_path() -> String {
    "crates/{name}/**".to_string()
}

fn default_feature_group_suffix() -> String {
    "Features".to_string()
}

/// Configuration for the release helper.
///
/// `include_path` is the per-package path filter handed to the changelog
/// tool; `{name}` is replaced with the package name.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ReleaseConfig {
    #[serde(default = "default_cliff_config")]
    pub cliff_config: String,

    #[serde(default = "default_include_path")]
    pub include_path: String,

    #[serde(default = "default_feature_group_suffix")]
    pub feature_group_suffix: String,
}

impl Default for ReleaseConfig {
    fn default() -> Self {
        ReleaseConfig {
            cliff_config: default_cliff_config(),
            include_path: default_include_path(),
            feature_group_suffix: default_feature_group_suffix(),
        }
    }
}

impl ReleaseConfig {
    /// Path filter for the given package
    pub fn include_path_for(&self, name: &str) -> String {
        self.include_path.replace("{name}", name)
    }
}

/// Loads configuration from file or returns defaults.
///
/// Attempts to load configuration in the following order:
/// 1. Custom path provided as parameter
/// 2. `repotools.toml` in current directory
/// 3. `~/.config/.repotools.toml` in user config directory
/// 4. Default configuration if no file found
///
/// # Errors
/// Fails if a file exists but cannot be read or parsed.
pub fn load_config(config_path: Option<&str>) -> Result<Config> {
    let config_str = if let Some(path) = config_path {
        fs::read_to_string(path)?
    } else if Path::new(CONFIG_FILE).exists() {
        fs::read_to_string(CONFIG_FILE)?
    } else if let Some(config_dir) = dirs::config_dir() {
        let config_path = config_dir.join(format!(".{}", CONFIG_FILE));
        if config_path.exists() {
            fs::read_to_string(config_path)?
        } else {
            return Ok(Config::default());
        }
    } else {
        return Ok(Config::default());
    };

    let config: Config = toml::from_str(&config_str)?;
    tracing::debug!(?config, "loaded configuration");
    Ok(config)
}
