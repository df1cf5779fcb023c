//! Project configuration loaded from `.matchup/config.toml`.
//!
//! Every section is optional; a missing file or missing key falls back to the
//! defaults below.

use crate::core::error::MatchupError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const CONFIG_SCHEMA_VERSION: &str = "1.0.0";
pub const PROJECT_DIR_NAME: &str = ".matchup";
pub const CONFIG_FILE_NAME: &str = "config.toml";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchupConfig {
    pub schema_version: String,
    pub store: StoreConfig,
    pub audit: AuditConfig,
    pub roster: RosterConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// File name of the stats database inside `.matchup/data/`.
    pub db_name: String,
    pub busy_timeout_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuditConfig {
    pub enabled: bool,
    pub actor: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct RosterConfig {
    /// Reject stat writes for names that are not registered in the roster.
    pub enforce: bool,
}

impl Default for MatchupConfig {
    fn default() -> Self {
        Self {
            schema_version: CONFIG_SCHEMA_VERSION.to_string(),
            store: StoreConfig::default(),
            audit: AuditConfig::default(),
            roster: RosterConfig::default(),
        }
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            db_name: "stats.db".to_string(),
            busy_timeout_ms: 5000,
        }
    }
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            actor: "matchup".to_string(),
        }
    }
}

pub fn config_path(project_root: &Path) -> PathBuf {
    project_root.join(PROJECT_DIR_NAME).join(CONFIG_FILE_NAME)
}

/// Load `.matchup/config.toml` under `project_root`.
/// No config file means defaults (not an error).
pub fn load_config(project_root: &Path) -> Result<MatchupConfig, MatchupError> {
    let path = config_path(project_root);
    if !path.exists() {
        return Ok(MatchupConfig::default());
    }
    let content = fs::read_to_string(&path).map_err(MatchupError::IoError)?;
    parse_config(&content)
}

pub fn parse_config(content: &str) -> Result<MatchupConfig, MatchupError> {
    let config: MatchupConfig =
        toml::from_str(content).map_err(|e| MatchupError::ConfigError(e.to_string()))?;
    if config.store.db_name.trim().is_empty() {
        return Err(MatchupError::ConfigError(
            "store.db_name must not be empty".to_string(),
        ));
    }
    Ok(config)
}

pub fn write_config(project_root: &Path, config: &MatchupConfig) -> Result<PathBuf, MatchupError> {
    let path = config_path(project_root);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(MatchupError::IoError)?;
    }
    let body =
        toml::to_string_pretty(config).map_err(|e| MatchupError::ConfigError(e.to_string()))?;
    fs::write(&path, body).map_err(MatchupError::IoError)?;
    Ok(path)
}
