//! Store handle for matchup's persisted state.
//!
//! A store is a data directory (`<project>/.matchup/data/`) plus the project
//! configuration that governs how its databases are opened and audited.

use crate::core::config::{MatchupConfig, PROJECT_DIR_NAME};
use std::path::{Path, PathBuf};

pub const DATA_DIR_NAME: &str = "data";

#[derive(Debug, Clone)]
pub struct Store {
    /// Absolute path to the data directory holding the databases and audit log
    pub root: PathBuf,
    pub config: MatchupConfig,
}

impl Store {
    /// Store rooted at `root` with default configuration.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            config: MatchupConfig::default(),
        }
    }

    pub fn with_config(root: impl Into<PathBuf>, config: MatchupConfig) -> Self {
        Self {
            root: root.into(),
            config,
        }
    }

    /// Store for the project at `project_root` (the directory containing `.matchup/`).
    pub fn for_project(project_root: &Path, config: MatchupConfig) -> Self {
        Self::with_config(data_dir(project_root), config)
    }

    pub fn stats_db_path(&self) -> PathBuf {
        self.root.join(&self.config.store.db_name)
    }
}

pub fn data_dir(project_root: &Path) -> PathBuf {
    project_root.join(PROJECT_DIR_NAME).join(DATA_DIR_NAME)
}
