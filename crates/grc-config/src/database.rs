//! Local database configuration.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Database file name inside the project's `.grc/` directory.
pub const DEFAULT_DB_FILE: &str = "grc.db";

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct DatabaseConfig {
    /// Path to the libSQL database file. Empty means `<project>/.grc/grc.db`.
    #[serde(default)]
    pub path: String,
}

impl DatabaseConfig {
    /// Resolve the database path for a project.
    ///
    /// Relative configured paths are taken relative to `project_root`.
    #[must_use]
    pub fn resolve(&self, project_root: &Path) -> PathBuf {
        if self.path.is_empty() {
            return project_root.join(".grc").join(DEFAULT_DB_FILE);
        }
        let configured = PathBuf::from(&self.path);
        if configured.is_absolute() {
            configured
        } else {
            project_root.join(configured)
        }
    }
}
