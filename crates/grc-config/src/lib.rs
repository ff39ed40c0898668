//! # grc-config
//!
//! Layered configuration loading for grc using figment.
//!
//! Configuration sources (in priority order, highest wins):
//! 1. Environment variables (`GRC_*` prefix, `__` as separator)
//! 2. Project-level `.grc/config.toml`
//! 3. User-level `~/.config/grc/config.toml`
//! 4. Built-in defaults
//!
//! # Environment Variable Mapping
//!
//! Figment maps `GRC_GENERAL__DEFAULT_LIMIT` -> `general.default_limit`,
//! `GRC_DATABASE__PATH` -> `database.path`, etc.
//!
//! # Usage
//!
//! ```no_run
//! use grc_config::GrcConfig;
//!
//! let config = GrcConfig::load_with_dotenv().expect("config");
//! println!("default template: {}", config.general.default_template);
//! ```

mod database;
mod error;
mod general;

pub use database::{DEFAULT_DB_FILE, DatabaseConfig};
pub use error::ConfigError;
pub use general::GeneralConfig;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct GrcConfig {
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub general: GeneralConfig,
}

impl GrcConfig {
    /// Load configuration from all sources (TOML files + environment variables).
    ///
    /// Does NOT call `dotenvy`; use [`Self::load_with_dotenv`] for `.env` support.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Figment` when a source fails to parse and
    /// `ConfigError::InvalidValue` when a value is out of range.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_for_project(Path::new("."))
    }

    /// Load configuration reading the project file from
    /// `<project_root>/.grc/config.toml`.
    ///
    /// # Errors
    ///
    /// See [`Self::load`].
    pub fn load_for_project(project_root: &Path) -> Result<Self, ConfigError> {
        let config: Self = Self::figment_for_project(project_root).extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration after reading `.env` from the current directory.
    ///
    /// # Errors
    ///
    /// See [`Self::load`].
    pub fn load_with_dotenv() -> Result<Self, ConfigError> {
        let _ = dotenvy::dotenv();
        Self::load()
    }

    /// Build the figment provider chain for the current directory.
    #[must_use]
    pub fn figment() -> Figment {
        Self::figment_for_project(Path::new("."))
    }

    #[must_use]
    pub fn figment_for_project(project_root: &Path) -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Some(global_path) = Self::global_config_path() {
            if global_path.exists() {
                figment = figment.merge(Toml::file(global_path));
            }
        }

        let local_path = project_root.join(".grc").join("config.toml");
        if local_path.exists() {
            figment = figment.merge(Toml::file(local_path));
        }

        figment.merge(Env::prefixed("GRC_").split("__"))
    }

    /// Reject values that would make commands misbehave.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` naming the offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.general.default_limit == 0 {
            return Err(ConfigError::InvalidValue {
                field: "general.default_limit".into(),
                reason: "must be greater than zero".into(),
            });
        }
        if self.general.default_template.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "general.default_template".into(),
                reason: "must not be empty".into(),
            });
        }
        Ok(())
    }

    fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("grc").join("config.toml"))
    }
}
