//! Per-invocation environment: the project's `.env` and layered config.

use std::path::Path;

use anyhow::Context;
use grc_config::GrcConfig;

/// Load `<project_root>/.env` (without overriding the real environment), then
/// the layered configuration with `<project_root>/.grc/config.toml`.
pub fn load_config(project_root: &Path) -> anyhow::Result<GrcConfig> {
    load_project_dotenv(project_root)?;
    GrcConfig::load_for_project(project_root)
        .with_context(|| format!("failed to load grc configuration for {}", project_root.display()))
}

fn load_project_dotenv(project_root: &Path) -> anyhow::Result<()> {
    let env_path = project_root.join(".env");
    if !env_path.is_file() {
        return Ok(());
    }
    dotenvy::from_path(&env_path)
        .with_context(|| format!("failed to load dotenv file at {}", env_path.display()))?;
    tracing::debug!(path = %env_path.display(), "loaded project .env");
    Ok(())
}
