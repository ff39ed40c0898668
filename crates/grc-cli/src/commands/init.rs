use std::path::Path;

use anyhow::Context;
use grc_config::GrcConfig;
use grc_db::service::GrcService;
use serde_json::json;

use crate::cli::GlobalFlags;
use crate::context::GRC_DIR;
use crate::output::output;

/// Handle `grc init`.
///
/// Creates `.grc/` under `root` and opens the project database
/// once so the schema exists before the first real command. Re-running on an
/// initialized project is harmless.
pub async fn handle(root: &Path, config: &GrcConfig, flags: &GlobalFlags) -> anyhow::Result<()> {
    if !root.is_dir() {
        anyhow::bail!("cannot initialize '{}': directory does not exist", root.display());
    }

    let grc_dir = root.join(GRC_DIR);
    let created = !grc_dir.exists();
    std::fs::create_dir_all(&grc_dir)
        .with_context(|| format!("failed to create {}", grc_dir.display()))?;

    let db_path = config.database.resolve(root);
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    GrcService::new_local(&db_path.to_string_lossy(), config.general.actor().map(String::from))
        .await
        .with_context(|| format!("failed to create grc database at {}", db_path.display()))?;

    tracing::info!(root = %root.display(), created, "initialized grc project");

    output(
        &json!({
            "project_root": root.display().to_string(),
            "database": db_path.display().to_string(),
            "created": created,
        }),
        flags.format,
    )
}
