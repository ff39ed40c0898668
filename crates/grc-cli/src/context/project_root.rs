use std::path::{Path, PathBuf};

use anyhow::Context;

/// Per-project state directory holding the database, config, and write lock.
pub const GRC_DIR: &str = ".grc";

#[must_use]
fn is_grc_dir(path: &Path) -> bool {
    path.file_name().is_some_and(|name| name == GRC_DIR)
}

/// Nearest ancestor of `start` (itself included) that contains `.grc/`.
#[must_use]
fn find_project_root(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .find(|dir| dir.join(GRC_DIR).is_dir())
        .map(Path::to_path_buf)
}

/// Project root from `--project` (a project directory or its `.grc`), or by
/// discovery from `cwd`.
///
/// # Errors
///
/// Fails when the override does not exist or no `.grc` is found above `cwd`.
pub fn resolve_project_root(project_override: Option<&str>, cwd: &Path) -> anyhow::Result<PathBuf> {
    let Some(raw) = project_override else {
        return find_project_root(cwd)
            .context("not a grc project (no .grc directory found). Run 'grc init' first.");
    };

    let explicit = cwd.join(raw);
    if is_grc_dir(&explicit) && explicit.is_dir() {
        return explicit
            .parent()
            .map(Path::to_path_buf)
            .context("invalid --project path: '.grc' directory has no parent");
    }
    if !explicit.is_dir() {
        anyhow::bail!("invalid --project '{raw}': directory does not exist");
    }
    if !explicit.join(GRC_DIR).is_dir() {
        anyhow::bail!("'{raw}' is not a grc project. Run 'grc init {raw}' first.");
    }
    Ok(explicit)
}
