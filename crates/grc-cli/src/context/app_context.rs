use std::path::PathBuf;

use anyhow::Context;
use grc_config::GrcConfig;
use grc_db::service::GrcService;

/// Shared application resources initialized once at startup.
pub struct AppContext {
    pub service: GrcService,
    pub config: GrcConfig,
}

impl AppContext {
    /// Open the project database, attributing writes to the configured actor.
    pub async fn init(project_root: PathBuf, config: GrcConfig) -> anyhow::Result<Self> {
        let db_path = config.database.resolve(&project_root);
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }

        let actor = config.general.actor().map(String::from);
        if actor.is_none() {
            tracing::warn!("general.actor is not configured; audit entries will have no actor");
        }

        let service = GrcService::new_local(&db_path.to_string_lossy(), actor)
            .await
            .with_context(|| format!("failed to open grc database at {}", db_path.display()))?;

        tracing::debug!(db = %db_path.display(), "opened grc database");
        Ok(Self { service, config })
    }

    /// Limit for list commands: `--limit`, then `general.default_limit`.
    #[must_use]
    pub fn limit(&self, flag: Option<u32>) -> u32 {
        crate::commands::shared::limit::effective_limit(flag, self.config.general.default_limit)
    }
}
