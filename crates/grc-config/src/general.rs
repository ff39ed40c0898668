//! General application configuration.

use serde::{Deserialize, Serialize};

/// Default result limit.
const fn default_limit() -> u32 {
    20
}

fn default_template() -> String {
    "iso27001-2022".to_string()
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GeneralConfig {
    /// Default result limit for list/search commands.
    #[serde(default = "default_limit")]
    pub default_limit: u32,

    /// Template used by `grc plan create` when `--template` is omitted.
    #[serde(default = "default_template")]
    pub default_template: String,

    /// Name recorded as `prepared_by` and on audit trail entries.
    #[serde(default)]
    pub actor: String,
}

impl GeneralConfig {
    /// The configured actor, if any.
    #[must_use]
    pub fn actor(&self) -> Option<&str> {
        let actor = self.actor.trim();
        (!actor.is_empty()).then_some(actor)
    }
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            default_limit: default_limit(),
            default_template: default_template(),
            actor: String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_correct() {
        let config = GeneralConfig::default();
        assert_eq!(config.default_limit, 20);
        assert_eq!(config.default_template, "iso27001-2022");
        assert!(config.actor().is_none());
    }

    #[test]
    fn blank_actor_is_none() {
        let config = GeneralConfig {
            actor: "   ".into(),
            ..GeneralConfig::default()
        };
        assert!(config.actor().is_none());

        let config = GeneralConfig {
            actor: " j.doe ".into(),
            ..GeneralConfig::default()
        };
        assert_eq!(config.actor(), Some("j.doe"));
    }
}
