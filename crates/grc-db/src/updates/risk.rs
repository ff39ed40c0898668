//! Risk update builder.

use serde::Serialize;

#[derive(Debug, Clone, Default, Serialize)]
pub struct RiskUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub likelihood: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub impact: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner: Option<Option<String>>,
}

pub struct RiskUpdateBuilder(RiskUpdate);

impl RiskUpdateBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self(RiskUpdate::default())
    }

    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.0.title = Some(title.into());
        self
    }

    #[must_use]
    pub fn description(mut self, description: Option<String>) -> Self {
        self.0.description = Some(description);
        self
    }

    #[must_use]
    pub fn category(mut self, category: Option<String>) -> Self {
        self.0.category = Some(category);
        self
    }

    #[must_use]
    pub const fn likelihood(mut self, likelihood: u8) -> Self {
        self.0.likelihood = Some(likelihood);
        self
    }

    #[must_use]
    pub const fn impact(mut self, impact: u8) -> Self {
        self.0.impact = Some(impact);
        self
    }

    #[must_use]
    pub fn owner(mut self, owner: Option<String>) -> Self {
        self.0.owner = Some(owner);
        self
    }

    #[must_use]
    pub fn build(self) -> RiskUpdate {
        self.0
    }
}

impl Default for RiskUpdateBuilder {
    fn default() -> Self {
        Self::new()
    }
}
