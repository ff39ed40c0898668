use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::{RiskLevel, RiskStatus};

/// A risk register entry. Likelihood and impact are rated 1–5.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct Risk {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub likelihood: u8,
    pub impact: u8,
    pub owner: Option<String>,
    pub status: RiskStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Risk {
    #[must_use]
    pub const fn score(&self) -> u8 {
        self.likelihood.saturating_mul(self.impact)
    }

    #[must_use]
    pub const fn level(&self) -> RiskLevel {
        RiskLevel::from_score(self.score())
    }
}
