use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::enums::{KriBand, KriDirection};

/// A key risk indicator attached to one risk.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, PartialEq)]
pub struct Kri {
    pub id: String,
    pub risk_id: String,
    pub name: String,
    pub unit: Option<String>,
    pub current_value: Option<f64>,
    pub target: f64,
    pub warning_threshold: f64,
    pub critical_threshold: f64,
    pub direction: KriDirection,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Kri {
    /// Band of the current value. A KRI with no reading yet is green.
    #[must_use]
    pub fn band(&self) -> KriBand {
        self.current_value.map_or(KriBand::Green, |value| {
            crate::risk::kri_band(
                value,
                self.warning_threshold,
                self.critical_threshold,
                self.direction,
            )
        })
    }
}
