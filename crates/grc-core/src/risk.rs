//! Risk scoring, heat map aggregation, and KRI banding.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::entities::Risk;
use crate::enums::{KriBand, KriDirection, RiskLevel, RiskStatus};
use crate::errors::CoreError;

pub const MIN_RATING: u8 = 1;
pub const MAX_RATING: u8 = 5;

/// Check a likelihood or impact rating is within 1–5.
///
/// # Errors
///
/// Returns `CoreError::Validation` when the rating is out of range.
pub fn validate_rating(field: &str, value: u8) -> Result<u8, CoreError> {
    if (MIN_RATING..=MAX_RATING).contains(&value) {
        Ok(value)
    } else {
        Err(CoreError::Validation(format!(
            "{field} must be between {MIN_RATING} and {MAX_RATING}, got {value}"
        )))
    }
}

/// Score and level for a likelihood/impact pair.
#[must_use]
pub const fn assess(likelihood: u8, impact: u8) -> (u8, RiskLevel) {
    let score = likelihood.saturating_mul(impact);
    (score, RiskLevel::from_score(score))
}

/// Band a KRI reading against its thresholds.
///
/// Reaching the critical threshold is red, reaching the warning threshold is
/// amber. For `LowerIsWorse` indicators "reaching" means falling to or below.
#[must_use]
pub fn kri_band(value: f64, warning: f64, critical: f64, direction: KriDirection) -> KriBand {
    match direction {
        KriDirection::HigherIsWorse if value >= critical => KriBand::Red,
        KriDirection::HigherIsWorse if value >= warning => KriBand::Amber,
        KriDirection::LowerIsWorse if value <= critical => KriBand::Red,
        KriDirection::LowerIsWorse if value <= warning => KriBand::Amber,
        _ => KriBand::Green,
    }
}

/// Check that thresholds are ordered for the indicator's direction.
///
/// # Errors
///
/// Returns `CoreError::Validation` when the warning threshold lies beyond the
/// critical threshold.
pub fn validate_thresholds(
    warning: f64,
    critical: f64,
    direction: KriDirection,
) -> Result<(), CoreError> {
    let ordered = match direction {
        KriDirection::HigherIsWorse => warning <= critical,
        KriDirection::LowerIsWorse => warning >= critical,
    };
    if ordered {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "warning threshold {warning} must not be beyond critical threshold {critical} for a {direction} indicator"
        )))
    }
}

/// 5×5 count of risks by likelihood (rows) and impact (columns).
///
/// `cells[l - 1][i - 1]` holds the number of risks rated likelihood `l`,
/// impact `i`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
pub struct HeatMap {
    pub cells: [[u32; 5]; 5],
    pub total: u32,
}

impl HeatMap {
    /// Aggregate open risks. Closed risks and out-of-range ratings are skipped.
    pub fn from_risks<'a>(risks: impl IntoIterator<Item = &'a Risk>) -> Self {
        let mut map = Self::default();
        for risk in risks {
            if risk.status != RiskStatus::Closed {
                map.add(risk.likelihood, risk.impact);
            }
        }
        map
    }

    pub fn add(&mut self, likelihood: u8, impact: u8) {
        if validate_rating("likelihood", likelihood).is_err()
            || validate_rating("impact", impact).is_err()
        {
            return;
        }
        self.cells[usize::from(likelihood - 1)][usize::from(impact - 1)] += 1;
        self.total += 1;
    }

    #[must_use]
    pub fn count(&self, likelihood: u8, impact: u8) -> u32 {
        if (MIN_RATING..=MAX_RATING).contains(&likelihood)
            && (MIN_RATING..=MAX_RATING).contains(&impact)
        {
            self.cells[usize::from(likelihood - 1)][usize::from(impact - 1)]
        } else {
            0
        }
    }

    /// Risk counts per level, lowest level first.
    #[must_use]
    pub fn by_level(&self) -> [(RiskLevel, u32); 4] {
        let mut out = [
            (RiskLevel::Low, 0),
            (RiskLevel::Medium, 0),
            (RiskLevel::High, 0),
            (RiskLevel::Critical, 0),
        ];
        for (l, row) in (MIN_RATING..=MAX_RATING).zip(self.cells.iter()) {
            for (i, count) in (MIN_RATING..=MAX_RATING).zip(row.iter()) {
                let (_, level) = assess(l, i);
                if let Some(slot) = out.iter_mut().find(|(lv, _)| *lv == level) {
                    slot.1 += count;
                }
            }
        }
        out
    }
}
