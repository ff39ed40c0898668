use grc_core::enums::RiskLevel;
use grc_core::risk::{HeatMap, MAX_RATING, MIN_RATING};
use serde::Serialize;

use crate::cli::GlobalFlags;
use crate::context::AppContext;
use crate::output::output;

#[derive(Debug, Serialize, PartialEq, Eq)]
struct HeatMapRow {
    likelihood: u8,
    /// Counts for impact 1 through 5.
    impact: Vec<u32>,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
struct LevelCount {
    level: RiskLevel,
    count: u32,
}

#[derive(Debug, Serialize)]
struct HeatMapResponse {
    rows: Vec<HeatMapRow>,
    by_level: Vec<LevelCount>,
    total: u32,
}

impl From<&HeatMap> for HeatMapResponse {
    fn from(map: &HeatMap) -> Self {
        let rows = (MIN_RATING..=MAX_RATING)
            .rev()
            .map(|likelihood| HeatMapRow {
                likelihood,
                impact: (MIN_RATING..=MAX_RATING)
                    .map(|impact| map.count(likelihood, impact))
                    .collect(),
            })
            .collect();
        let by_level = map
            .by_level()
            .into_iter()
            .map(|(level, count)| LevelCount { level, count })
            .collect();
        Self {
            rows,
            by_level,
            total: map.total,
        }
    }
}

pub async fn run(ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let map = ctx.service.risk_heat_map().await?;
    output(&HeatMapResponse::from(&map), flags.format)
}
