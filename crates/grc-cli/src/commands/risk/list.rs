use grc_core::enums::{RiskLevel, RiskStatus};
use grc_core::responses::RiskView;
use grc_db::repos::risk::RiskFilter;
use serde::Serialize;

use crate::cli::GlobalFlags;
use crate::commands::shared::parse::parse_enum;
use crate::context::AppContext;
use crate::output::output;

#[derive(Debug, Serialize)]
struct RiskListResponse {
    risks: Vec<RiskView>,
}

pub async fn run(
    status: Option<&str>,
    level: Option<&str>,
    owner: Option<&str>,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let filter = RiskFilter {
        status: status
            .map(|value| parse_enum::<RiskStatus>(value, "status"))
            .transpose()?,
        level: level
            .map(|value| parse_enum::<RiskLevel>(value, "level"))
            .transpose()?,
        owner: owner.map(String::from),
        limit: Some(ctx.limit(flags.limit)),
    };

    let risks = ctx.service.list_risks(&filter).await?;
    output(
        &RiskListResponse {
            risks: risks.into_iter().map(RiskView::from).collect(),
        },
        flags.format,
    )
}
