use grc_core::entities::AuditPlan;
use grc_core::enums::AuditPlanStatus;
use grc_db::repos::audit_plan::AuditPlanFilter;
use serde::Serialize;

use crate::cli::GlobalFlags;
use crate::commands::shared::parse::parse_enum;
use crate::context::AppContext;
use crate::output::output;

#[derive(Debug, Serialize)]
struct PlanListResponse {
    plans: Vec<AuditPlan>,
}

pub async fn run(
    status: Option<&str>,
    template: Option<&str>,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let filter = AuditPlanFilter {
        status: status
            .map(|value| parse_enum::<AuditPlanStatus>(value, "status"))
            .transpose()?,
        template_id: template.map(String::from),
        limit: Some(ctx.limit(flags.limit)),
    };

    let plans = ctx.service.list_audit_plans(&filter).await?;
    output(&PlanListResponse { plans }, flags.format)
}
