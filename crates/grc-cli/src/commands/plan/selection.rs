use grc_core::entities::AuditPlan;
use grc_core::selection::SelectorAction;
use grc_core::template::ValidationResult;
use serde::Serialize;

use crate::cli::GlobalFlags;
use crate::context::AppContext;
use crate::output::output;

/// A plan after a selection change, with a preview of what submission would
/// say about it.
#[derive(Debug, Serialize)]
struct SelectionResponse {
    plan: AuditPlan,
    selected: usize,
    validation: ValidationResult,
}

pub async fn replace(
    id: &str,
    categories: &[String],
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let plan = ctx.service.set_plan_selection(id, categories).await?;
    respond(plan, ctx, flags)
}

pub async fn apply(
    id: &str,
    action: &SelectorAction,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let plan = ctx.service.apply_selector_action(id, action).await?;
    respond(plan, ctx, flags)
}

fn respond(plan: AuditPlan, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let validation = ctx
        .service
        .templates()
        .validate_category_selection(&plan.template_id, &plan.selected_category_ids);
    output(
        &SelectionResponse {
            selected: plan.selected_category_ids.len(),
            plan,
            validation,
        },
        flags.format,
    )
}
