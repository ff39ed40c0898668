mod create;
mod list;
mod selection;
mod submit;
mod update;

use grc_core::enums::AuditPlanStatus;
use grc_core::selection::SelectorAction;
use serde_json::json;

use crate::cli::GlobalFlags;
use crate::cli::subcommands::PlanCommands;
use crate::commands::shared::parse::parse_enum;
use crate::context::AppContext;
use crate::output::output;

/// Handle `grc plan`.
pub async fn handle(
    action: &PlanCommands,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    match action {
        PlanCommands::Create {
            title,
            template,
            lead,
            start,
            end,
        } => {
            create::run(
                title,
                template.as_deref(),
                lead.as_deref(),
                start.as_deref(),
                end.as_deref(),
                ctx,
                flags,
            )
            .await
        }
        PlanCommands::Update {
            id,
            title,
            lead,
            start,
            end,
        } => {
            update::run(
                id,
                title.as_deref(),
                lead.as_deref(),
                start.as_deref(),
                end.as_deref(),
                ctx,
                flags,
            )
            .await
        }
        PlanCommands::Get { id } => {
            let plan = ctx.service.get_audit_plan(id).await?;
            output(&plan, flags.format)
        }
        PlanCommands::List { status, template } => {
            list::run(status.as_deref(), template.as_deref(), ctx, flags).await
        }
        PlanCommands::Select { id, categories } => {
            selection::replace(id, categories, ctx, flags).await
        }
        PlanCommands::Toggle { id, category } => {
            selection::apply(id, &SelectorAction::Toggle(category.clone()), ctx, flags).await
        }
        PlanCommands::SelectAll { id } => {
            selection::apply(id, &SelectorAction::ToggleSelectAll, ctx, flags).await
        }
        PlanCommands::Recommend { id } => {
            selection::apply(id, &SelectorAction::SelectRecommended, ctx, flags).await
        }
        PlanCommands::Submit { id } => submit::run(id, ctx, flags).await,
        PlanCommands::Transition { id, status } => {
            let status = parse_enum::<AuditPlanStatus>(status, "status")?;
            let plan = ctx.service.transition_audit_plan(id, status).await?;
            output(&plan, flags.format)
        }
        PlanCommands::Delete { id } => {
            ctx.service.delete_audit_plan(id).await?;
            output(&json!({ "deleted": id }), flags.format)
        }
    }
}
