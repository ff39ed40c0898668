mod create;
mod list;
mod update;

use grc_core::enums::FindingStatus;
use serde_json::json;

use crate::cli::GlobalFlags;
use crate::cli::subcommands::FindingCommands;
use crate::commands::shared::parse::parse_enum;
use crate::context::AppContext;
use crate::output::output;

/// Handle `grc finding`.
pub async fn handle(
    action: &FindingCommands,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    match action {
        FindingCommands::Create {
            clause,
            title,
            description,
            severity,
            plan,
            workpaper,
            due,
        } => {
            create::run(
                create::CreateArgs {
                    clause,
                    title,
                    description: description.as_deref(),
                    severity: severity.as_deref(),
                    plan: plan.as_deref(),
                    workpaper: workpaper.as_deref(),
                    due: due.as_deref(),
                },
                ctx,
                flags,
            )
            .await
        }
        FindingCommands::Update {
            id,
            title,
            description,
            clause,
            severity,
            due,
            workpaper,
        } => {
            update::run(
                id,
                update::UpdateArgs {
                    title: title.as_deref(),
                    description: description.as_deref(),
                    clause: clause.as_deref(),
                    severity: severity.as_deref(),
                    due: due.as_deref(),
                    workpaper: workpaper.as_deref(),
                },
                ctx,
                flags,
            )
            .await
        }
        FindingCommands::List {
            status,
            severity,
            plan,
            search,
        } => {
            list::run(
                status.as_deref(),
                severity.as_deref(),
                plan.as_deref(),
                search.as_deref(),
                ctx,
                flags,
            )
            .await
        }
        FindingCommands::Get { id } => {
            let finding = ctx.service.get_finding(id).await?;
            output(&finding, flags.format)
        }
        FindingCommands::Transition { id, status } => {
            let status = parse_enum::<FindingStatus>(status, "status")?;
            let finding = ctx.service.transition_finding(id, status).await?;
            output(&finding, flags.format)
        }
        FindingCommands::Delete { id } => {
            ctx.service.delete_finding(id).await?;
            output(&json!({ "deleted": id }), flags.format)
        }
    }
}
