use grc_core::entities::Workpaper;
use grc_core::enums::{TestResult, WorkpaperStatus};
use grc_db::repos::workpaper::WorkpaperFilter;
use grc_db::updates::workpaper::WorkpaperUpdateBuilder;
use serde::Serialize;

use crate::cli::GlobalFlags;
use crate::cli::subcommands::WorkpaperCommands;
use crate::commands::shared::parse::parse_enum;
use crate::context::AppContext;
use crate::output::output;

#[derive(Debug, Serialize)]
struct WorkpaperListResponse {
    workpapers: Vec<Workpaper>,
}

/// Handle `grc workpaper`.
pub async fn handle(
    action: &WorkpaperCommands,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    match action {
        WorkpaperCommands::List { plan, status } => {
            let filter = WorkpaperFilter {
                audit_plan_id: plan.clone(),
                category_id: None,
                status: status
                    .as_deref()
                    .map(|value| parse_enum::<WorkpaperStatus>(value, "status"))
                    .transpose()?,
                limit: Some(ctx.limit(flags.limit)),
            };
            let workpapers = ctx.service.list_workpapers(&filter).await?;
            output(&WorkpaperListResponse { workpapers }, flags.format)
        }
        WorkpaperCommands::Get { id } => {
            let workpaper = ctx.service.get_workpaper(id).await?;
            output(&workpaper, flags.format)
        }
        WorkpaperCommands::Update {
            id,
            title,
            objectives,
            scope,
            procedures,
        } => {
            let mut builder = WorkpaperUpdateBuilder::new();
            if let Some(title) = title {
                builder = builder.title(title);
            }
            if let Some(objectives) = objectives {
                builder = builder.objectives(objectives);
            }
            if let Some(scope) = scope {
                builder = builder.scope(scope);
            }
            if let Some(procedures) = procedures {
                builder = builder.test_procedures(procedures);
            }
            let workpaper = ctx.service.update_workpaper(id, builder.build()).await?;
            output(&workpaper, flags.format)
        }
        WorkpaperCommands::Record { id, result, notes } => {
            let result = parse_enum::<TestResult>(result, "result")?;
            let workpaper = ctx
                .service
                .record_test_result(id, result, notes.as_deref())
                .await?;
            output(&workpaper, flags.format)
        }
        WorkpaperCommands::Tick {
            id,
            code,
            description,
        } => {
            let workpaper = ctx.service.add_tick_mark(id, *code, description).await?;
            output(&workpaper, flags.format)
        }
        WorkpaperCommands::Transition { id, status } => {
            let status = parse_enum::<WorkpaperStatus>(status, "status")?;
            let workpaper = ctx.service.transition_workpaper(id, status).await?;
            output(&workpaper, flags.format)
        }
    }
}
