mod create;
mod heatmap;
mod kri;
mod list;
mod update;

use grc_core::enums::RiskStatus;
use grc_core::responses::{KriView, RiskView};
use serde::Serialize;
use serde_json::json;

use crate::cli::GlobalFlags;
use crate::cli::subcommands::RiskCommands;
use crate::commands::shared::parse::parse_enum;
use crate::context::AppContext;
use crate::output::output;

#[derive(Debug, Serialize)]
struct RiskDetailResponse {
    #[serde(flatten)]
    risk: RiskView,
    kris: Vec<KriView>,
}

/// Handle `grc risk`.
pub async fn handle(
    action: &RiskCommands,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    match action {
        RiskCommands::Create {
            title,
            likelihood,
            impact,
            description,
            category,
            owner,
        } => {
            create::run(
                create::CreateArgs {
                    title,
                    likelihood: *likelihood,
                    impact: *impact,
                    description: description.as_deref(),
                    category: category.as_deref(),
                    owner: owner.as_deref(),
                },
                ctx,
                flags,
            )
            .await
        }
        RiskCommands::Update {
            id,
            title,
            likelihood,
            impact,
            description,
            category,
            owner,
        } => {
            update::run(
                id,
                update::UpdateArgs {
                    title: title.as_deref(),
                    likelihood: *likelihood,
                    impact: *impact,
                    description: description.as_deref(),
                    category: category.as_deref(),
                    owner: owner.as_deref(),
                },
                ctx,
                flags,
            )
            .await
        }
        RiskCommands::Get { id } => {
            let risk = ctx.service.get_risk(id).await?;
            let kris = ctx.service.list_kris_for_risk(id).await?;
            output(
                &RiskDetailResponse {
                    risk: RiskView::from(risk),
                    kris: kris.into_iter().map(KriView::from).collect(),
                },
                flags.format,
            )
        }
        RiskCommands::List {
            status,
            level,
            owner,
        } => list::run(status.as_deref(), level.as_deref(), owner.as_deref(), ctx, flags).await,
        RiskCommands::Transition { id, status } => {
            let status = parse_enum::<RiskStatus>(status, "status")?;
            let risk = ctx.service.transition_risk(id, status).await?;
            output(&RiskView::from(risk), flags.format)
        }
        RiskCommands::Delete { id } => {
            ctx.service.delete_risk(id).await?;
            output(&json!({ "deleted": id }), flags.format)
        }
        RiskCommands::Heatmap => heatmap::run(ctx, flags).await,
        RiskCommands::KriAdd {
            risk,
            name,
            unit,
            target,
            warning,
            critical,
            direction,
        } => {
            kri::add(
                kri::KriArgs {
                    risk,
                    name,
                    unit: unit.as_deref(),
                    target: *target,
                    warning: *warning,
                    critical: *critical,
                    direction: direction.as_deref(),
                },
                ctx,
                flags,
            )
            .await
        }
        RiskCommands::KriList { risk } => kri::list(risk, ctx, flags).await,
        RiskCommands::KriRecord { kri, value } => kri::record(kri, *value, ctx, flags).await,
    }
}
