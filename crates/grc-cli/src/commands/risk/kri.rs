use grc_core::enums::KriDirection;
use grc_core::responses::KriView;
use grc_db::repos::kri::NewKri;
use serde::Serialize;

use crate::cli::GlobalFlags;
use crate::commands::shared::parse::parse_enum;
use crate::context::AppContext;
use crate::output::output;

#[derive(Debug, Serialize)]
struct KriListResponse {
    kris: Vec<KriView>,
}

pub struct KriArgs<'a> {
    pub risk: &'a str,
    pub name: &'a str,
    pub unit: Option<&'a str>,
    pub target: f64,
    pub warning: f64,
    pub critical: f64,
    pub direction: Option<&'a str>,
}

pub async fn add(args: KriArgs<'_>, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let direction = args
        .direction
        .map(|value| parse_enum::<KriDirection>(value, "direction"))
        .transpose()?
        .unwrap_or(KriDirection::HigherIsWorse);

    let kri = ctx
        .service
        .create_kri(NewKri {
            risk_id: args.risk.to_string(),
            name: args.name.to_string(),
            unit: args.unit.map(String::from),
            target: args.target,
            warning_threshold: args.warning,
            critical_threshold: args.critical,
            direction,
        })
        .await?;
    output(&KriView::from(kri), flags.format)
}

pub async fn list(risk_id: &str, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    ctx.service.get_risk(risk_id).await?;
    let kris = ctx.service.list_kris_for_risk(risk_id).await?;
    output(
        &KriListResponse {
            kris: kris.into_iter().map(KriView::from).collect(),
        },
        flags.format,
    )
}

pub async fn record(
    kri_id: &str,
    value: f64,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let kri = ctx.service.record_kri_value(kri_id, value).await?;
    output(&KriView::from(kri), flags.format)
}
