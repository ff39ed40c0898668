use grc_core::responses::RiskView;
use grc_db::repos::risk::NewRisk;

use crate::cli::GlobalFlags;
use crate::context::AppContext;
use crate::output::output;

pub struct CreateArgs<'a> {
    pub title: &'a str,
    pub likelihood: u8,
    pub impact: u8,
    pub description: Option<&'a str>,
    pub category: Option<&'a str>,
    pub owner: Option<&'a str>,
}

pub async fn run(
    args: CreateArgs<'_>,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let mut new = NewRisk::new(args.title, args.likelihood, args.impact);
    new.description = args.description.map(String::from);
    new.category = args.category.map(String::from);
    new.owner = args.owner.map(String::from);

    let risk = ctx.service.create_risk(new).await?;
    output(&RiskView::from(risk), flags.format)
}
