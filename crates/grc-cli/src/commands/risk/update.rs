use grc_core::responses::RiskView;
use grc_db::updates::risk::RiskUpdateBuilder;

use crate::cli::GlobalFlags;
use crate::context::AppContext;
use crate::output::output;

pub struct UpdateArgs<'a> {
    pub title: Option<&'a str>,
    pub likelihood: Option<u8>,
    pub impact: Option<u8>,
    pub description: Option<&'a str>,
    pub category: Option<&'a str>,
    pub owner: Option<&'a str>,
}

pub async fn run(
    id: &str,
    args: UpdateArgs<'_>,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let mut builder = RiskUpdateBuilder::new();
    let mut changed = false;
    if let Some(title) = args.title {
        builder = builder.title(title);
        changed = true;
    }
    if let Some(likelihood) = args.likelihood {
        builder = builder.likelihood(likelihood);
        changed = true;
    }
    if let Some(impact) = args.impact {
        builder = builder.impact(impact);
        changed = true;
    }
    if let Some(description) = args.description {
        builder = builder.description(Some(description.to_string()));
        changed = true;
    }
    if let Some(category) = args.category {
        builder = builder.category(Some(category.to_string()));
        changed = true;
    }
    if let Some(owner) = args.owner {
        builder = builder.owner(Some(owner.to_string()));
        changed = true;
    }
    if !changed {
        anyhow::bail!("risk update requires at least one field to change");
    }

    let risk = ctx.service.update_risk(id, builder.build()).await?;
    output(&RiskView::from(risk), flags.format)
}
