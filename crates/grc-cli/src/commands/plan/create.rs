use crate::cli::GlobalFlags;
use crate::commands::shared::parse::parse_optional_date;
use crate::context::AppContext;
use crate::output::output;

pub async fn run(
    title: &str,
    template: Option<&str>,
    lead: Option<&str>,
    start: Option<&str>,
    end: Option<&str>,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let template_id = template.unwrap_or(&ctx.config.general.default_template);
    let start_date = parse_optional_date(start, "start")?;
    let end_date = parse_optional_date(end, "end")?;

    let plan = ctx
        .service
        .create_audit_plan(title, template_id, lead, start_date, end_date)
        .await?;

    output(&plan, flags.format)
}
