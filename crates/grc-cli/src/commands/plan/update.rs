use grc_db::updates::audit_plan::AuditPlanUpdateBuilder;

use crate::cli::GlobalFlags;
use crate::commands::shared::parse::parse_date;
use crate::context::AppContext;
use crate::output::output;

pub async fn run(
    id: &str,
    title: Option<&str>,
    lead: Option<&str>,
    start: Option<&str>,
    end: Option<&str>,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    if title.is_none() && lead.is_none() && start.is_none() && end.is_none() {
        anyhow::bail!("plan update requires at least one of --title, --lead, --start, --end");
    }

    let mut builder = AuditPlanUpdateBuilder::new();
    if let Some(title) = title {
        builder = builder.title(title);
    }
    if let Some(lead) = lead {
        builder = builder.lead_auditor(Some(lead.to_string()));
    }
    if let Some(start) = start {
        builder = builder.start_date(Some(parse_date(start, "start")?));
    }
    if let Some(end) = end {
        builder = builder.end_date(Some(parse_date(end, "end")?));
    }

    let plan = ctx.service.update_audit_plan(id, builder.build()).await?;
    output(&plan, flags.format)
}
