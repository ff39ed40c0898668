use grc_core::enums::Severity;
use grc_db::updates::finding::FindingUpdateBuilder;

use crate::cli::GlobalFlags;
use crate::commands::shared::parse::{parse_date, parse_enum};
use crate::context::AppContext;
use crate::output::output;

pub struct UpdateArgs<'a> {
    pub title: Option<&'a str>,
    pub description: Option<&'a str>,
    pub clause: Option<&'a str>,
    pub severity: Option<&'a str>,
    pub due: Option<&'a str>,
    pub workpaper: Option<&'a str>,
}

impl UpdateArgs<'_> {
    const fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.clause.is_none()
            && self.severity.is_none()
            && self.due.is_none()
            && self.workpaper.is_none()
    }
}

pub async fn run(
    id: &str,
    args: UpdateArgs<'_>,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    if args.is_empty() {
        anyhow::bail!("finding update requires at least one field to change");
    }

    let mut builder = FindingUpdateBuilder::new();
    if let Some(title) = args.title {
        builder = builder.title(title);
    }
    if let Some(description) = args.description {
        builder = builder.description(Some(description.to_string()));
    }
    if let Some(clause) = args.clause {
        builder = builder.clause(clause.trim());
    }
    if let Some(severity) = args.severity {
        builder = builder.severity(parse_enum::<Severity>(severity, "severity")?);
    }
    if let Some(due) = args.due {
        builder = builder.due_date(Some(parse_date(due, "due")?));
    }
    if let Some(workpaper) = args.workpaper {
        builder = builder.workpaper_id(Some(workpaper.to_string()));
    }

    let finding = ctx.service.update_finding(id, builder.build()).await?;
    output(&finding, flags.format)
}
