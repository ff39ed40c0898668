use grc_core::enums::Severity;
use grc_db::repos::finding::NewFinding;

use crate::cli::GlobalFlags;
use crate::commands::shared::parse::{parse_enum, parse_optional_date};
use crate::context::AppContext;
use crate::output::output;

pub struct CreateArgs<'a> {
    pub clause: &'a str,
    pub title: &'a str,
    pub description: Option<&'a str>,
    pub severity: Option<&'a str>,
    pub plan: Option<&'a str>,
    pub workpaper: Option<&'a str>,
    pub due: Option<&'a str>,
}

pub async fn run(
    args: CreateArgs<'_>,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let severity = args
        .severity
        .map(|value| parse_enum::<Severity>(value, "severity"))
        .transpose()?;

    let mut new = NewFinding::new(args.clause.trim(), args.title);
    if let Some(severity) = severity {
        new.severity = severity;
    }
    new.description = args.description.map(String::from);
    new.audit_plan_id = args.plan.map(String::from);
    new.workpaper_id = args.workpaper.map(String::from);
    new.due_date = parse_optional_date(args.due, "due")?;

    let finding = ctx.service.create_finding(new).await?;
    output(&finding, flags.format)
}
