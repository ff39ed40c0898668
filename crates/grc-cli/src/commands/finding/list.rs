use grc_core::entities::Finding;
use grc_core::enums::{FindingStatus, Severity};
use grc_db::repos::finding::FindingFilter;
use serde::Serialize;

use crate::cli::GlobalFlags;
use crate::commands::shared::parse::parse_enum;
use crate::context::AppContext;
use crate::output::output;

#[derive(Debug, Serialize)]
struct FindingListResponse {
    findings: Vec<Finding>,
}

pub async fn run(
    status: Option<&str>,
    severity: Option<&str>,
    plan: Option<&str>,
    search: Option<&str>,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    let limit = ctx.limit(flags.limit);
    let status = status
        .map(|value| parse_enum::<FindingStatus>(value, "status"))
        .transpose()?;
    let severity = severity
        .map(|value| parse_enum::<Severity>(value, "severity"))
        .transpose()?;

    let findings = if let Some(term) = search {
        let mut findings = ctx
            .service
            .search_findings(term, fetch_limit(limit, status, severity, plan))
            .await?;
        retain_matching(&mut findings, status, severity, plan);
        findings.truncate(usize::try_from(limit)?);
        findings
    } else {
        let filter = FindingFilter {
            status,
            severity,
            audit_plan_id: plan.map(String::from),
            workpaper_id: None,
            limit: Some(limit),
        };
        ctx.service.list_findings(&filter).await?
    };

    output(&FindingListResponse { findings }, flags.format)
}

/// Text search has no column filters, so over-fetch when any are given.
fn fetch_limit(
    limit: u32,
    status: Option<FindingStatus>,
    severity: Option<Severity>,
    plan: Option<&str>,
) -> u32 {
    if status.is_some() || severity.is_some() || plan.is_some() {
        limit.saturating_mul(5).min(500)
    } else {
        limit
    }
}

fn retain_matching(
    findings: &mut Vec<Finding>,
    status: Option<FindingStatus>,
    severity: Option<Severity>,
    plan: Option<&str>,
) {
    findings.retain(|finding| {
        status.is_none_or(|s| finding.status == s)
            && severity.is_none_or(|s| finding.severity == s)
            && plan.is_none_or(|p| finding.audit_plan_id.as_deref() == Some(p))
    });
}
