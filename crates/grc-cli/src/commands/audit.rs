use grc_core::entities::AuditEntry;
use grc_core::enums::{AuditAction, EntityType};
use grc_db::repos::audit::AuditFilter;
use serde::Serialize;

use crate::cli::GlobalFlags;
use crate::cli::root_commands::AuditArgs;
use crate::commands::shared::parse::parse_enum;
use crate::context::AppContext;
use crate::output::output;

#[derive(Debug, Serialize)]
struct AuditTrailResponse {
    entries: Vec<AuditEntry>,
}

/// Handle `grc audit`. Newest entries first.
pub async fn handle(args: &AuditArgs, ctx: &AppContext, flags: &GlobalFlags) -> anyhow::Result<()> {
    let filter = build_filter(args, ctx.limit(flags.limit))?;
    let entries = ctx.service.query_audit(&filter).await?;
    output(&AuditTrailResponse { entries }, flags.format)
}

fn build_filter(args: &AuditArgs, limit: u32) -> anyhow::Result<AuditFilter> {
    Ok(AuditFilter {
        entity_type: args
            .entity_type
            .as_deref()
            .map(|value| parse_enum::<EntityType>(value, "entity-type"))
            .transpose()?,
        entity_id: args.entity_id.clone(),
        action: args
            .action
            .as_deref()
            .map(|value| parse_enum::<AuditAction>(value, "action"))
            .transpose()?,
        actor: args.actor.clone(),
        limit: Some(limit),
    })
}

#[cfg(test)]
mod tests {
    use grc_core::enums::{AuditAction, EntityType};

    use super::build_filter;
    use crate::cli::root_commands::AuditArgs;

    fn args(entity_type: Option<&str>, action: Option<&str>) -> AuditArgs {
        AuditArgs {
            entity_type: entity_type.map(str::to_string),
            entity_id: None,
            action: action.map(str::to_string),
            actor: Some(String::from("lead@example.com")),
        }
    }

    #[test]
    fn parses_hyphenated_filters() {
        let filter = build_filter(&args(Some("audit-plan"), Some("status-changed")), 25)
            .expect("filter should build");
        assert_eq!(filter.entity_type, Some(EntityType::AuditPlan));
        assert_eq!(filter.action, Some(AuditAction::StatusChanged));
        assert_eq!(filter.actor.as_deref(), Some("lead@example.com"));
        assert_eq!(filter.limit, Some(25));
    }

    #[test]
    fn rejects_unknown_entity_type() {
        let err = build_filter(&args(Some("session"), None), 25).expect_err("should fail");
        assert!(err.to_string().contains("invalid entity-type 'session'"));
    }
}
