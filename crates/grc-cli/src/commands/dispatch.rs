use crate::cli::GlobalFlags;
use crate::cli::root_commands::Commands;
use crate::commands;
use crate::context::AppContext;

/// Dispatch a parsed command to the corresponding handler module.
pub async fn dispatch(
    command: Commands,
    ctx: &AppContext,
    flags: &GlobalFlags,
) -> anyhow::Result<()> {
    match command {
        Commands::Template { action } => commands::template::handle(&action, ctx, flags).await,
        Commands::Plan { action } => commands::plan::handle(&action, ctx, flags).await,
        Commands::Workpaper { action } => commands::workpaper::handle(&action, ctx, flags).await,
        Commands::Finding { action } => commands::finding::handle(&action, ctx, flags).await,
        Commands::Risk { action } => commands::risk::handle(&action, ctx, flags).await,
        Commands::Audit(args) => commands::audit::handle(&args, ctx, flags).await,
        Commands::Init(_) => unreachable!("init is pre-dispatched in main"),
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;
    use grc_config::GrcConfig;
    use grc_core::enums::{AuditPlanStatus, FindingStatus, WorkpaperStatus};
    use grc_db::repos::audit_plan::AuditPlanFilter;
    use grc_db::repos::finding::FindingFilter;
    use grc_db::repos::workpaper::WorkpaperFilter;

    use super::dispatch;
    use crate::cli::Cli;
    use crate::context::AppContext;

    async fn project() -> (tempfile::TempDir, AppContext) {
        let temp = tempfile::tempdir().expect("tempdir should create");
        let ctx = AppContext::init(temp.path().to_path_buf(), GrcConfig::default())
            .await
            .expect("context should init");
        (temp, ctx)
    }

    async fn run(ctx: &AppContext, args: &[&str]) -> anyhow::Result<()> {
        let cli = Cli::try_parse_from(args.iter().copied()).expect("cli should parse");
        let flags = cli.global_flags();
        dispatch(cli.command, ctx, &flags).await
    }

    async fn only_plan_id(ctx: &AppContext) -> String {
        let plans = ctx
            .service
            .list_audit_plans(&AuditPlanFilter::default())
            .await
            .expect("plans should list");
        assert_eq!(plans.len(), 1);
        plans[0].id.clone()
    }

    #[tokio::test]
    async fn plan_to_finding_flow() {
        let (_temp, ctx) = project().await;

        run(&ctx, &["grc", "plan", "create", "--title", "FY26 ISMS audit"])
            .await
            .expect("plan should create");
        let plan_id = only_plan_id(&ctx).await;

        run(&ctx, &["grc", "plan", "toggle", &plan_id, "tech-controls-a8"])
            .await
            .expect("toggle should apply");
        run(&ctx, &["grc", "plan", "submit", &plan_id])
            .await
            .expect("plan should submit");

        let plan = ctx.service.get_audit_plan(&plan_id).await.expect("plan");
        assert_eq!(plan.status, AuditPlanStatus::UnderReview);

        let workpapers = ctx
            .service
            .list_workpapers(&WorkpaperFilter {
                audit_plan_id: Some(plan_id.clone()),
                ..WorkpaperFilter::default()
            })
            .await
            .expect("workpapers should list");
        assert_eq!(workpapers.len(), plan.selected_category_ids.len());

        let wp = &workpapers[0];
        run(
            &ctx,
            &["grc", "workpaper", "record", &wp.id, "--result", "non-conformity"],
        )
        .await
        .expect("result should record");
        assert_eq!(
            ctx.service.get_workpaper(&wp.id).await.expect("wp").status,
            WorkpaperStatus::Tested
        );

        run(
            &ctx,
            &[
                "grc",
                "finding",
                "create",
                "--clause",
                "4.1",
                "--title",
                "Context not documented",
                "--workpaper",
                &wp.id,
                "--severity",
                "high",
            ],
        )
        .await
        .expect("finding should create");

        let findings = ctx
            .service
            .list_findings(&FindingFilter::default())
            .await
            .expect("findings should list");
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].reference_code, "F-001");
        assert_eq!(findings[0].audit_plan_id.as_deref(), Some(plan_id.as_str()));

        run(&ctx, &["grc", "finding", "transition", "F-001", "in-progress"])
            .await
            .expect("finding should transition");
        assert_eq!(
            ctx.service.get_finding("F-001").await.expect("finding").status,
            FindingStatus::InProgress
        );
    }

    #[tokio::test]
    async fn rejected_submission_is_an_error() {
        let (_temp, ctx) = project().await;

        run(&ctx, &["grc", "plan", "create", "--title", "Annex A only"])
            .await
            .expect("plan should create");
        let plan_id = only_plan_id(&ctx).await;

        run(&ctx, &["grc", "plan", "select", &plan_id, "support-7"])
            .await
            .expect("selection should store");
        let err = run(&ctx, &["grc", "plan", "submit", &plan_id])
            .await
            .expect_err("submission should be rejected");
        assert!(err.to_string().contains("was not submitted"));

        let plan = ctx.service.get_audit_plan(&plan_id).await.expect("plan");
        assert_eq!(plan.status, AuditPlanStatus::Draft);
    }

    #[tokio::test]
    async fn invalid_enum_values_are_reported() {
        let (_temp, ctx) = project().await;
        let err = run(&ctx, &["grc", "risk", "list", "--level", "extreme"])
            .await
            .expect_err("level should not parse");
        assert!(err.to_string().contains("invalid level 'extreme'"));
    }

    #[tokio::test]
    async fn risk_with_kri_flow() {
        let (_temp, ctx) = project().await;
        run(
            &ctx,
            &[
                "grc", "risk", "create", "--title", "Ransomware", "--likelihood", "4", "--impact",
                "5",
            ],
        )
        .await
        .expect("risk should create");

        let risks = ctx
            .service
            .list_risks(&grc_db::repos::risk::RiskFilter::default())
            .await
            .expect("risks should list");
        let risk_id = risks[0].id.clone();

        run(
            &ctx,
            &[
                "grc", "risk", "kri-add", &risk_id, "--name", "Unpatched hosts", "--target", "0",
                "--warning", "5", "--critical", "10",
            ],
        )
        .await
        .expect("kri should add");
        let kris = ctx.service.list_kris_for_risk(&risk_id).await.expect("kris");
        assert_eq!(kris.len(), 1);

        run(&ctx, &["grc", "risk", "kri-record", &kris[0].id, "12"])
            .await
            .expect("reading should record");
        assert_eq!(
            ctx.service.get_kri(&kris[0].id).await.expect("kri").current_value,
            Some(12.0)
        );

        run(&ctx, &["grc", "risk", "heatmap"]).await.expect("heatmap should render");
    }
}
