//! Shared test utilities for grc-db tests.

pub(crate) mod helpers {
    use grc_core::entities::{AuditPlan, Workpaper};
    use grc_core::responses::ReviewSubmission;

    use crate::GrcDb;
    use crate::service::GrcService;

    pub const TEST_ACTOR: &str = "test-auditor";

    /// Create an in-memory service attributed to [`TEST_ACTOR`].
    pub async fn test_service() -> GrcService {
        let db = GrcDb::open_local(":memory:").await.unwrap();
        GrcService::from_db(db, Some(TEST_ACTOR.to_string()))
    }

    /// Create a draft certification audit plan with the recommended selection.
    pub async fn create_test_plan(svc: &GrcService) -> AuditPlan {
        svc.create_audit_plan("2026 certification audit", "iso27001-2022", None, None, None)
            .await
            .unwrap()
    }

    /// Submit a fresh certification plan and return its ID and workpapers.
    pub async fn submitted_workpapers(svc: &GrcService) -> (String, Vec<Workpaper>) {
        let plan = create_test_plan(svc).await;
        match svc.submit_for_review(&plan.id).await.unwrap() {
            ReviewSubmission::Submitted { plan, workpapers } => (plan.id, workpapers),
            ReviewSubmission::Rejected { validation } => {
                panic!("recommended selection should validate: {validation:?}")
            }
        }
    }
}
