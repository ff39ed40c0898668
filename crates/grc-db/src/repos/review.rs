//! Submit for review: validate the plan's selection, then generate its
//! workpapers and move it to `under_review` in one transaction.

use std::collections::HashSet;

use chrono::{DateTime, Utc};

use grc_core::audit_detail::{StatusChangedDetail, SubmittedDetail};
use grc_core::entities::{AuditEntry, AuditPlan, Workpaper};
use grc_core::enums::{AuditAction, AuditPlanStatus, EntityType, WorkpaperStatus};
use grc_core::ids::PREFIX_WORKPAPER;
use grc_core::responses::ReviewSubmission;

use crate::error::DatabaseError;
use crate::repos::audit::insert_audit;
use crate::repos::workpaper::{WorkpaperFilter, insert_workpaper};
use crate::service::GrcService;

impl GrcService {
    /// Submit a draft plan for review.
    ///
    /// A selection that fails validation returns
    /// [`ReviewSubmission::Rejected`] and leaves the store untouched.
    /// Otherwise one workpaper is generated per selected category that does
    /// not already have one, workpapers of categories deselected since the
    /// last submission are deleted, the plan moves to `under_review`, and the
    /// audit entries are written, all in a single transaction. The result
    /// holds exactly one workpaper per selected category.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::NoResult` for an unknown plan,
    /// `DatabaseError::InvalidState` when the plan is not a draft or a
    /// deselected category's workpaper has been reviewed, and any storage
    /// error raised inside the transaction (after rolling back).
    pub async fn submit_for_review(
        &self,
        plan_id: &str,
    ) -> Result<ReviewSubmission, DatabaseError> {
        let plan = self.get_audit_plan(plan_id).await?;
        if plan.status != AuditPlanStatus::Draft {
            return Err(DatabaseError::InvalidState(format!(
                "Cannot submit audit plan {plan_id} in status {}",
                plan.status
            )));
        }

        let validation = self
            .templates()
            .validate_category_selection(&plan.template_id, &plan.selected_category_ids);
        if !validation.valid {
            tracing::warn!(plan_id, errors = ?validation.errors, "rejected submission");
            return Ok(ReviewSubmission::Rejected { validation });
        }

        let existing = self
            .list_workpapers(&WorkpaperFilter {
                audit_plan_id: Some(plan_id.to_string()),
                limit: Some(u32::MAX),
                ..Default::default()
            })
            .await?;

        let (kept, retired) = partition_by_selection(&plan, existing)?;

        let now = Utc::now();
        let new_workpapers = self.build_workpapers(&plan, &kept, now).await?;
        let entries = self
            .submission_entries(&plan, &new_workpapers, &retired, now)
            .await?;

        let tx = self.db().conn().transaction().await?;
        match write_submission(&tx, plan_id, &new_workpapers, &retired, &entries, now).await {
            Ok(()) => tx.commit().await?,
            Err(error) => {
                tracing::warn!(plan_id, %error, "submission failed, rolling back");
                tx.rollback().await?;
                return Err(error);
            }
        }

        tracing::info!(
            plan_id,
            generated = new_workpapers.len(),
            retired = retired.len(),
            "audit plan submitted for review"
        );

        let mut workpapers = kept;
        workpapers.extend(new_workpapers);
        Ok(ReviewSubmission::Submitted {
            plan: AuditPlan {
                status: AuditPlanStatus::UnderReview,
                updated_at: now,
                ..plan
            },
            workpapers,
        })
    }

    /// Draft workpapers for selected categories that have none yet, in
    /// template order.
    async fn build_workpapers(
        &self,
        plan: &AuditPlan,
        existing: &[Workpaper],
        now: DateTime<Utc>,
    ) -> Result<Vec<Workpaper>, DatabaseError> {
        let covered: HashSet<&str> = existing.iter().map(|w| w.category_id.as_str()).collect();
        let selected: HashSet<&str> = plan
            .selected_category_ids
            .iter()
            .map(String::as_str)
            .collect();

        let mut workpapers = Vec::new();
        for category in self.templates().get_template_categories(&plan.template_id) {
            if !selected.contains(category.id.as_str()) || covered.contains(category.id.as_str()) {
                continue;
            }
            workpapers.push(Workpaper {
                id: self.db().generate_id(PREFIX_WORKPAPER).await?,
                audit_plan_id: plan.id.clone(),
                template_id: plan.template_id.clone(),
                category_id: category.id.clone(),
                title: category.display_name.clone(),
                clauses: category.clauses.clone(),
                objectives: category.objectives.clone(),
                scope: category.scope.clone(),
                test_procedures: category.audit_procedure.clone(),
                test_results: None,
                test_result: None,
                tick_marks: Vec::new(),
                status: WorkpaperStatus::Draft,
                prepared_by: None,
                prepared_date: None,
                created_at: now,
                updated_at: now,
            });
        }
        Ok(workpapers)
    }

    async fn submission_entries(
        &self,
        plan: &AuditPlan,
        workpapers: &[Workpaper],
        retired: &[Workpaper],
        now: DateTime<Utc>,
    ) -> Result<Vec<AuditEntry>, DatabaseError> {
        let mut entries = Vec::with_capacity(workpapers.len() + retired.len() + 2);
        for wp in retired {
            entries.push(
                self.audit_entry(
                    EntityType::Workpaper,
                    &wp.id,
                    AuditAction::Deleted,
                    Some(serde_json::json!({
                        "category_id": wp.category_id,
                        "reason": "category deselected",
                    })),
                    now,
                )
                .await?,
            );
        }
        for wp in workpapers {
            entries.push(
                self.audit_entry(
                    EntityType::Workpaper,
                    &wp.id,
                    AuditAction::Created,
                    Some(serde_json::to_value(wp)?),
                    now,
                )
                .await?,
            );
        }

        let status = StatusChangedDetail {
            from: AuditPlanStatus::Draft.as_str().to_string(),
            to: AuditPlanStatus::UnderReview.as_str().to_string(),
            reason: None,
        };
        entries.push(
            self.audit_entry(
                EntityType::AuditPlan,
                &plan.id,
                AuditAction::StatusChanged,
                Some(serde_json::to_value(&status)?),
                now,
            )
            .await?,
        );

        let submitted = SubmittedDetail {
            template_id: plan.template_id.clone(),
            workpaper_ids: workpapers.iter().map(|w| w.id.clone()).collect(),
        };
        entries.push(
            self.audit_entry(
                EntityType::AuditPlan,
                &plan.id,
                AuditAction::Submitted,
                Some(serde_json::to_value(&submitted)?),
                now,
            )
            .await?,
        );
        Ok(entries)
    }
}

/// Split a plan's workpapers into those still selected and those whose
/// category was deselected. Reviewed workpapers are never retired.
fn partition_by_selection(
    plan: &AuditPlan,
    existing: Vec<Workpaper>,
) -> Result<(Vec<Workpaper>, Vec<Workpaper>), DatabaseError> {
    let (kept, retired): (Vec<_>, Vec<_>) = existing
        .into_iter()
        .partition(|wp| plan.selected_category_ids.contains(&wp.category_id));

    if let Some(reviewed) = retired.iter().find(|wp| wp.status == WorkpaperStatus::Reviewed) {
        return Err(DatabaseError::InvalidState(format!(
            "Workpaper {} for deselected category {} has been reviewed",
            reviewed.id, reviewed.category_id
        )));
    }
    Ok((kept, retired))
}

async fn write_submission(
    conn: &libsql::Connection,
    plan_id: &str,
    workpapers: &[Workpaper],
    retired: &[Workpaper],
    entries: &[AuditEntry],
    now: DateTime<Utc>,
) -> Result<(), DatabaseError> {
    for wp in retired {
        conn.execute("DELETE FROM workpapers WHERE id = ?1", [wp.id.as_str()])
            .await?;
    }
    for wp in workpapers {
        insert_workpaper(conn, wp).await?;
    }
    conn.execute(
        "UPDATE audit_plans SET status = ?1, updated_at = ?2 WHERE id = ?3",
        libsql::params![
            AuditPlanStatus::UnderReview.as_str(),
            now.to_rfc3339(),
            plan_id
        ],
    )
    .await?;
    for entry in entries {
        insert_audit(conn, entry).await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repos::audit::AuditFilter;
    use crate::test_support::helpers::{create_test_plan, submitted_workpapers, test_service};
    use grc_core::enums::TestResult;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn submit_generates_one_workpaper_per_category() {
        let svc = test_service().await;
        let plan = create_test_plan(&svc).await;

        let submission = svc.submit_for_review(&plan.id).await.unwrap();
        let ReviewSubmission::Submitted { plan: submitted, workpapers } = submission else {
            panic!("expected submission to succeed");
        };

        assert_eq!(submitted.status, AuditPlanStatus::UnderReview);
        let categories: Vec<String> = workpapers.iter().map(|w| w.category_id.clone()).collect();
        assert_eq!(categories, plan.selected_category_ids);

        let ctx = &workpapers[0];
        let template_category = svc
            .templates()
            .get_category(&plan.template_id, "ctx-4")
            .unwrap();
        assert_eq!(ctx.objectives, template_category.objectives);
        assert_eq!(ctx.scope, template_category.scope);
        assert_eq!(ctx.test_procedures, template_category.audit_procedure);
        assert_eq!(ctx.clauses, template_category.clauses);
        assert_eq!(ctx.status, WorkpaperStatus::Draft);

        let stored = svc.get_audit_plan(&plan.id).await.unwrap();
        assert_eq!(stored.status, AuditPlanStatus::UnderReview);

        let trail = svc
            .query_audit(&AuditFilter {
                action: Some(AuditAction::Submitted),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(trail.len(), 1);
        let detail: SubmittedDetail =
            serde_json::from_value(trail[0].detail.clone().unwrap()).unwrap();
        assert_eq!(detail.workpaper_ids.len(), workpapers.len());
    }

    #[tokio::test]
    async fn empty_selection_is_rejected_without_changes() {
        let svc = test_service().await;
        let plan = create_test_plan(&svc).await;
        svc.set_plan_selection(&plan.id, &[]).await.unwrap();

        let submission = svc.submit_for_review(&plan.id).await.unwrap();
        let ReviewSubmission::Rejected { validation } = submission else {
            panic!("expected rejection");
        };
        assert_eq!(
            validation.errors,
            vec![
                "At least one category must be selected".to_string(),
                "Required categories must be selected: Context of the Organization".to_string(),
            ]
        );
        assert_eq!(
            svc.get_audit_plan(&plan.id).await.unwrap().status,
            AuditPlanStatus::Draft
        );
    }

    #[tokio::test]
    async fn missing_required_category_is_rejected() {
        let svc = test_service().await;
        let plan = create_test_plan(&svc).await;
        svc.set_plan_selection(&plan.id, &["planning-6".to_string()])
            .await
            .unwrap();

        let submission = svc.submit_for_review(&plan.id).await.unwrap();
        assert!(!submission.is_submitted());
        if let ReviewSubmission::Rejected { validation } = submission {
            assert!(
                validation
                    .errors
                    .iter()
                    .any(|e| e.starts_with("Required categories must be selected:"))
            );
        }

        let workpapers = svc
            .list_workpapers(&WorkpaperFilter {
                audit_plan_id: Some(plan.id.clone()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert!(workpapers.is_empty());
    }

    #[tokio::test]
    async fn only_drafts_can_be_submitted() {
        let svc = test_service().await;
        let (plan_id, _) = submitted_workpapers(&svc).await;
        let again = svc.submit_for_review(&plan_id).await;
        assert!(matches!(again, Err(DatabaseError::InvalidState(_))));

        let missing = svc.submit_for_review("pln-00000000").await;
        assert!(matches!(missing, Err(DatabaseError::NoResult)));
    }

    #[tokio::test]
    async fn failure_inside_transaction_rolls_back() {
        let svc = test_service().await;
        let plan = create_test_plan(&svc).await;
        svc.db()
            .conn()
            .execute_batch(
                "CREATE TRIGGER reject_support BEFORE INSERT ON workpapers
                 WHEN NEW.category_id = 'support-7'
                 BEGIN SELECT RAISE(ABORT, 'support workpaper rejected'); END;",
            )
            .await
            .unwrap();

        let result = svc.submit_for_review(&plan.id).await;
        assert!(result.is_err());

        assert_eq!(
            svc.get_audit_plan(&plan.id).await.unwrap().status,
            AuditPlanStatus::Draft
        );
        let workpapers = svc
            .list_workpapers(&WorkpaperFilter {
                audit_plan_id: Some(plan.id.clone()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert!(workpapers.is_empty());
        let submitted = svc
            .query_audit(&AuditFilter {
                action: Some(AuditAction::Submitted),
                ..Default::default()
            })
            .await
            .unwrap();
        assert!(submitted.is_empty());
    }

    #[tokio::test]
    async fn resubmission_keeps_existing_workpapers() {
        let svc = test_service().await;
        let (plan_id, first) = submitted_workpapers(&svc).await;

        svc.transition_audit_plan(&plan_id, AuditPlanStatus::Draft)
            .await
            .unwrap();
        svc.apply_selector_action(
            &plan_id,
            &grc_core::selection::SelectorAction::Toggle("tech-controls-a8".into()),
        )
        .await
        .unwrap();

        let ReviewSubmission::Submitted { workpapers, .. } =
            svc.submit_for_review(&plan_id).await.unwrap()
        else {
            panic!("expected resubmission to succeed");
        };
        assert_eq!(workpapers.len(), first.len() + 1);
        assert_eq!(workpapers[..first.len()], first[..]);
        assert_eq!(
            workpapers.last().map(|w| w.category_id.as_str()),
            Some("tech-controls-a8")
        );
    }

    #[tokio::test]
    async fn resubmission_drops_workpapers_of_deselected_categories() {
        let svc = test_service().await;
        let (plan_id, first) = submitted_workpapers(&svc).await;
        let support = first
            .iter()
            .find(|w| w.category_id == "support-7")
            .unwrap()
            .clone();

        svc.transition_audit_plan(&plan_id, AuditPlanStatus::Draft)
            .await
            .unwrap();
        let plan = svc
            .apply_selector_action(
                &plan_id,
                &grc_core::selection::SelectorAction::Toggle("support-7".into()),
            )
            .await
            .unwrap();

        let ReviewSubmission::Submitted { workpapers, .. } =
            svc.submit_for_review(&plan_id).await.unwrap()
        else {
            panic!("expected resubmission to succeed");
        };
        let categories: Vec<String> = workpapers.iter().map(|w| w.category_id.clone()).collect();
        assert_eq!(categories, plan.selected_category_ids);
        assert_eq!(workpapers.len(), first.len() - 1);

        assert!(matches!(
            svc.get_workpaper(&support.id).await,
            Err(DatabaseError::NoResult)
        ));
        let stored = svc
            .list_workpapers(&WorkpaperFilter {
                audit_plan_id: Some(plan_id.clone()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(stored.len(), workpapers.len());

        let deleted = svc
            .query_audit(&AuditFilter {
                entity_id: Some(support.id.clone()),
                action: Some(AuditAction::Deleted),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(deleted.len(), 1);
    }

    #[tokio::test]
    async fn reviewed_workpaper_blocks_deselection_on_resubmit() {
        let svc = test_service().await;
        let (plan_id, first) = submitted_workpapers(&svc).await;
        let support = first.iter().find(|w| w.category_id == "support-7").unwrap();
        svc.record_test_result(&support.id, TestResult::Conformity, None)
            .await
            .unwrap();
        svc.transition_workpaper(&support.id, WorkpaperStatus::Reviewed)
            .await
            .unwrap();

        svc.transition_audit_plan(&plan_id, AuditPlanStatus::Draft)
            .await
            .unwrap();
        svc.apply_selector_action(
            &plan_id,
            &grc_core::selection::SelectorAction::Toggle("support-7".into()),
        )
        .await
        .unwrap();

        let result = svc.submit_for_review(&plan_id).await;
        assert!(matches!(result, Err(DatabaseError::InvalidState(_))));
        assert_eq!(
            svc.get_audit_plan(&plan_id).await.unwrap().status,
            AuditPlanStatus::Draft
        );
        assert_eq!(
            svc.get_workpaper(&support.id).await.unwrap().status,
            WorkpaperStatus::Reviewed
        );
    }
}
