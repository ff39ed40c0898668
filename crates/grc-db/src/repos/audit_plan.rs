//! Audit plan repository: CRUD, category selection, status transitions.

use chrono::{NaiveDate, Utc};

use grc_core::audit_detail::{SelectionChangedDetail, StatusChangedDetail};
use grc_core::entities::AuditPlan;
use grc_core::enums::{AuditAction, AuditPlanStatus, EntityType};
use grc_core::ids::PREFIX_AUDIT_PLAN;
use grc_core::selection::{CategorySelector, SelectorAction};

use crate::error::DatabaseError;
use crate::helpers::{
    WhereClause, format_date, get_opt_string, parse_datetime, parse_enum, parse_json_vec,
    parse_optional_date, to_json_text,
};
use crate::service::GrcService;
use crate::updates::SetClause;
use crate::updates::audit_plan::AuditPlanUpdate;

pub(crate) const SELECT_COLS: &str = "id, title, template_id, status, selected_category_ids, \
     lead_auditor, start_date, end_date, created_at, updated_at";

pub(crate) fn row_to_audit_plan(row: &libsql::Row) -> Result<AuditPlan, DatabaseError> {
    Ok(AuditPlan {
        id: row.get(0)?,
        title: row.get(1)?,
        template_id: row.get(2)?,
        status: parse_enum(&row.get::<String>(3)?)?,
        selected_category_ids: parse_json_vec(&row.get::<String>(4)?)?,
        lead_auditor: get_opt_string(row, 5)?,
        start_date: parse_optional_date(get_opt_string(row, 6)?.as_deref())?,
        end_date: parse_optional_date(get_opt_string(row, 7)?.as_deref())?,
        created_at: parse_datetime(&row.get::<String>(8)?)?,
        updated_at: parse_datetime(&row.get::<String>(9)?)?,
    })
}

/// Filter criteria for listing audit plans.
#[derive(Debug, Default)]
pub struct AuditPlanFilter {
    pub status: Option<AuditPlanStatus>,
    pub template_id: Option<String>,
    pub limit: Option<u32>,
}

fn check_period(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Result<(), DatabaseError> {
    match (start, end) {
        (Some(start), Some(end)) if end < start => Err(DatabaseError::Validation(format!(
            "end date {end} is before start date {start}"
        ))),
        _ => Ok(()),
    }
}

impl GrcService {
    /// Create a draft plan. The initial selection is the template's
    /// recommended categories.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::InvalidState` for an unknown template and
    /// `DatabaseError::Validation` when the period is inverted.
    pub async fn create_audit_plan(
        &self,
        title: &str,
        template_id: &str,
        lead_auditor: Option<&str>,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> Result<AuditPlan, DatabaseError> {
        if self.templates().get_template(template_id).is_none() {
            return Err(DatabaseError::InvalidState(format!(
                "Template with ID '{template_id}' not found"
            )));
        }
        check_period(start_date, end_date)?;

        let now = Utc::now();
        let id = self.db().generate_id(PREFIX_AUDIT_PLAN).await?;
        let selected = self.templates().get_recommended_categories(template_id);

        self.db()
            .conn()
            .execute(
                &format!(
                    "INSERT INTO audit_plans ({SELECT_COLS})
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)"
                ),
                libsql::params![
                    id.as_str(),
                    title,
                    template_id,
                    AuditPlanStatus::Draft.as_str(),
                    to_json_text(&selected)?,
                    lead_auditor,
                    format_date(start_date),
                    format_date(end_date),
                    now.to_rfc3339(),
                    now.to_rfc3339()
                ],
            )
            .await?;

        let plan = AuditPlan {
            id: id.clone(),
            title: title.to_string(),
            template_id: template_id.to_string(),
            status: AuditPlanStatus::Draft,
            selected_category_ids: selected,
            lead_auditor: lead_auditor.map(String::from),
            start_date,
            end_date,
            created_at: now,
            updated_at: now,
        };

        self.record_audit(
            EntityType::AuditPlan,
            &id,
            AuditAction::Created,
            Some(serde_json::to_value(&plan)?),
            now,
        )
        .await?;

        tracing::debug!(plan_id = %id, template_id, "created audit plan");
        Ok(plan)
    }

    pub async fn get_audit_plan(&self, id: &str) -> Result<AuditPlan, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(
                &format!("SELECT {SELECT_COLS} FROM audit_plans WHERE id = ?1"),
                [id],
            )
            .await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        row_to_audit_plan(&row)
    }

    pub async fn list_audit_plans(
        &self,
        filter: &AuditPlanFilter,
    ) -> Result<Vec<AuditPlan>, DatabaseError> {
        let mut clause = WhereClause::default();
        clause
            .eq("status", filter.status.map(AuditPlanStatus::as_str))
            .eq("template_id", filter.template_id.clone());
        let (where_clause, params) = clause.finish();
        let limit = filter.limit.unwrap_or(100);

        let mut rows = self
            .db()
            .conn()
            .query(
                &format!(
                    "SELECT {SELECT_COLS} FROM audit_plans {where_clause}
                     ORDER BY created_at DESC LIMIT {limit}"
                ),
                libsql::params_from_iter(params),
            )
            .await?;

        let mut plans = Vec::new();
        while let Some(row) = rows.next().await? {
            plans.push(row_to_audit_plan(&row)?);
        }
        Ok(plans)
    }

    pub async fn update_audit_plan(
        &self,
        plan_id: &str,
        update: AuditPlanUpdate,
    ) -> Result<AuditPlan, DatabaseError> {
        let current = self.get_audit_plan(plan_id).await?;
        check_period(
            update.start_date.unwrap_or(current.start_date),
            update.end_date.unwrap_or(current.end_date),
        )?;

        let mut set = SetClause::default();
        if let Some(ref title) = update.title {
            set.push("title", title.clone());
        }
        if let Some(ref lead_auditor) = update.lead_auditor {
            set.push_opt("lead_auditor", lead_auditor.clone());
        }
        if let Some(start_date) = update.start_date {
            set.push_opt("start_date", format_date(start_date));
        }
        if let Some(end_date) = update.end_date {
            set.push_opt("end_date", format_date(end_date));
        }

        if set.is_empty() {
            return Ok(current);
        }

        let now = Utc::now();
        set.push("updated_at", now.to_rfc3339());
        let (sql, params) = set.into_update("audit_plans", plan_id);
        self.db()
            .conn()
            .execute(&sql, libsql::params_from_iter(params))
            .await?;

        let updated = self.get_audit_plan(plan_id).await?;
        self.record_audit(
            EntityType::AuditPlan,
            plan_id,
            AuditAction::Updated,
            Some(serde_json::to_value(&update)?),
            now,
        )
        .await?;
        Ok(updated)
    }

    /// Delete a draft plan that has never been submitted.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::InvalidState` when the plan is past draft or
    /// already has workpapers from an earlier submission.
    pub async fn delete_audit_plan(&self, plan_id: &str) -> Result<(), DatabaseError> {
        let plan = self.get_audit_plan(plan_id).await?;
        if plan.status != AuditPlanStatus::Draft {
            return Err(DatabaseError::InvalidState(format!(
                "Cannot delete audit plan {plan_id} in status {}",
                plan.status
            )));
        }

        let mut rows = self
            .db()
            .conn()
            .query("SELECT COUNT(*) FROM workpapers WHERE audit_plan_id = ?1", [plan_id])
            .await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        let workpapers: i64 = row.get(0)?;
        if workpapers > 0 {
            return Err(DatabaseError::InvalidState(format!(
                "Cannot delete audit plan {plan_id}: it has {workpapers} workpapers"
            )));
        }

        let now = Utc::now();
        self.db()
            .conn()
            .execute("DELETE FROM audit_plans WHERE id = ?1", [plan_id])
            .await?;
        self.record_audit(EntityType::AuditPlan, plan_id, AuditAction::Deleted, None, now)
            .await?;
        Ok(())
    }

    /// Replace a draft plan's category selection.
    ///
    /// The stored selection follows template order. Required categories are
    /// not enforced here; submission validates them.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::InvalidState` when the plan is not a draft and
    /// `DatabaseError::Validation` when an ID is not a category of the plan's
    /// template.
    pub async fn set_plan_selection(
        &self,
        plan_id: &str,
        category_ids: &[String],
    ) -> Result<AuditPlan, DatabaseError> {
        let plan = self.editable_plan(plan_id).await?;

        let invalid: Vec<&str> = category_ids
            .iter()
            .filter(|id| self.templates().get_category(&plan.template_id, id).is_none())
            .map(String::as_str)
            .collect();
        if !invalid.is_empty() {
            return Err(DatabaseError::Validation(format!(
                "Invalid category IDs: {}",
                invalid.join(", ")
            )));
        }

        let selector = self.selector_for(&plan, category_ids)?;
        self.store_selection(plan, selector.selected_ids()).await
    }

    /// Run one selector transition against a draft plan and persist it.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::InvalidState` when the plan is not a draft.
    pub async fn apply_selector_action(
        &self,
        plan_id: &str,
        action: &SelectorAction,
    ) -> Result<AuditPlan, DatabaseError> {
        let plan = self.editable_plan(plan_id).await?;
        let mut selector = self.selector_for(&plan, &plan.selected_category_ids)?;
        let selection = selector.apply(action);
        tracing::debug!(plan_id, ?action, selected = selection.len(), "applied selector action");
        self.store_selection(plan, selection).await
    }

    /// Move a plan along its status machine.
    ///
    /// `draft → under_review` generates workpapers and therefore only happens
    /// through [`GrcService::submit_for_review`].
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::InvalidState` for a disallowed transition.
    pub async fn transition_audit_plan(
        &self,
        plan_id: &str,
        new_status: AuditPlanStatus,
    ) -> Result<AuditPlan, DatabaseError> {
        let current = self.get_audit_plan(plan_id).await?;

        if !current.status.can_transition_to(new_status) {
            return Err(DatabaseError::InvalidState(format!(
                "Cannot transition audit plan {} from {} to {}",
                plan_id, current.status, new_status
            )));
        }
        if current.status == AuditPlanStatus::Draft && new_status == AuditPlanStatus::UnderReview {
            return Err(DatabaseError::InvalidState(format!(
                "Audit plan {plan_id} must be submitted for review to leave draft"
            )));
        }

        let now = Utc::now();
        self.db()
            .conn()
            .execute(
                "UPDATE audit_plans SET status = ?1, updated_at = ?2 WHERE id = ?3",
                libsql::params![new_status.as_str(), now.to_rfc3339(), plan_id],
            )
            .await?;

        let detail = StatusChangedDetail {
            from: current.status.as_str().to_string(),
            to: new_status.as_str().to_string(),
            reason: None,
        };
        self.record_audit(
            EntityType::AuditPlan,
            plan_id,
            AuditAction::StatusChanged,
            Some(serde_json::to_value(&detail)?),
            now,
        )
        .await?;

        Ok(AuditPlan {
            status: new_status,
            updated_at: now,
            ..current
        })
    }

    async fn editable_plan(&self, plan_id: &str) -> Result<AuditPlan, DatabaseError> {
        let plan = self.get_audit_plan(plan_id).await?;
        if !plan.status.is_editable() {
            return Err(DatabaseError::InvalidState(format!(
                "Audit plan {plan_id} is {}; category selection can only change in draft",
                plan.status
            )));
        }
        Ok(plan)
    }

    fn selector_for<'a>(
        &'a self,
        plan: &AuditPlan,
        initial: &[String],
    ) -> Result<CategorySelector<'a>, DatabaseError> {
        CategorySelector::new(self.templates(), &plan.template_id, initial).ok_or_else(|| {
            DatabaseError::InvalidState(format!(
                "Audit plan {} references unknown template '{}'",
                plan.id, plan.template_id
            ))
        })
    }

    async fn store_selection(
        &self,
        plan: AuditPlan,
        selection: Vec<String>,
    ) -> Result<AuditPlan, DatabaseError> {
        if selection == plan.selected_category_ids {
            return Ok(plan);
        }

        let now = Utc::now();
        self.db()
            .conn()
            .execute(
                "UPDATE audit_plans SET selected_category_ids = ?1, updated_at = ?2 WHERE id = ?3",
                libsql::params![to_json_text(&selection)?, now.to_rfc3339(), plan.id.as_str()],
            )
            .await?;

        let detail = SelectionChangedDetail {
            before: plan.selected_category_ids.clone(),
            after: selection.clone(),
        };
        self.record_audit(
            EntityType::AuditPlan,
            &plan.id,
            AuditAction::SelectionChanged,
            Some(serde_json::to_value(&detail)?),
            now,
        )
        .await?;

        Ok(AuditPlan {
            selected_category_ids: selection,
            updated_at: now,
            ..plan
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repos::audit::AuditFilter;
    use crate::test_support::helpers::{create_test_plan, submitted_workpapers, test_service};
    use crate::updates::audit_plan::AuditPlanUpdateBuilder;
    use pretty_assertions::assert_eq;

    fn strings(raw: &[&str]) -> Vec<String> {
        raw.iter().map(|s| (*s).to_string()).collect()
    }

    #[tokio::test]
    async fn create_plan_starts_with_recommended_selection() {
        let svc = test_service().await;
        let plan = create_test_plan(&svc).await;

        assert!(plan.id.starts_with("pln-"));
        assert_eq!(plan.status, AuditPlanStatus::Draft);
        assert_eq!(
            plan.selected_category_ids,
            svc.templates().get_recommended_categories("iso27001-2022")
        );

        let fetched = svc.get_audit_plan(&plan.id).await.unwrap();
        assert_eq!(fetched.selected_category_ids, plan.selected_category_ids);
        assert_eq!(fetched.title, plan.title);
    }

    #[tokio::test]
    async fn create_plan_unknown_template() {
        let svc = test_service().await;
        let result = svc
            .create_audit_plan("Bad", "nonexistent", None, None, None)
            .await;
        assert!(
            matches!(result, Err(DatabaseError::InvalidState(msg)) if msg.contains("nonexistent"))
        );
    }

    #[tokio::test]
    async fn create_plan_rejects_inverted_period() {
        let svc = test_service().await;
        let result = svc
            .create_audit_plan(
                "Backwards",
                "iso27001-2022",
                None,
                NaiveDate::from_ymd_opt(2026, 5, 1),
                NaiveDate::from_ymd_opt(2026, 4, 1),
            )
            .await;
        assert!(matches!(result, Err(DatabaseError::Validation(_))));
    }

    #[tokio::test]
    async fn update_plan_partial() {
        let svc = test_service().await;
        let plan = create_test_plan(&svc).await;

        let update = AuditPlanUpdateBuilder::new()
            .title("Renamed")
            .lead_auditor(Some("a.smith".into()))
            .start_date(NaiveDate::from_ymd_opt(2026, 3, 1))
            .build();
        let updated = svc.update_audit_plan(&plan.id, update).await.unwrap();
        assert_eq!(updated.title, "Renamed");
        assert_eq!(updated.lead_auditor.as_deref(), Some("a.smith"));
        assert_eq!(updated.start_date, NaiveDate::from_ymd_opt(2026, 3, 1));
    }

    #[tokio::test]
    async fn list_plans_by_status() {
        let svc = test_service().await;
        create_test_plan(&svc).await;
        svc.create_audit_plan("Annex A", "iso27001-2022-annex-a", None, None, None)
            .await
            .unwrap();

        let all = svc.list_audit_plans(&AuditPlanFilter::default()).await.unwrap();
        assert_eq!(all.len(), 2);

        let annex = svc
            .list_audit_plans(&AuditPlanFilter {
                template_id: Some("iso27001-2022-annex-a".into()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(annex.len(), 1);

        let approved = svc
            .list_audit_plans(&AuditPlanFilter {
                status: Some(AuditPlanStatus::Approved),
                ..Default::default()
            })
            .await
            .unwrap();
        assert!(approved.is_empty());
    }

    #[tokio::test]
    async fn set_selection_orders_by_template() {
        let svc = test_service().await;
        let plan = create_test_plan(&svc).await;

        let updated = svc
            .set_plan_selection(&plan.id, &strings(&["tech-controls-a8", "ctx-4"]))
            .await
            .unwrap();
        assert_eq!(updated.selected_category_ids, strings(&["ctx-4", "tech-controls-a8"]));

        let entries = svc
            .query_audit(&AuditFilter {
                entity_id: Some(plan.id.clone()),
                action: Some(AuditAction::SelectionChanged),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(entries.len(), 1);
    }

    #[tokio::test]
    async fn set_selection_rejects_unknown_ids() {
        let svc = test_service().await;
        let plan = create_test_plan(&svc).await;
        let result = svc
            .set_plan_selection(&plan.id, &strings(&["ctx-4", "bogus"]))
            .await;
        assert!(matches!(
            result,
            Err(DatabaseError::Validation(msg)) if msg == "Invalid category IDs: bogus"
        ));
    }

    #[tokio::test]
    async fn selector_actions_persist() {
        let svc = test_service().await;
        let plan = create_test_plan(&svc).await;

        let plan = svc
            .apply_selector_action(&plan.id, &SelectorAction::ToggleSelectAll)
            .await
            .unwrap();
        assert_eq!(plan.selected_category_ids.len(), 11);

        let plan = svc
            .apply_selector_action(&plan.id, &SelectorAction::ToggleSelectAll)
            .await
            .unwrap();
        assert_eq!(plan.selected_category_ids, strings(&["ctx-4"]));

        let plan = svc
            .apply_selector_action(&plan.id, &SelectorAction::Toggle("ctx-4".into()))
            .await
            .unwrap();
        assert_eq!(plan.selected_category_ids, strings(&["ctx-4"]));

        let plan = svc
            .apply_selector_action(&plan.id, &SelectorAction::Toggle("support-7".into()))
            .await
            .unwrap();
        let stored = svc.get_audit_plan(&plan.id).await.unwrap();
        assert_eq!(stored.selected_category_ids, strings(&["ctx-4", "support-7"]));

        let plan = svc
            .apply_selector_action(&plan.id, &SelectorAction::SelectRecommended)
            .await
            .unwrap();
        assert_eq!(plan.selected_category_ids.len(), 7);
    }

    #[tokio::test]
    async fn transition_cannot_skip_submission() {
        let svc = test_service().await;
        let plan = create_test_plan(&svc).await;

        let result = svc
            .transition_audit_plan(&plan.id, AuditPlanStatus::UnderReview)
            .await;
        assert!(matches!(result, Err(DatabaseError::InvalidState(_))));

        let result = svc
            .transition_audit_plan(&plan.id, AuditPlanStatus::Completed)
            .await;
        assert!(matches!(
            result,
            Err(DatabaseError::InvalidState(msg)) if msg.contains("from draft to completed")
        ));
    }

    #[tokio::test]
    async fn delete_draft_plan() {
        let svc = test_service().await;
        let plan = create_test_plan(&svc).await;
        svc.delete_audit_plan(&plan.id).await.unwrap();
        assert!(matches!(svc.get_audit_plan(&plan.id).await, Err(DatabaseError::NoResult)));
    }

    #[tokio::test]
    async fn plan_with_workpapers_cannot_be_deleted() {
        let svc = test_service().await;
        let (plan_id, workpapers) = submitted_workpapers(&svc).await;
        svc.transition_audit_plan(&plan_id, AuditPlanStatus::Draft)
            .await
            .unwrap();

        let result = svc.delete_audit_plan(&plan_id).await;
        assert!(
            matches!(result, Err(DatabaseError::InvalidState(msg)) if msg.contains("workpapers"))
        );
        assert_eq!(
            svc.get_audit_plan(&plan_id).await.unwrap().status,
            AuditPlanStatus::Draft
        );
        svc.get_workpaper(&workpapers[0].id).await.unwrap();
    }

    #[tokio::test]
    async fn missing_plan_is_no_result() {
        let svc = test_service().await;
        assert!(matches!(
            svc.apply_selector_action("pln-00000000", &SelectorAction::SelectRecommended).await,
            Err(DatabaseError::NoResult)
        ));
    }
}
