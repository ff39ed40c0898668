//! Finding repository: CRUD, search, status transitions.

use chrono::{NaiveDate, Utc};

use grc_core::audit_detail::StatusChangedDetail;
use grc_core::entities::{Finding, Workpaper};
use grc_core::enums::{AuditAction, EntityType, FindingStatus, Severity};
use grc_core::ids::{PREFIX_FINDING, finding_reference_code};

use crate::error::DatabaseError;
use crate::helpers::{
    WhereClause, contains_pattern, format_date, get_opt_string, parse_datetime, parse_enum,
    parse_optional_date,
};
use crate::service::GrcService;
use crate::updates::SetClause;
use crate::updates::finding::FindingUpdate;

const SELECT_COLS: &str = "id, reference_code, audit_plan_id, workpaper_id, clause, title, \
     description, severity, status, due_date, created_at, updated_at";

fn row_to_finding(row: &libsql::Row) -> Result<Finding, DatabaseError> {
    Ok(Finding {
        id: row.get(0)?,
        reference_code: row.get(1)?,
        audit_plan_id: get_opt_string(row, 2)?,
        workpaper_id: get_opt_string(row, 3)?,
        clause: row.get(4)?,
        title: row.get(5)?,
        description: get_opt_string(row, 6)?,
        severity: parse_enum(&row.get::<String>(7)?)?,
        status: parse_enum(&row.get::<String>(8)?)?,
        due_date: parse_optional_date(get_opt_string(row, 9)?.as_deref())?,
        created_at: parse_datetime(&row.get::<String>(10)?)?,
        updated_at: parse_datetime(&row.get::<String>(11)?)?,
    })
}

/// Input for [`GrcService::create_finding`].
#[derive(Debug, Clone)]
pub struct NewFinding {
    pub clause: String,
    pub title: String,
    pub description: Option<String>,
    pub severity: Severity,
    pub audit_plan_id: Option<String>,
    pub workpaper_id: Option<String>,
    pub due_date: Option<NaiveDate>,
}

impl NewFinding {
    #[must_use]
    pub fn new(clause: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            clause: clause.into(),
            title: title.into(),
            description: None,
            severity: Severity::Medium,
            audit_plan_id: None,
            workpaper_id: None,
            due_date: None,
        }
    }
}

/// Filter criteria for listing findings.
#[derive(Debug, Default)]
pub struct FindingFilter {
    pub status: Option<FindingStatus>,
    pub severity: Option<Severity>,
    pub audit_plan_id: Option<String>,
    pub workpaper_id: Option<String>,
    pub limit: Option<u32>,
}

/// A finding's workpaper must come from the finding's plan.
fn check_workpaper_plan(plan_id: &str, wp: &Workpaper) -> Result<(), DatabaseError> {
    if wp.audit_plan_id == plan_id {
        return Ok(());
    }
    Err(DatabaseError::Validation(format!(
        "Workpaper {} belongs to audit plan {}, not {plan_id}",
        wp.id, wp.audit_plan_id
    )))
}

impl GrcService {
    /// Raise a finding against a catalog clause.
    ///
    /// Linking a workpaper without a plan links the workpaper's plan too.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::Validation` when the clause is not in the
    /// catalog or the workpaper belongs to a different plan, and
    /// `DatabaseError::NoResult` when a linked plan or workpaper does not
    /// exist.
    pub async fn create_finding(&self, new: NewFinding) -> Result<Finding, DatabaseError> {
        self.check_clause(&new.clause)?;

        let mut audit_plan_id = new.audit_plan_id;
        if let Some(ref workpaper_id) = new.workpaper_id {
            let wp = self.get_workpaper(workpaper_id).await?;
            match audit_plan_id.as_deref() {
                Some(plan_id) => check_workpaper_plan(plan_id, &wp)?,
                None => audit_plan_id = Some(wp.audit_plan_id),
            }
        }
        if let Some(ref plan_id) = audit_plan_id {
            self.get_audit_plan(plan_id).await?;
        }

        let now = Utc::now();
        let id = self.db().generate_id(PREFIX_FINDING).await?;
        let reference_code = self.next_reference_code().await?;

        self.db()
            .conn()
            .execute(
                &format!(
                    "INSERT INTO findings ({SELECT_COLS})
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)"
                ),
                libsql::params![
                    id.as_str(),
                    reference_code.as_str(),
                    audit_plan_id.as_deref(),
                    new.workpaper_id.as_deref(),
                    new.clause.as_str(),
                    new.title.as_str(),
                    new.description.as_deref(),
                    new.severity.as_str(),
                    FindingStatus::Open.as_str(),
                    format_date(new.due_date),
                    now.to_rfc3339(),
                    now.to_rfc3339()
                ],
            )
            .await?;

        let finding = Finding {
            id: id.clone(),
            reference_code,
            audit_plan_id,
            workpaper_id: new.workpaper_id,
            clause: new.clause,
            title: new.title,
            description: new.description,
            severity: new.severity,
            status: FindingStatus::Open,
            due_date: new.due_date,
            created_at: now,
            updated_at: now,
        };

        self.record_audit(
            EntityType::Finding,
            &id,
            AuditAction::Created,
            Some(serde_json::to_value(&finding)?),
            now,
        )
        .await?;

        tracing::debug!(finding_id = %id, reference = %finding.reference_code, "created finding");
        Ok(finding)
    }

    /// Fetch a finding by ID or by reference code (`F-001`).
    pub async fn get_finding(&self, id: &str) -> Result<Finding, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(
                &format!("SELECT {SELECT_COLS} FROM findings WHERE id = ?1 OR reference_code = ?1"),
                [id],
            )
            .await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        row_to_finding(&row)
    }

    pub async fn list_findings(
        &self,
        filter: &FindingFilter,
    ) -> Result<Vec<Finding>, DatabaseError> {
        let mut clause = WhereClause::default();
        clause
            .eq("status", filter.status.map(FindingStatus::as_str))
            .eq("severity", filter.severity.map(Severity::as_str))
            .eq("audit_plan_id", filter.audit_plan_id.clone())
            .eq("workpaper_id", filter.workpaper_id.clone());
        let (where_clause, params) = clause.finish();
        let limit = filter.limit.unwrap_or(100);

        self.query_findings(
            &format!(
                "SELECT {SELECT_COLS} FROM findings {where_clause}
                 ORDER BY CAST(substr(reference_code, 3) AS INTEGER) LIMIT {limit}"
            ),
            params,
        )
        .await
    }

    /// Case-insensitive substring search over title, description, clause,
    /// and reference code. A blank term lists everything.
    pub async fn search_findings(
        &self,
        term: &str,
        limit: u32,
    ) -> Result<Vec<Finding>, DatabaseError> {
        let term = term.trim();
        if term.is_empty() {
            return self
                .list_findings(&FindingFilter {
                    limit: Some(limit),
                    ..Default::default()
                })
                .await;
        }

        let pattern = contains_pattern(&term.to_lowercase());
        self.query_findings(
            &format!(
                "SELECT {SELECT_COLS} FROM findings
                 WHERE lower(title) LIKE ?1 ESCAPE '\\'
                    OR lower(coalesce(description, '')) LIKE ?1 ESCAPE '\\'
                    OR clause LIKE ?1 ESCAPE '\\'
                    OR lower(reference_code) LIKE ?1 ESCAPE '\\'
                 ORDER BY CAST(substr(reference_code, 3) AS INTEGER) LIMIT {limit}"
            ),
            vec![pattern.into()],
        )
        .await
    }

    pub async fn update_finding(
        &self,
        finding_id: &str,
        update: FindingUpdate,
    ) -> Result<Finding, DatabaseError> {
        let current = self.get_finding(finding_id).await?;
        if current.status == FindingStatus::Closed {
            return Err(DatabaseError::InvalidState(format!(
                "Finding {} is closed and cannot be edited",
                current.reference_code
            )));
        }

        let mut set = SetClause::default();
        if let Some(ref title) = update.title {
            set.push("title", title.clone());
        }
        if let Some(ref description) = update.description {
            set.push_opt("description", description.clone());
        }
        if let Some(ref clause) = update.clause {
            self.check_clause(clause)?;
            set.push("clause", clause.clone());
        }
        if let Some(severity) = update.severity {
            set.push("severity", severity.as_str());
        }
        if let Some(due_date) = update.due_date {
            set.push_opt("due_date", format_date(due_date));
        }
        if let Some(ref workpaper_id) = update.workpaper_id {
            if let Some(ref wp_id) = *workpaper_id {
                let wp = self.get_workpaper(wp_id).await?;
                match current.audit_plan_id.as_deref() {
                    Some(plan_id) => check_workpaper_plan(plan_id, &wp)?,
                    None => set.push("audit_plan_id", wp.audit_plan_id),
                }
            }
            set.push_opt("workpaper_id", workpaper_id.clone());
        }

        if set.is_empty() {
            return Ok(current);
        }

        let now = Utc::now();
        set.push("updated_at", now.to_rfc3339());
        let (sql, params) = set.into_update("findings", &current.id);
        self.db()
            .conn()
            .execute(&sql, libsql::params_from_iter(params))
            .await?;

        let updated = self.get_finding(&current.id).await?;
        self.record_audit(
            EntityType::Finding,
            &current.id,
            AuditAction::Updated,
            Some(serde_json::to_value(&update)?),
            now,
        )
        .await?;
        Ok(updated)
    }

    /// Move a finding along its status machine. Closing requires `resolved`.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::InvalidState` for a disallowed transition.
    pub async fn transition_finding(
        &self,
        finding_id: &str,
        new_status: FindingStatus,
    ) -> Result<Finding, DatabaseError> {
        let current = self.get_finding(finding_id).await?;

        if !current.status.can_transition_to(new_status) {
            return Err(DatabaseError::InvalidState(format!(
                "Cannot transition finding {} from {} to {}",
                current.reference_code, current.status, new_status
            )));
        }

        let now = Utc::now();
        self.db()
            .conn()
            .execute(
                "UPDATE findings SET status = ?1, updated_at = ?2 WHERE id = ?3",
                libsql::params![new_status.as_str(), now.to_rfc3339(), current.id.as_str()],
            )
            .await?;

        let detail = StatusChangedDetail {
            from: current.status.as_str().to_string(),
            to: new_status.as_str().to_string(),
            reason: None,
        };
        self.record_audit(
            EntityType::Finding,
            &current.id,
            AuditAction::StatusChanged,
            Some(serde_json::to_value(&detail)?),
            now,
        )
        .await?;

        Ok(Finding {
            status: new_status,
            updated_at: now,
            ..current
        })
    }

    /// Delete an open finding.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::InvalidState` once work on the finding started.
    pub async fn delete_finding(&self, finding_id: &str) -> Result<(), DatabaseError> {
        let finding = self.get_finding(finding_id).await?;
        if finding.status != FindingStatus::Open {
            return Err(DatabaseError::InvalidState(format!(
                "Cannot delete finding {} in status {}",
                finding.reference_code, finding.status
            )));
        }

        let now = Utc::now();
        self.db()
            .conn()
            .execute("DELETE FROM findings WHERE id = ?1", [finding.id.as_str()])
            .await?;
        self.record_audit(EntityType::Finding, &finding.id, AuditAction::Deleted, None, now)
            .await?;
        Ok(())
    }

    fn check_clause(&self, clause: &str) -> Result<(), DatabaseError> {
        if self.clauses().contains_number(clause) {
            Ok(())
        } else {
            Err(DatabaseError::Validation(format!(
                "Clause '{clause}' is not in the ISO 27001:2022 catalog"
            )))
        }
    }

    async fn next_reference_code(&self) -> Result<String, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(
                "SELECT COALESCE(MAX(CAST(substr(reference_code, 3) AS INTEGER)), 0) FROM findings",
                (),
            )
            .await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        let max: i64 = row.get(0)?;
        let next = u32::try_from(max + 1)
            .map_err(|_| DatabaseError::Query(format!("finding sequence overflow at {max}")))?;
        Ok(finding_reference_code(next))
    }

    async fn query_findings(
        &self,
        sql: &str,
        params: Vec<libsql::Value>,
    ) -> Result<Vec<Finding>, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(sql, libsql::params_from_iter(params))
            .await?;
        let mut findings = Vec::new();
        while let Some(row) = rows.next().await? {
            findings.push(row_to_finding(&row)?);
        }
        Ok(findings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::helpers::{create_test_plan, submitted_workpapers, test_service};
    use crate::updates::finding::FindingUpdateBuilder;
    use pretty_assertions::assert_eq;

    fn access_review_gap() -> NewFinding {
        NewFinding {
            description: Some("Quarterly access reviews were skipped in Q2".into()),
            severity: Severity::High,
            ..NewFinding::new("A.5.18", "Access rights not reviewed")
        }
    }

    #[tokio::test]
    async fn create_assigns_sequential_reference_codes() {
        let svc = test_service().await;
        let first = svc.create_finding(access_review_gap()).await.unwrap();
        let second = svc
            .create_finding(NewFinding::new("6.1", "Risk criteria undefined"))
            .await
            .unwrap();

        assert_eq!(first.reference_code, "F-001");
        assert_eq!(second.reference_code, "F-002");
        assert_eq!(first.status, FindingStatus::Open);
        assert_eq!(second.severity, Severity::Medium);

        let fetched = svc.get_finding("F-001").await.unwrap();
        assert_eq!(fetched, first);
    }

    #[tokio::test]
    async fn unknown_clause_is_rejected() {
        let svc = test_service().await;
        let result = svc.create_finding(NewFinding::new("A.9.9", "Bogus")).await;
        assert!(matches!(result, Err(DatabaseError::Validation(_))));
    }

    #[tokio::test]
    async fn workpaper_link_inherits_plan() {
        let svc = test_service().await;
        let (plan_id, workpapers) = submitted_workpapers(&svc).await;

        let finding = svc
            .create_finding(NewFinding {
                workpaper_id: Some(workpapers[0].id.clone()),
                ..NewFinding::new("4.3", "ISMS scope excludes cloud tenancy")
            })
            .await
            .unwrap();
        assert_eq!(finding.audit_plan_id.as_deref(), Some(plan_id.as_str()));

        let by_plan = svc
            .list_findings(&FindingFilter {
                audit_plan_id: Some(plan_id),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(by_plan.len(), 1);
    }

    #[tokio::test]
    async fn missing_plan_is_rejected() {
        let svc = test_service().await;
        let result = svc
            .create_finding(NewFinding {
                audit_plan_id: Some("pln-00000000".into()),
                ..NewFinding::new("4.1", "Orphan")
            })
            .await;
        assert!(matches!(result, Err(DatabaseError::NoResult)));
    }

    #[tokio::test]
    async fn list_filters_by_status_and_severity() {
        let svc = test_service().await;
        let high = svc.create_finding(access_review_gap()).await.unwrap();
        svc.create_finding(NewFinding::new("7.2", "Training records incomplete"))
            .await
            .unwrap();
        svc.transition_finding(&high.id, FindingStatus::InProgress)
            .await
            .unwrap();

        let in_progress = svc
            .list_findings(&FindingFilter {
                status: Some(FindingStatus::InProgress),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(in_progress.len(), 1);
        assert_eq!(in_progress[0].id, high.id);

        let medium = svc
            .list_findings(&FindingFilter {
                severity: Some(Severity::Medium),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(medium.len(), 1);
        assert_eq!(medium[0].clause, "7.2");
    }

    #[tokio::test]
    async fn search_matches_text_and_clause() {
        let svc = test_service().await;
        svc.create_finding(access_review_gap()).await.unwrap();
        svc.create_finding(NewFinding::new("7.2", "Training records incomplete"))
            .await
            .unwrap();

        assert_eq!(svc.search_findings("ACCESS", 20).await.unwrap().len(), 1);
        assert_eq!(svc.search_findings("skipped", 20).await.unwrap().len(), 1);
        assert_eq!(svc.search_findings("7.2", 20).await.unwrap().len(), 1);
        assert_eq!(svc.search_findings("f-00", 20).await.unwrap().len(), 2);
        assert_eq!(svc.search_findings("  ", 20).await.unwrap().len(), 2);
        assert!(svc.search_findings("firewall", 20).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn search_treats_wildcards_literally() {
        let svc = test_service().await;
        svc.create_finding(NewFinding::new("8.1", "Only 80% of servers patched"))
            .await
            .unwrap();
        svc.create_finding(NewFinding::new("7.5", "Retention_policy document missing"))
            .await
            .unwrap();
        svc.create_finding(NewFinding::new("7.2", "Training records incomplete"))
            .await
            .unwrap();

        let percent = svc.search_findings("80%", 20).await.unwrap();
        assert_eq!(percent.len(), 1);
        assert_eq!(svc.search_findings("%", 20).await.unwrap().len(), 1);
        assert_eq!(svc.search_findings("_", 20).await.unwrap().len(), 1);
        assert!(svc.search_findings("records_incomplete", 20).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn workpaper_from_another_plan_is_rejected() {
        let svc = test_service().await;
        let (plan_a, _) = submitted_workpapers(&svc).await;
        let (_, other_workpapers) = submitted_workpapers(&svc).await;
        let foreign = other_workpapers[0].id.clone();

        let created = svc
            .create_finding(NewFinding {
                audit_plan_id: Some(plan_a.clone()),
                workpaper_id: Some(foreign.clone()),
                ..NewFinding::new("4.3", "Scope mismatch")
            })
            .await;
        assert!(matches!(created, Err(DatabaseError::Validation(_))));

        let finding = svc
            .create_finding(NewFinding {
                audit_plan_id: Some(plan_a.clone()),
                ..NewFinding::new("4.3", "Scope mismatch")
            })
            .await
            .unwrap();
        let relink = FindingUpdateBuilder::new()
            .workpaper_id(Some(foreign))
            .build();
        assert!(matches!(
            svc.update_finding(&finding.id, relink).await,
            Err(DatabaseError::Validation(_))
        ));
        assert_eq!(svc.get_finding(&finding.id).await.unwrap().workpaper_id, None);
    }

    #[tokio::test]
    async fn linking_workpaper_to_planless_finding_adopts_its_plan() {
        let svc = test_service().await;
        let (plan_id, workpapers) = submitted_workpapers(&svc).await;
        let finding = svc
            .create_finding(NewFinding::new("6.1", "Risk criteria undefined"))
            .await
            .unwrap();
        assert_eq!(finding.audit_plan_id, None);

        let link = FindingUpdateBuilder::new()
            .workpaper_id(Some(workpapers[0].id.clone()))
            .build();
        let linked = svc.update_finding(&finding.id, link).await.unwrap();
        assert_eq!(linked.audit_plan_id.as_deref(), Some(plan_id.as_str()));
        assert_eq!(linked.workpaper_id.as_deref(), Some(workpapers[0].id.as_str()));
    }

    #[tokio::test]
    async fn closing_requires_resolution() {
        let svc = test_service().await;
        let finding = svc.create_finding(access_review_gap()).await.unwrap();

        let early = svc.transition_finding(&finding.id, FindingStatus::Closed).await;
        assert!(matches!(early, Err(DatabaseError::InvalidState(_))));

        svc.transition_finding(&finding.id, FindingStatus::InProgress)
            .await
            .unwrap();
        svc.transition_finding(&finding.id, FindingStatus::Resolved)
            .await
            .unwrap();
        let reopened = svc
            .transition_finding(&finding.id, FindingStatus::InProgress)
            .await
            .unwrap();
        assert_eq!(reopened.status, FindingStatus::InProgress);

        svc.transition_finding(&finding.id, FindingStatus::Resolved)
            .await
            .unwrap();
        let closed = svc
            .transition_finding(&finding.id, FindingStatus::Closed)
            .await
            .unwrap();
        assert_eq!(closed.status, FindingStatus::Closed);

        let update = FindingUpdateBuilder::new().title("late edit").build();
        assert!(matches!(
            svc.update_finding(&finding.id, update).await,
            Err(DatabaseError::InvalidState(_))
        ));
    }

    #[tokio::test]
    async fn update_changes_only_given_fields() {
        let svc = test_service().await;
        let finding = svc.create_finding(access_review_gap()).await.unwrap();
        let due = NaiveDate::from_ymd_opt(2026, 12, 31).unwrap();

        let update = FindingUpdateBuilder::new()
            .severity(Severity::Critical)
            .due_date(Some(due))
            .description(None)
            .build();
        let updated = svc.update_finding(&finding.id, update).await.unwrap();
        assert_eq!(updated.severity, Severity::Critical);
        assert_eq!(updated.due_date, Some(due));
        assert_eq!(updated.description, None);
        assert_eq!(updated.title, finding.title);

        let bad_clause = FindingUpdateBuilder::new().clause("99").build();
        assert!(matches!(
            svc.update_finding(&finding.id, bad_clause).await,
            Err(DatabaseError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn delete_only_open_findings() {
        let svc = test_service().await;
        let plan = create_test_plan(&svc).await;
        let keep = svc
            .create_finding(NewFinding {
                audit_plan_id: Some(plan.id.clone()),
                ..access_review_gap()
            })
            .await
            .unwrap();
        let drop = svc
            .create_finding(NewFinding::new("5.2", "Policy unsigned"))
            .await
            .unwrap();

        svc.transition_finding(&keep.id, FindingStatus::InProgress)
            .await
            .unwrap();
        assert!(matches!(
            svc.delete_finding(&keep.id).await,
            Err(DatabaseError::InvalidState(_))
        ));

        svc.delete_finding(&drop.id).await.unwrap();
        assert!(matches!(
            svc.get_finding(&drop.id).await,
            Err(DatabaseError::NoResult)
        ));
    }
}
