//! Workpaper repository: reads, edits, test results, tick marks, transitions.
//!
//! Workpapers are only created by `submit_for_review` (see `repos::review`).

use chrono::Utc;

use grc_core::audit_detail::{StatusChangedDetail, TestRecordedDetail, TickMarkedDetail};
use grc_core::entities::{TickMark, Workpaper};
use grc_core::enums::{AuditAction, EntityType, TestResult, WorkpaperStatus};

use crate::error::DatabaseError;
use crate::helpers::{
    WhereClause, format_date, get_opt_string, parse_datetime, parse_enum, parse_json_vec,
    parse_optional_date, to_json_text,
};
use crate::service::GrcService;
use crate::updates::SetClause;
use crate::updates::workpaper::WorkpaperUpdate;

pub(crate) const SELECT_COLS: &str = "id, audit_plan_id, template_id, category_id, title, clauses, \
     objectives, scope, test_procedures, test_results, test_result, tick_marks, status, \
     prepared_by, prepared_date, created_at, updated_at";

fn row_to_workpaper(row: &libsql::Row) -> Result<Workpaper, DatabaseError> {
    Ok(Workpaper {
        id: row.get(0)?,
        audit_plan_id: row.get(1)?,
        template_id: row.get(2)?,
        category_id: row.get(3)?,
        title: row.get(4)?,
        clauses: parse_json_vec(&row.get::<String>(5)?)?,
        objectives: row.get(6)?,
        scope: row.get(7)?,
        test_procedures: row.get(8)?,
        test_results: get_opt_string(row, 9)?,
        test_result: get_opt_string(row, 10)?
            .map(|s| parse_enum(&s))
            .transpose()?,
        tick_marks: parse_json_vec(&row.get::<String>(11)?)?,
        status: parse_enum(&row.get::<String>(12)?)?,
        prepared_by: get_opt_string(row, 13)?,
        prepared_date: parse_optional_date(get_opt_string(row, 14)?.as_deref())?,
        created_at: parse_datetime(&row.get::<String>(15)?)?,
        updated_at: parse_datetime(&row.get::<String>(16)?)?,
    })
}

/// Insert a fully built workpaper on `conn`, which may be a transaction.
pub(crate) async fn insert_workpaper(
    conn: &libsql::Connection,
    wp: &Workpaper,
) -> Result<(), DatabaseError> {
    conn.execute(
        &format!(
            "INSERT INTO workpapers ({SELECT_COLS})
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17)"
        ),
        libsql::params![
            wp.id.as_str(),
            wp.audit_plan_id.as_str(),
            wp.template_id.as_str(),
            wp.category_id.as_str(),
            wp.title.as_str(),
            to_json_text(&wp.clauses)?,
            wp.objectives.as_str(),
            wp.scope.as_str(),
            wp.test_procedures.as_str(),
            wp.test_results.as_deref(),
            wp.test_result.map(TestResult::as_str),
            to_json_text(&wp.tick_marks)?,
            wp.status.as_str(),
            wp.prepared_by.as_deref(),
            format_date(wp.prepared_date),
            wp.created_at.to_rfc3339(),
            wp.updated_at.to_rfc3339()
        ],
    )
    .await?;
    Ok(())
}

/// Filter criteria for listing workpapers.
#[derive(Debug, Default)]
pub struct WorkpaperFilter {
    pub audit_plan_id: Option<String>,
    pub category_id: Option<String>,
    pub status: Option<WorkpaperStatus>,
    pub limit: Option<u32>,
}

impl GrcService {
    pub async fn get_workpaper(&self, id: &str) -> Result<Workpaper, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(
                &format!("SELECT {SELECT_COLS} FROM workpapers WHERE id = ?1"),
                [id],
            )
            .await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        row_to_workpaper(&row)
    }

    /// List workpapers in generation order (template order within a plan).
    pub async fn list_workpapers(
        &self,
        filter: &WorkpaperFilter,
    ) -> Result<Vec<Workpaper>, DatabaseError> {
        let mut clause = WhereClause::default();
        clause
            .eq("audit_plan_id", filter.audit_plan_id.clone())
            .eq("category_id", filter.category_id.clone())
            .eq("status", filter.status.map(WorkpaperStatus::as_str));
        let (where_clause, params) = clause.finish();
        let limit = filter.limit.unwrap_or(100);

        let mut rows = self
            .db()
            .conn()
            .query(
                &format!(
                    "SELECT {SELECT_COLS} FROM workpapers {where_clause}
                     ORDER BY created_at, rowid LIMIT {limit}"
                ),
                libsql::params_from_iter(params),
            )
            .await?;

        let mut workpapers = Vec::new();
        while let Some(row) = rows.next().await? {
            workpapers.push(row_to_workpaper(&row)?);
        }
        Ok(workpapers)
    }

    /// Edit descriptive fields of a workpaper that has not been reviewed.
    pub async fn update_workpaper(
        &self,
        workpaper_id: &str,
        update: WorkpaperUpdate,
    ) -> Result<Workpaper, DatabaseError> {
        let current = self.unlocked_workpaper(workpaper_id).await?;

        let mut set = SetClause::default();
        if let Some(ref title) = update.title {
            set.push("title", title.clone());
        }
        if let Some(ref objectives) = update.objectives {
            set.push("objectives", objectives.clone());
        }
        if let Some(ref scope) = update.scope {
            set.push("scope", scope.clone());
        }
        if let Some(ref test_procedures) = update.test_procedures {
            set.push("test_procedures", test_procedures.clone());
        }

        if set.is_empty() {
            return Ok(current);
        }

        let now = Utc::now();
        set.push("updated_at", now.to_rfc3339());
        let (sql, params) = set.into_update("workpapers", workpaper_id);
        self.db()
            .conn()
            .execute(&sql, libsql::params_from_iter(params))
            .await?;

        let updated = self.get_workpaper(workpaper_id).await?;
        self.record_audit(
            EntityType::Workpaper,
            workpaper_id,
            AuditAction::Updated,
            Some(serde_json::to_value(&update)?),
            now,
        )
        .await?;
        Ok(updated)
    }

    /// Record the outcome of testing and move the workpaper `draft → tested`.
    ///
    /// The configured actor becomes `prepared_by`; today becomes `prepared_date`.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::InvalidState` unless the workpaper is a draft.
    pub async fn record_test_result(
        &self,
        workpaper_id: &str,
        result: TestResult,
        notes: Option<&str>,
    ) -> Result<Workpaper, DatabaseError> {
        let current = self.get_workpaper(workpaper_id).await?;
        if !current.status.can_transition_to(WorkpaperStatus::Tested) {
            return Err(DatabaseError::InvalidState(format!(
                "Cannot record a test result on workpaper {} in status {}",
                workpaper_id, current.status
            )));
        }

        let now = Utc::now();
        let prepared_date = now.date_naive();
        let test_results = notes.map(String::from).or(current.test_results.clone());
        self.db()
            .conn()
            .execute(
                "UPDATE workpapers SET test_result = ?1, test_results = ?2, status = ?3,
                     prepared_by = ?4, prepared_date = ?5, updated_at = ?6
                 WHERE id = ?7",
                libsql::params![
                    result.as_str(),
                    test_results.as_deref(),
                    WorkpaperStatus::Tested.as_str(),
                    self.actor(),
                    format_date(Some(prepared_date)),
                    now.to_rfc3339(),
                    workpaper_id
                ],
            )
            .await?;

        let detail = TestRecordedDetail {
            result,
            prepared_by: self.actor().map(String::from),
        };
        self.record_audit(
            EntityType::Workpaper,
            workpaper_id,
            AuditAction::TestRecorded,
            Some(serde_json::to_value(&detail)?),
            now,
        )
        .await?;

        if result.warrants_finding() {
            tracing::info!(workpaper_id, %result, "test result warrants a finding");
        }

        Ok(Workpaper {
            test_result: Some(result),
            test_results,
            status: WorkpaperStatus::Tested,
            prepared_by: self.actor().map(String::from),
            prepared_date: Some(prepared_date),
            updated_at: now,
            ..current
        })
    }

    /// Attach a tick mark. Codes are `A`–`Z` and unique per workpaper.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::Validation` for a bad or duplicate code and
    /// `DatabaseError::InvalidState` for a reviewed workpaper.
    pub async fn add_tick_mark(
        &self,
        workpaper_id: &str,
        code: char,
        description: &str,
    ) -> Result<Workpaper, DatabaseError> {
        let current = self.unlocked_workpaper(workpaper_id).await?;

        if !TickMark::is_valid_code(code) {
            return Err(DatabaseError::Validation(format!(
                "tick mark code must be a letter A-Z, got '{code}'"
            )));
        }
        if current.tick_mark(code).is_some() {
            return Err(DatabaseError::Validation(format!(
                "tick mark '{code}' already exists on workpaper {workpaper_id}"
            )));
        }

        let mut tick_marks = current.tick_marks.clone();
        tick_marks.push(TickMark {
            code,
            description: description.to_string(),
        });

        let now = Utc::now();
        self.db()
            .conn()
            .execute(
                "UPDATE workpapers SET tick_marks = ?1, updated_at = ?2 WHERE id = ?3",
                libsql::params![to_json_text(&tick_marks)?, now.to_rfc3339(), workpaper_id],
            )
            .await?;

        let detail = TickMarkedDetail {
            code,
            description: description.to_string(),
        };
        self.record_audit(
            EntityType::Workpaper,
            workpaper_id,
            AuditAction::TickMarked,
            Some(serde_json::to_value(&detail)?),
            now,
        )
        .await?;

        Ok(Workpaper {
            tick_marks,
            updated_at: now,
            ..current
        })
    }

    /// Move a workpaper along its status machine.
    ///
    /// `draft → tested` only happens through [`GrcService::record_test_result`].
    /// Returning `tested → draft` clears the recorded result for retesting.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::InvalidState` for a disallowed transition.
    pub async fn transition_workpaper(
        &self,
        workpaper_id: &str,
        new_status: WorkpaperStatus,
    ) -> Result<Workpaper, DatabaseError> {
        let current = self.get_workpaper(workpaper_id).await?;

        if !current.status.can_transition_to(new_status) {
            return Err(DatabaseError::InvalidState(format!(
                "Cannot transition workpaper {} from {} to {}",
                workpaper_id, current.status, new_status
            )));
        }
        if new_status == WorkpaperStatus::Tested {
            return Err(DatabaseError::InvalidState(format!(
                "Workpaper {workpaper_id} moves to tested by recording a test result"
            )));
        }

        let now = Utc::now();
        let test_result = if new_status == WorkpaperStatus::Draft {
            None
        } else {
            current.test_result
        };
        self.db()
            .conn()
            .execute(
                "UPDATE workpapers SET status = ?1, test_result = ?2, updated_at = ?3 WHERE id = ?4",
                libsql::params![
                    new_status.as_str(),
                    test_result.map(TestResult::as_str),
                    now.to_rfc3339(),
                    workpaper_id
                ],
            )
            .await?;

        let detail = StatusChangedDetail {
            from: current.status.as_str().to_string(),
            to: new_status.as_str().to_string(),
            reason: None,
        };
        self.record_audit(
            EntityType::Workpaper,
            workpaper_id,
            AuditAction::StatusChanged,
            Some(serde_json::to_value(&detail)?),
            now,
        )
        .await?;

        Ok(Workpaper {
            status: new_status,
            test_result,
            updated_at: now,
            ..current
        })
    }

    async fn unlocked_workpaper(&self, workpaper_id: &str) -> Result<Workpaper, DatabaseError> {
        let wp = self.get_workpaper(workpaper_id).await?;
        if wp.status == WorkpaperStatus::Reviewed {
            return Err(DatabaseError::InvalidState(format!(
                "Workpaper {workpaper_id} has been reviewed and is read-only"
            )));
        }
        Ok(wp)
    }
}
