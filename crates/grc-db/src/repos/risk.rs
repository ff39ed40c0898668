//! Risk register repository: CRUD, transitions, heat map.

use chrono::Utc;

use grc_core::audit_detail::StatusChangedDetail;
use grc_core::entities::Risk;
use grc_core::enums::{AuditAction, EntityType, RiskLevel, RiskStatus};
use grc_core::ids::PREFIX_RISK;
use grc_core::risk::{HeatMap, validate_rating};

use crate::error::DatabaseError;
use crate::helpers::{WhereClause, get_opt_string, parse_datetime, parse_enum};
use crate::service::GrcService;
use crate::updates::SetClause;
use crate::updates::risk::RiskUpdate;

const SELECT_COLS: &str = "id, title, description, category, likelihood, impact, owner, status, \
     created_at, updated_at";

fn get_rating(row: &libsql::Row, idx: i32) -> Result<u8, DatabaseError> {
    let raw: i64 = row.get(idx)?;
    u8::try_from(raw).map_err(|_| DatabaseError::Query(format!("rating out of range: {raw}")))
}

fn row_to_risk(row: &libsql::Row) -> Result<Risk, DatabaseError> {
    Ok(Risk {
        id: row.get(0)?,
        title: row.get(1)?,
        description: get_opt_string(row, 2)?,
        category: get_opt_string(row, 3)?,
        likelihood: get_rating(row, 4)?,
        impact: get_rating(row, 5)?,
        owner: get_opt_string(row, 6)?,
        status: parse_enum(&row.get::<String>(7)?)?,
        created_at: parse_datetime(&row.get::<String>(8)?)?,
        updated_at: parse_datetime(&row.get::<String>(9)?)?,
    })
}

/// Inclusive score bounds for a level.
const fn score_bounds(level: RiskLevel) -> (u8, u8) {
    match level {
        RiskLevel::Low => (1, 4),
        RiskLevel::Medium => (5, 9),
        RiskLevel::High => (10, 16),
        RiskLevel::Critical => (17, 25),
    }
}

/// Input for [`GrcService::create_risk`].
#[derive(Debug, Clone)]
pub struct NewRisk {
    pub title: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub likelihood: u8,
    pub impact: u8,
    pub owner: Option<String>,
}

impl NewRisk {
    #[must_use]
    pub fn new(title: impl Into<String>, likelihood: u8, impact: u8) -> Self {
        Self {
            title: title.into(),
            description: None,
            category: None,
            likelihood,
            impact,
            owner: None,
        }
    }
}

/// Filter criteria for listing risks.
#[derive(Debug, Default)]
pub struct RiskFilter {
    pub status: Option<RiskStatus>,
    pub level: Option<RiskLevel>,
    pub owner: Option<String>,
    pub limit: Option<u32>,
}

impl GrcService {
    /// Register a risk in `identified` status.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::Core` wrapping a validation error when a
    /// rating is outside 1–5.
    pub async fn create_risk(&self, new: NewRisk) -> Result<Risk, DatabaseError> {
        validate_rating("likelihood", new.likelihood)?;
        validate_rating("impact", new.impact)?;

        let now = Utc::now();
        let id = self.db().generate_id(PREFIX_RISK).await?;

        self.db()
            .conn()
            .execute(
                &format!(
                    "INSERT INTO risks ({SELECT_COLS})
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)"
                ),
                libsql::params![
                    id.as_str(),
                    new.title.as_str(),
                    new.description.as_deref(),
                    new.category.as_deref(),
                    i64::from(new.likelihood),
                    i64::from(new.impact),
                    new.owner.as_deref(),
                    RiskStatus::Identified.as_str(),
                    now.to_rfc3339(),
                    now.to_rfc3339()
                ],
            )
            .await?;

        let risk = Risk {
            id: id.clone(),
            title: new.title,
            description: new.description,
            category: new.category,
            likelihood: new.likelihood,
            impact: new.impact,
            owner: new.owner,
            status: RiskStatus::Identified,
            created_at: now,
            updated_at: now,
        };

        self.record_audit(
            EntityType::Risk,
            &id,
            AuditAction::Created,
            Some(serde_json::to_value(&risk)?),
            now,
        )
        .await?;

        tracing::debug!(risk_id = %id, score = risk.score(), level = %risk.level(), "created risk");
        Ok(risk)
    }

    pub async fn get_risk(&self, id: &str) -> Result<Risk, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(
                &format!("SELECT {SELECT_COLS} FROM risks WHERE id = ?1"),
                [id],
            )
            .await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        row_to_risk(&row)
    }

    /// List risks, highest score first.
    pub async fn list_risks(&self, filter: &RiskFilter) -> Result<Vec<Risk>, DatabaseError> {
        let mut clause = WhereClause::default();
        clause.eq("status", filter.status.map(RiskStatus::as_str));
        if let Some(level) = filter.level {
            let (low, high) = score_bounds(level);
            clause.between("likelihood * impact", i64::from(low), i64::from(high));
        }
        clause.eq("owner", filter.owner.clone());
        let (where_clause, params) = clause.finish();
        let limit = filter.limit.unwrap_or(100);

        let mut rows = self
            .db()
            .conn()
            .query(
                &format!(
                    "SELECT {SELECT_COLS} FROM risks {where_clause}
                     ORDER BY likelihood * impact DESC, created_at LIMIT {limit}"
                ),
                libsql::params_from_iter(params),
            )
            .await?;

        let mut risks = Vec::new();
        while let Some(row) = rows.next().await? {
            risks.push(row_to_risk(&row)?);
        }
        Ok(risks)
    }

    pub async fn update_risk(
        &self,
        risk_id: &str,
        update: RiskUpdate,
    ) -> Result<Risk, DatabaseError> {
        let current = self.get_risk(risk_id).await?;
        if current.status == RiskStatus::Closed {
            return Err(DatabaseError::InvalidState(format!(
                "Risk {risk_id} is closed and cannot be edited"
            )));
        }

        let mut set = SetClause::default();
        if let Some(ref title) = update.title {
            set.push("title", title.clone());
        }
        if let Some(ref description) = update.description {
            set.push_opt("description", description.clone());
        }
        if let Some(ref category) = update.category {
            set.push_opt("category", category.clone());
        }
        if let Some(likelihood) = update.likelihood {
            set.push("likelihood", i64::from(validate_rating("likelihood", likelihood)?));
        }
        if let Some(impact) = update.impact {
            set.push("impact", i64::from(validate_rating("impact", impact)?));
        }
        if let Some(ref owner) = update.owner {
            set.push_opt("owner", owner.clone());
        }

        if set.is_empty() {
            return Ok(current);
        }

        let now = Utc::now();
        set.push("updated_at", now.to_rfc3339());
        let (sql, params) = set.into_update("risks", risk_id);
        self.db()
            .conn()
            .execute(&sql, libsql::params_from_iter(params))
            .await?;

        let updated = self.get_risk(risk_id).await?;
        self.record_audit(
            EntityType::Risk,
            risk_id,
            AuditAction::Updated,
            Some(serde_json::to_value(&update)?),
            now,
        )
        .await?;
        Ok(updated)
    }

    /// Move a risk along its status machine.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::InvalidState` for a disallowed transition.
    pub async fn transition_risk(
        &self,
        risk_id: &str,
        new_status: RiskStatus,
    ) -> Result<Risk, DatabaseError> {
        let current = self.get_risk(risk_id).await?;

        if !current.status.can_transition_to(new_status) {
            return Err(DatabaseError::InvalidState(format!(
                "Cannot transition risk {} from {} to {}",
                risk_id, current.status, new_status
            )));
        }

        let now = Utc::now();
        self.db()
            .conn()
            .execute(
                "UPDATE risks SET status = ?1, updated_at = ?2 WHERE id = ?3",
                libsql::params![new_status.as_str(), now.to_rfc3339(), risk_id],
            )
            .await?;

        let detail = StatusChangedDetail {
            from: current.status.as_str().to_string(),
            to: new_status.as_str().to_string(),
            reason: None,
        };
        self.record_audit(
            EntityType::Risk,
            risk_id,
            AuditAction::StatusChanged,
            Some(serde_json::to_value(&detail)?),
            now,
        )
        .await?;

        Ok(Risk {
            status: new_status,
            updated_at: now,
            ..current
        })
    }

    /// Delete a risk and, by cascade, its KRIs.
    pub async fn delete_risk(&self, risk_id: &str) -> Result<(), DatabaseError> {
        let now = Utc::now();
        let affected = self
            .db()
            .conn()
            .execute("DELETE FROM risks WHERE id = ?1", [risk_id])
            .await?;
        if affected == 0 {
            return Err(DatabaseError::NoResult);
        }
        self.record_audit(EntityType::Risk, risk_id, AuditAction::Deleted, None, now)
            .await?;
        Ok(())
    }

    /// Likelihood × impact counts over every risk that is not closed.
    pub async fn risk_heat_map(&self) -> Result<HeatMap, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(
                "SELECT likelihood, impact FROM risks WHERE status != 'closed'",
                (),
            )
            .await?;

        let mut map = HeatMap::default();
        while let Some(row) = rows.next().await? {
            map.add(get_rating(&row, 0)?, get_rating(&row, 1)?);
        }
        Ok(map)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::helpers::test_service;
    use crate::updates::risk::RiskUpdateBuilder;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case(0, 3)]
    #[case(3, 6)]
    #[tokio::test]
    async fn create_rejects_out_of_range_ratings(#[case] likelihood: u8, #[case] impact: u8) {
        let svc = test_service().await;
        let result = svc.create_risk(NewRisk::new("Bad rating", likelihood, impact)).await;
        assert!(matches!(result, Err(DatabaseError::Core(_))));
    }

    #[tokio::test]
    async fn create_and_get() {
        let svc = test_service().await;
        let risk = svc
            .create_risk(NewRisk {
                owner: Some("ciso".into()),
                category: Some("cyber".into()),
                ..NewRisk::new("Ransomware outbreak", 4, 5)
            })
            .await
            .unwrap();
        assert_eq!(risk.status, RiskStatus::Identified);
        assert_eq!(risk.score(), 20);
        assert_eq!(risk.level(), RiskLevel::Critical);
        assert_eq!(svc.get_risk(&risk.id).await.unwrap(), risk);
    }

    #[tokio::test]
    async fn list_filters_by_level_and_owner() {
        let svc = test_service().await;
        svc.create_risk(NewRisk::new("Insider fraud", 2, 2)).await.unwrap();
        let critical = svc.create_risk(NewRisk::new("Ransomware", 5, 5)).await.unwrap();
        svc.create_risk(NewRisk {
            owner: Some("facilities".into()),
            ..NewRisk::new("Flood", 2, 4)
        })
        .await
        .unwrap();

        let all = svc.list_risks(&RiskFilter::default()).await.unwrap();
        assert_eq!(all.len(), 3);
        assert_eq!(all[0].id, critical.id);

        let only_critical = svc
            .list_risks(&RiskFilter {
                level: Some(RiskLevel::Critical),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(only_critical.len(), 1);

        let facilities = svc
            .list_risks(&RiskFilter {
                owner: Some("facilities".into()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(facilities.len(), 1);
        assert_eq!(facilities[0].title, "Flood");
    }

    #[tokio::test]
    async fn transitions_follow_lifecycle() {
        let svc = test_service().await;
        let risk = svc.create_risk(NewRisk::new("Supplier breach", 3, 4)).await.unwrap();

        let skip = svc.transition_risk(&risk.id, RiskStatus::Mitigating).await;
        assert!(matches!(skip, Err(DatabaseError::InvalidState(_))));

        svc.transition_risk(&risk.id, RiskStatus::Assessed).await.unwrap();
        svc.transition_risk(&risk.id, RiskStatus::Mitigating).await.unwrap();
        let closed = svc.transition_risk(&risk.id, RiskStatus::Closed).await.unwrap();
        assert_eq!(closed.status, RiskStatus::Closed);

        let update = RiskUpdateBuilder::new().impact(1).build();
        assert!(matches!(
            svc.update_risk(&risk.id, update).await,
            Err(DatabaseError::InvalidState(_))
        ));
    }

    #[tokio::test]
    async fn update_rescores() {
        let svc = test_service().await;
        let risk = svc.create_risk(NewRisk::new("Phishing", 4, 3)).await.unwrap();

        let update = RiskUpdateBuilder::new().likelihood(2).owner(Some("it-sec".into())).build();
        let updated = svc.update_risk(&risk.id, update).await.unwrap();
        assert_eq!(updated.score(), 6);
        assert_eq!(updated.level(), RiskLevel::Medium);
        assert_eq!(updated.owner.as_deref(), Some("it-sec"));

        let bad = RiskUpdateBuilder::new().impact(9).build();
        assert!(svc.update_risk(&risk.id, bad).await.is_err());
    }

    #[tokio::test]
    async fn heat_map_skips_closed_risks() {
        let svc = test_service().await;
        svc.create_risk(NewRisk::new("A", 5, 5)).await.unwrap();
        svc.create_risk(NewRisk::new("B", 5, 5)).await.unwrap();
        let closed = svc.create_risk(NewRisk::new("C", 1, 1)).await.unwrap();
        svc.transition_risk(&closed.id, RiskStatus::Assessed).await.unwrap();
        svc.transition_risk(&closed.id, RiskStatus::Closed).await.unwrap();

        let map = svc.risk_heat_map().await.unwrap();
        assert_eq!(map.count(5, 5), 2);
        assert_eq!(map.count(1, 1), 0);
        assert_eq!(map.total, 2);
    }

    #[tokio::test]
    async fn delete_missing_risk() {
        let svc = test_service().await;
        let risk = svc.create_risk(NewRisk::new("Temp", 1, 1)).await.unwrap();
        svc.delete_risk(&risk.id).await.unwrap();
        assert!(matches!(svc.delete_risk(&risk.id).await, Err(DatabaseError::NoResult)));
    }
}
