//! Key risk indicator repository.

use chrono::Utc;

use grc_core::entities::Kri;
use grc_core::enums::{AuditAction, EntityType, KriDirection};
use grc_core::ids::PREFIX_KRI;
use grc_core::risk::validate_thresholds;

use crate::error::DatabaseError;
use crate::helpers::{get_opt_string, parse_datetime, parse_enum};
use crate::service::GrcService;

const SELECT_COLS: &str = "id, risk_id, name, unit, current_value, target, warning_threshold, \
     critical_threshold, direction, created_at, updated_at";

fn row_to_kri(row: &libsql::Row) -> Result<Kri, DatabaseError> {
    Ok(Kri {
        id: row.get(0)?,
        risk_id: row.get(1)?,
        name: row.get(2)?,
        unit: get_opt_string(row, 3)?,
        current_value: row.get::<Option<f64>>(4)?,
        target: row.get(5)?,
        warning_threshold: row.get(6)?,
        critical_threshold: row.get(7)?,
        direction: parse_enum(&row.get::<String>(8)?)?,
        created_at: parse_datetime(&row.get::<String>(9)?)?,
        updated_at: parse_datetime(&row.get::<String>(10)?)?,
    })
}

/// Input for [`GrcService::create_kri`].
#[derive(Debug, Clone)]
pub struct NewKri {
    pub risk_id: String,
    pub name: String,
    pub unit: Option<String>,
    pub target: f64,
    pub warning_threshold: f64,
    pub critical_threshold: f64,
    pub direction: KriDirection,
}

impl GrcService {
    /// Attach an indicator to an existing risk. The indicator starts with no
    /// reading.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::NoResult` for an unknown risk and
    /// `DatabaseError::Core` when the thresholds are out of order.
    pub async fn create_kri(&self, new: NewKri) -> Result<Kri, DatabaseError> {
        validate_thresholds(new.warning_threshold, new.critical_threshold, new.direction)?;
        self.get_risk(&new.risk_id).await?;

        let now = Utc::now();
        let id = self.db().generate_id(PREFIX_KRI).await?;

        self.db()
            .conn()
            .execute(
                &format!(
                    "INSERT INTO kris ({SELECT_COLS})
                     VALUES (?1, ?2, ?3, ?4, NULL, ?5, ?6, ?7, ?8, ?9, ?10)"
                ),
                libsql::params![
                    id.as_str(),
                    new.risk_id.as_str(),
                    new.name.as_str(),
                    new.unit.as_deref(),
                    new.target,
                    new.warning_threshold,
                    new.critical_threshold,
                    new.direction.as_str(),
                    now.to_rfc3339(),
                    now.to_rfc3339()
                ],
            )
            .await?;

        let kri = Kri {
            id: id.clone(),
            risk_id: new.risk_id,
            name: new.name,
            unit: new.unit,
            current_value: None,
            target: new.target,
            warning_threshold: new.warning_threshold,
            critical_threshold: new.critical_threshold,
            direction: new.direction,
            created_at: now,
            updated_at: now,
        };

        self.record_audit(
            EntityType::Kri,
            &id,
            AuditAction::Created,
            Some(serde_json::to_value(&kri)?),
            now,
        )
        .await?;
        Ok(kri)
    }

    pub async fn get_kri(&self, id: &str) -> Result<Kri, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(&format!("SELECT {SELECT_COLS} FROM kris WHERE id = ?1"), [id])
            .await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        row_to_kri(&row)
    }

    pub async fn list_kris_for_risk(&self, risk_id: &str) -> Result<Vec<Kri>, DatabaseError> {
        let mut rows = self
            .db()
            .conn()
            .query(
                &format!(
                    "SELECT {SELECT_COLS} FROM kris WHERE risk_id = ?1 ORDER BY created_at, rowid"
                ),
                [risk_id],
            )
            .await?;

        let mut kris = Vec::new();
        while let Some(row) = rows.next().await? {
            kris.push(row_to_kri(&row)?);
        }
        Ok(kris)
    }

    /// Store a new reading for an indicator.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError::Validation` for a non-finite value.
    pub async fn record_kri_value(&self, kri_id: &str, value: f64) -> Result<Kri, DatabaseError> {
        if !value.is_finite() {
            return Err(DatabaseError::Validation(format!(
                "KRI reading must be a finite number, got {value}"
            )));
        }
        let current = self.get_kri(kri_id).await?;
        let previous_value = current.current_value;

        let now = Utc::now();
        self.db()
            .conn()
            .execute(
                "UPDATE kris SET current_value = ?1, updated_at = ?2 WHERE id = ?3",
                libsql::params![value, now.to_rfc3339(), kri_id],
            )
            .await?;

        let updated = Kri {
            current_value: Some(value),
            updated_at: now,
            ..current
        };
        let band = updated.band();
        self.record_audit(
            EntityType::Kri,
            kri_id,
            AuditAction::Updated,
            Some(serde_json::json!({
                "previous_value": previous_value,
                "current_value": value,
                "band": band,
            })),
            now,
        )
        .await?;

        tracing::debug!(kri_id, value, %band, "recorded KRI reading");
        Ok(updated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repos::risk::NewRisk;
    use crate::test_support::helpers::test_service;
    use grc_core::enums::KriBand;
    use pretty_assertions::assert_eq;

    fn patch_latency(risk_id: &str) -> NewKri {
        NewKri {
            risk_id: risk_id.to_string(),
            name: "Days to patch critical CVEs".into(),
            unit: Some("days".into()),
            target: 7.0,
            warning_threshold: 14.0,
            critical_threshold: 30.0,
            direction: KriDirection::HigherIsWorse,
        }
    }

    #[tokio::test]
    async fn create_requires_existing_risk() {
        let svc = test_service().await;
        let result = svc.create_kri(patch_latency("rsk-00000000")).await;
        assert!(matches!(result, Err(DatabaseError::NoResult)));
    }

    #[tokio::test]
    async fn create_rejects_inverted_thresholds() {
        let svc = test_service().await;
        let risk = svc.create_risk(NewRisk::new("Exploit", 3, 4)).await.unwrap();
        let result = svc
            .create_kri(NewKri {
                warning_threshold: 40.0,
                ..patch_latency(&risk.id)
            })
            .await;
        assert!(matches!(result, Err(DatabaseError::Core(_))));
    }

    #[tokio::test]
    async fn readings_move_through_bands() {
        let svc = test_service().await;
        let risk = svc.create_risk(NewRisk::new("Exploit", 3, 4)).await.unwrap();
        let kri = svc.create_kri(patch_latency(&risk.id)).await.unwrap();
        assert_eq!(kri.current_value, None);
        assert_eq!(kri.band(), KriBand::Green);

        let amber = svc.record_kri_value(&kri.id, 21.0).await.unwrap();
        assert_eq!(amber.band(), KriBand::Amber);
        let red = svc.record_kri_value(&kri.id, 45.0).await.unwrap();
        assert_eq!(red.band(), KriBand::Red);

        let stored = svc.get_kri(&kri.id).await.unwrap();
        assert_eq!(stored.current_value, Some(45.0));

        assert!(matches!(
            svc.record_kri_value(&kri.id, f64::NAN).await,
            Err(DatabaseError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn kris_listed_per_risk_and_removed_with_it() {
        let svc = test_service().await;
        let risk = svc.create_risk(NewRisk::new("Exploit", 3, 4)).await.unwrap();
        let other = svc.create_risk(NewRisk::new("Outage", 2, 5)).await.unwrap();
        svc.create_kri(patch_latency(&risk.id)).await.unwrap();
        svc.create_kri(NewKri {
            name: "Backup success rate".into(),
            unit: Some("%".into()),
            target: 99.0,
            warning_threshold: 95.0,
            critical_threshold: 90.0,
            direction: KriDirection::LowerIsWorse,
            ..patch_latency(&risk.id)
        })
        .await
        .unwrap();
        svc.create_kri(patch_latency(&other.id)).await.unwrap();

        let listed = svc.list_kris_for_risk(&risk.id).await.unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[1].direction, KriDirection::LowerIsWorse);

        svc.delete_risk(&risk.id).await.unwrap();
        assert!(svc.list_kris_for_risk(&risk.id).await.unwrap().is_empty());
        assert_eq!(svc.list_kris_for_risk(&other.id).await.unwrap().len(), 1);
    }
}
