//! Audit trail repository.
//!
//! Append-only audit entries recording every mutation, with dynamic filtering.

use grc_core::entities::AuditEntry;
use grc_core::enums::{AuditAction, EntityType};

use crate::error::DatabaseError;
use crate::helpers::{WhereClause, get_opt_string, parse_datetime, parse_enum, parse_optional_json};
use crate::service::GrcService;

/// Filter criteria for audit queries.
#[derive(Debug, Default)]
pub struct AuditFilter {
    pub entity_type: Option<EntityType>,
    pub entity_id: Option<String>,
    pub action: Option<AuditAction>,
    pub actor: Option<String>,
    pub limit: Option<u32>,
}

/// Insert an audit entry on `conn`, which may be a transaction.
pub(crate) async fn insert_audit(
    conn: &libsql::Connection,
    entry: &AuditEntry,
) -> Result<(), DatabaseError> {
    conn.execute(
        "INSERT INTO audit_trail (id, actor, entity_type, entity_id, action, detail, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
        libsql::params![
            entry.id.as_str(),
            entry.actor.as_deref(),
            entry.entity_type.as_str(),
            entry.entity_id.as_str(),
            entry.action.as_str(),
            entry.detail.as_ref().map(std::string::ToString::to_string),
            entry.created_at.to_rfc3339()
        ],
    )
    .await?;
    Ok(())
}

impl GrcService {
    /// Append an audit entry. Called by every mutation method.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the INSERT fails.
    pub async fn append_audit(&self, entry: &AuditEntry) -> Result<(), DatabaseError> {
        insert_audit(self.db().conn(), entry).await
    }

    /// Query audit entries with optional filters, newest first.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn query_audit(
        &self,
        filter: &AuditFilter,
    ) -> Result<Vec<AuditEntry>, DatabaseError> {
        let mut clause = WhereClause::default();
        clause
            .eq("entity_type", filter.entity_type.map(EntityType::as_str))
            .eq("entity_id", filter.entity_id.clone())
            .eq("action", filter.action.map(AuditAction::as_str))
            .eq("actor", filter.actor.clone());
        let (where_clause, params) = clause.finish();

        let limit = filter.limit.unwrap_or(100);
        let sql = format!(
            "SELECT id, actor, entity_type, entity_id, action, detail, created_at
             FROM audit_trail {where_clause}
             ORDER BY created_at DESC, rowid DESC LIMIT {limit}"
        );

        let mut rows = self
            .db()
            .conn()
            .query(&sql, libsql::params_from_iter(params))
            .await?;
        let mut entries = Vec::new();

        while let Some(row) = rows.next().await? {
            entries.push(AuditEntry {
                id: row.get::<String>(0)?,
                actor: get_opt_string(&row, 1)?,
                entity_type: parse_enum(&row.get::<String>(2)?)?,
                entity_id: row.get::<String>(3)?,
                action: parse_enum(&row.get::<String>(4)?)?,
                detail: parse_optional_json(get_opt_string(&row, 5)?.as_deref())?,
                created_at: parse_datetime(&row.get::<String>(6)?)?,
            });
        }

        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::helpers::{TEST_ACTOR, test_service};
    use chrono::Utc;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn append_and_query_roundtrip() {
        let svc = test_service().await;
        let now = Utc::now();
        svc.append_audit(&AuditEntry {
            id: "aud-00000001".into(),
            actor: Some("j.doe".into()),
            entity_type: EntityType::Risk,
            entity_id: "rsk-00000001".into(),
            action: AuditAction::Created,
            detail: Some(serde_json::json!({"note": "seed"})),
            created_at: now,
        })
        .await
        .unwrap();

        let entries = svc.query_audit(&AuditFilter::default()).await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].actor.as_deref(), Some("j.doe"));
        assert_eq!(entries[0].detail, Some(serde_json::json!({"note": "seed"})));
    }

    #[tokio::test]
    async fn filters_narrow_results() {
        let svc = test_service().await;
        let now = Utc::now();
        for (id, entity_type, entity_id, action) in [
            ("aud-00000001", EntityType::Risk, "rsk-1", AuditAction::Created),
            ("aud-00000002", EntityType::Risk, "rsk-1", AuditAction::Updated),
            ("aud-00000003", EntityType::Finding, "fnd-1", AuditAction::Created),
        ] {
            svc.append_audit(&AuditEntry {
                id: id.into(),
                actor: None,
                entity_type,
                entity_id: entity_id.into(),
                action,
                detail: None,
                created_at: now,
            })
            .await
            .unwrap();
        }

        let risk_entries = svc
            .query_audit(&AuditFilter {
                entity_type: Some(EntityType::Risk),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(risk_entries.len(), 2);

        let created = svc
            .query_audit(&AuditFilter {
                action: Some(AuditAction::Created),
                entity_id: Some("fnd-1".into()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(created.len(), 1);
        assert_eq!(created[0].id, "aud-00000003");

        let limited = svc
            .query_audit(&AuditFilter {
                limit: Some(1),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(limited.len(), 1);
    }

    #[tokio::test]
    async fn record_audit_uses_configured_actor() {
        let svc = test_service().await;
        svc.record_audit(EntityType::Kri, "kri-1", AuditAction::Updated, None, Utc::now())
            .await
            .unwrap();

        let entries = svc
            .query_audit(&AuditFilter {
                actor: Some(TEST_ACTOR.into()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(entries.len(), 1);
        assert!(entries[0].id.starts_with("aud-"));
    }
}
