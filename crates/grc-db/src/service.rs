//! Service layer orchestrating database mutations with the audit trail.
//!
//! `GrcService` wraps `GrcDb` (raw database access), the `TemplateService`
//! (category definitions and selection validation), and the clause catalog.
//! All repo methods are implemented as `impl GrcService` blocks.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use grc_core::catalog::ClauseCatalog;
use grc_core::entities::AuditEntry;
use grc_core::enums::{AuditAction, EntityType};
use grc_core::ids::PREFIX_AUDIT;
use grc_core::template::TemplateService;

use crate::GrcDb;
use crate::error::DatabaseError;

/// Orchestrates database mutations with an audit trail.
///
/// Every mutation method follows this protocol:
/// 1. Validate input against the template and clause catalogs
/// 2. Execute SQL
/// 3. Append an audit entry attributed to the configured actor
pub struct GrcService {
    db: GrcDb,
    templates: TemplateService,
    clauses: Arc<ClauseCatalog>,
    actor: Option<String>,
}

impl GrcService {
    /// Create a service over a local database with the built-in catalogs.
    ///
    /// # Arguments
    ///
    /// * `db_path` - Path to the libSQL database file, or `":memory:"` for tests.
    /// * `actor` - Name recorded on audit entries and as `prepared_by`.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the database cannot be opened.
    pub async fn new_local(db_path: &str, actor: Option<String>) -> Result<Self, DatabaseError> {
        let db = GrcDb::open_local(db_path).await?;
        Ok(Self::from_db(db, actor))
    }

    /// Create from an existing `GrcDb` with the built-in catalogs.
    #[must_use]
    pub fn from_db(db: GrcDb, actor: Option<String>) -> Self {
        Self::with_catalogs(db, TemplateService::builtin(), ClauseCatalog::iso27001_2022(), actor)
    }

    #[must_use]
    pub const fn with_catalogs(
        db: GrcDb,
        templates: TemplateService,
        clauses: Arc<ClauseCatalog>,
        actor: Option<String>,
    ) -> Self {
        Self {
            db,
            templates,
            clauses,
            actor,
        }
    }

    /// Access the underlying database handle.
    #[must_use]
    pub const fn db(&self) -> &GrcDb {
        &self.db
    }

    #[must_use]
    pub const fn templates(&self) -> &TemplateService {
        &self.templates
    }

    #[must_use]
    pub fn clauses(&self) -> &ClauseCatalog {
        &self.clauses
    }

    #[must_use]
    pub fn actor(&self) -> Option<&str> {
        self.actor.as_deref()
    }

    /// Build an audit entry attributed to the configured actor.
    ///
    /// Entries written inside a transaction are built first and appended with
    /// [`crate::repos::audit::insert_audit`] on the transaction.
    pub(crate) async fn audit_entry(
        &self,
        entity_type: EntityType,
        entity_id: &str,
        action: AuditAction,
        detail: Option<serde_json::Value>,
        created_at: DateTime<Utc>,
    ) -> Result<AuditEntry, DatabaseError> {
        Ok(AuditEntry {
            id: self.db.generate_id(PREFIX_AUDIT).await?,
            actor: self.actor.clone(),
            entity_type,
            entity_id: entity_id.to_string(),
            action,
            detail,
            created_at,
        })
    }

    /// Build and append an audit entry in one step.
    pub(crate) async fn record_audit(
        &self,
        entity_type: EntityType,
        entity_id: &str,
        action: AuditAction,
        detail: Option<serde_json::Value>,
        created_at: DateTime<Utc>,
    ) -> Result<(), DatabaseError> {
        let entry = self
            .audit_entry(entity_type, entity_id, action, detail, created_at)
            .await?;
        self.append_audit(&entry).await
    }
}
