//! # grc-db
//!
//! libSQL persistence for the grc audit workbench.
//!
//! Handles all relational state: audit plans, generated workpapers,
//! findings, the risk register with its key risk indicators, and the
//! append-only audit trail. Template and clause data stay in `grc-core`;
//! rows only reference them by ID or clause number.

pub mod error;
pub mod helpers;
mod migrations;
pub mod repos;
pub mod service;
pub mod updates;

#[cfg(test)]
mod test_support;

use error::DatabaseError;
use libsql::Builder;

/// Per-connection settings applied before migrations.
const CONNECTION_PRAGMAS: &str = "PRAGMA foreign_keys = ON;\nPRAGMA busy_timeout = 5000;";

/// An open project database with its schema at the latest version.
pub struct GrcDb {
    // Dropping the database closes the connection.
    _database: libsql::Database,
    conn: libsql::Connection,
}

impl GrcDb {
    /// Open (or create) the database file at `path` and bring its schema up
    /// to date. `":memory:"` gives a throwaway database.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the file cannot be opened or a migration
    /// fails.
    pub async fn open_local(path: &str) -> Result<Self, DatabaseError> {
        let database = Builder::new_local(path).build().await?;
        let conn = database.connect()?;
        conn.execute_batch(CONNECTION_PRAGMAS)
            .await
            .map_err(|e| DatabaseError::Migration(format!("connection setup: {e}")))?;

        let db = Self {
            _database: database,
            conn,
        };
        db.run_migrations().await?;
        tracing::debug!(path, "opened database");
        Ok(db)
    }

    #[must_use]
    pub const fn conn(&self) -> &libsql::Connection {
        &self.conn
    }

    /// New entity ID: `prefix`, a dash, then 8 random lowercase hex digits
    /// drawn from `SQLite`'s `randomblob`.
    ///
    /// # Errors
    ///
    /// Returns `DatabaseError` if the query fails.
    pub async fn generate_id(&self, prefix: &str) -> Result<String, DatabaseError> {
        let mut rows = self
            .conn
            .query("SELECT lower(hex(randomblob(4)))", ())
            .await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        let suffix = row.get::<String>(0)?;
        Ok(format!("{prefix}-{suffix}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use grc_core::ids::ALL_PREFIXES;
    use std::collections::HashSet;

    async fn test_db() -> GrcDb {
        GrcDb::open_local(":memory:").await.unwrap()
    }

    #[tokio::test]
    async fn open_local_creates_schema() {
        let db = test_db().await;

        let tables = [
            "audit_plans",
            "workpapers",
            "findings",
            "risks",
            "kris",
            "audit_trail",
        ];
        for table in &tables {
            let mut rows = db
                .conn()
                .query(
                    "SELECT name FROM sqlite_master WHERE type='table' AND name=?1",
                    [*table],
                )
                .await
                .unwrap();
            let row = rows.next().await.unwrap();
            assert!(row.is_some(), "table '{table}' should exist");
        }
    }

    #[tokio::test]
    async fn migrations_are_idempotent() {
        let db = test_db().await;
        db.run_migrations().await.unwrap();
    }

    #[tokio::test]
    async fn foreign_keys_enabled() {
        let db = test_db().await;
        let mut rows = db.conn().query("PRAGMA foreign_keys", ()).await.unwrap();
        let row = rows.next().await.unwrap().unwrap();
        assert_eq!(row.get::<i64>(0).unwrap(), 1);
    }

    #[tokio::test]
    async fn generate_id_correct_format() {
        let db = test_db().await;
        for prefix in ALL_PREFIXES {
            let id = db.generate_id(prefix).await.unwrap();
            assert!(id.starts_with(&format!("{prefix}-")), "bad prefix: {id}");
            assert_eq!(id.len(), 12, "ID should be 12 chars: {id}");
            assert!(id[4..].chars().all(|c| c.is_ascii_hexdigit()));
        }
    }

    #[tokio::test]
    async fn generate_id_is_unique() {
        let db = test_db().await;
        let mut ids = HashSet::new();
        for _ in 0..100 {
            assert!(ids.insert(db.generate_id("fnd").await.unwrap()));
        }
    }

    #[tokio::test]
    async fn open_local_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("grc.db");
        let path = path.to_str().unwrap();
        {
            let db = GrcDb::open_local(path).await.unwrap();
            db.conn()
                .execute(
                    "INSERT INTO risks (id, title, likelihood, impact) VALUES ('rsk-00000001', 'Persisted', 2, 3)",
                    (),
                )
                .await
                .unwrap();
        }
        let reopened = GrcDb::open_local(path).await.unwrap();
        let mut rows = reopened
            .conn()
            .query("SELECT title FROM risks WHERE id = 'rsk-00000001'", ())
            .await
            .unwrap();
        let row = rows.next().await.unwrap().unwrap();
        assert_eq!(row.get::<String>(0).unwrap(), "Persisted");
    }
}
