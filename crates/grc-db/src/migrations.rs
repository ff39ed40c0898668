//! Schema versioning.
//!
//! Migrations are embedded at compile time and applied in order. The number of
//! applied migrations is kept in `PRAGMA user_version`, so opening an
//! up-to-date database runs nothing.

use crate::GrcDb;
use crate::error::DatabaseError;

const MIGRATIONS: &[(&str, &str)] = &[(
    "001_initial",
    include_str!("../migrations/001_initial.sql"),
)];

impl GrcDb {
    pub(crate) async fn schema_version(&self) -> Result<usize, DatabaseError> {
        let mut rows = self.conn.query("PRAGMA user_version", ()).await?;
        let row = rows.next().await?.ok_or(DatabaseError::NoResult)?;
        let version = row.get::<i64>(0)?;
        usize::try_from(version)
            .map_err(|_| DatabaseError::Migration(format!("invalid schema version {version}")))
    }

    /// Apply every migration newer than the stored schema version.
    pub(crate) async fn run_migrations(&self) -> Result<(), DatabaseError> {
        let applied = self.schema_version().await?;
        if applied > MIGRATIONS.len() {
            return Err(DatabaseError::Migration(format!(
                "database schema version {applied} is newer than this grc build ({})",
                MIGRATIONS.len()
            )));
        }

        for (index, (name, sql)) in MIGRATIONS.iter().enumerate().skip(applied) {
            let version = index + 1;
            self.conn
                .execute_batch(&format!("{sql}\nPRAGMA user_version = {version};"))
                .await
                .map_err(|e| DatabaseError::Migration(format!("{name}: {e}")))?;
            tracing::debug!(migration = name, version, "applied migration");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::MIGRATIONS;
    use crate::GrcDb;

    async fn test_db() -> GrcDb {
        GrcDb::open_local(":memory:").await.unwrap()
    }

    #[tokio::test]
    async fn open_records_latest_schema_version() {
        let db = test_db().await;
        assert_eq!(db.schema_version().await.unwrap(), MIGRATIONS.len());
    }

    #[tokio::test]
    async fn newer_schema_is_refused() {
        let db = test_db().await;
        db.conn().execute("PRAGMA user_version = 99", ()).await.unwrap();
        let err = db.run_migrations().await.unwrap_err();
        assert!(err.to_string().contains("newer than this grc build"));
    }
}
