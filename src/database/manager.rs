use std::time::Duration;

use sqlx::{postgres::PgPoolOptions, PgPool};
use tracing::info;

use super::repository::{Collection, RepositoryError};
use crate::config::DatabaseConfig;

/// Connection and bootstrap helpers for the Postgres backend.
pub struct DatabaseManager;

impl DatabaseManager {
    /// Connect a pool using the configured URL and limits.
    pub async fn connect(config: &DatabaseConfig) -> Result<PgPool, RepositoryError> {
        let url = config
            .url
            .as_deref()
            .filter(|u| !u.is_empty())
            .ok_or(RepositoryError::ConfigMissing("DATABASE_URL"))?;

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(Duration::from_secs(config.connection_timeout))
            .connect(url)
            .await?;

        info!("Connected database pool to {}", Self::redacted_url(url)?);
        Ok(pool)
    }

    /// Create the collection tables and unique indexes when missing.
    ///
    /// Idempotent; this is bootstrap for a fresh database, not a migration
    /// system.
    pub async fn ensure_schema(pool: &PgPool) -> Result<(), RepositoryError> {
        for collection in Collection::ALL {
            let table = collection.table_name();
            let create_table = format!(
                r#"CREATE TABLE IF NOT EXISTS "{}" (
                    "id" UUID PRIMARY KEY,
                    "data" JSONB NOT NULL,
                    "created_at" TIMESTAMPTZ NOT NULL DEFAULT now()
                )"#,
                table
            );
            sqlx::query(&create_table).execute(pool).await?;

            for field in collection.unique_fields() {
                let create_index = format!(
                    r#"CREATE UNIQUE INDEX IF NOT EXISTS "{table}_{field}_key" ON "{table}" (("data" ->> '{field}'))"#,
                    table = table,
                    field = field
                );
                sqlx::query(&create_index).execute(pool).await?;
            }
        }
        info!("Database schema ready");
        Ok(())
    }

    /// Strip credentials from a connection string so it can be logged.
    pub fn redacted_url(database_url: &str) -> Result<String, RepositoryError> {
        let mut url = url::Url::parse(database_url).map_err(|_| RepositoryError::InvalidDatabaseUrl)?;
        if url.password().is_some() {
            url.set_password(Some("***")).map_err(|_| RepositoryError::InvalidDatabaseUrl)?;
        }
        Ok(url.into())
    }
}
