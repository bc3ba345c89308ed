//! SQLite persistence for savanna.
//!
//! Provides the shared connection pool, the migration runner that applies the
//! migrations contributed by every registered module, and the `db` core module.

use std::{ops::Deref, str::FromStr, sync::Arc};

use async_trait::async_trait;
use savanna_kernel::{settings::DatabaseSettings, InitCtx, Migration, Module};
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    SqlitePool,
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("database connection error: {0}")]
    Connection(#[source] sqlx::Error),

    #[error("database query error: {0}")]
    Query(#[from] sqlx::Error),

    #[error("migration {module}/{id} failed: {source}")]
    Migration {
        module: String,
        id: String,
        #[source]
        source: sqlx::Error,
    },

    #[error("invalid data: {0}")]
    InvalidData(String),

    #[error("not found: {0}")]
    NotFound(String),
}

impl DbError {
    /// Map `RowNotFound` onto a descriptive `NotFound`, keep everything else.
    pub fn or_not_found(err: sqlx::Error, what: impl FnOnce() -> String) -> Self {
        match err {
            sqlx::Error::RowNotFound => DbError::NotFound(what()),
            other => DbError::Query(other),
        }
    }
}

pub type Result<T> = std::result::Result<T, DbError>;

/// Shared handle to the connection pool.
#[derive(Clone, Debug)]
pub struct Database {
    pool: SqlitePool,
}

impl Deref for Database {
    type Target = SqlitePool;
    fn deref(&self) -> &Self::Target {
        &self.pool
    }
}

impl Database {
    /// Connect using the configured URL, creating the file if missing.
    pub async fn connect(settings: &DatabaseSettings) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(&settings.url)
            .map_err(DbError::Connection)?
            .create_if_missing(true)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(settings.max_connections)
            .connect_with(options)
            .await
            .map_err(DbError::Connection)?;

        tracing::info!(url = %settings.url, "database pool ready");
        Ok(Self { pool })
    }

    /// Private in-memory database. A single connection that never expires,
    /// since every new SQLite memory connection is a fresh empty database.
    pub async fn in_memory() -> Result<Self> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")
            .map_err(DbError::Connection)?
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await
            .map_err(DbError::Connection)?;

        Ok(Self { pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    /// Apply every migration not yet recorded in `_migrations`.
    /// Returns the number of migrations applied by this call.
    pub async fn migrate(&self, migrations: &[(String, Migration)]) -> Result<usize> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS _migrations (
                module TEXT NOT NULL,
                id TEXT NOT NULL,
                applied_at TEXT NOT NULL,
                PRIMARY KEY (module, id)
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        let mut applied = 0;
        for (module, migration) in migrations {
            let seen: Option<String> =
                sqlx::query_scalar("SELECT id FROM _migrations WHERE module = ? AND id = ?")
                    .bind(module)
                    .bind(migration.id)
                    .fetch_optional(&self.pool)
                    .await?;
            if seen.is_some() {
                continue;
            }

            let mut tx = self.pool.begin().await?;
            sqlx::query(migration.up)
                .execute(&mut *tx)
                .await
                .map_err(|source| DbError::Migration {
                    module: module.clone(),
                    id: migration.id.to_string(),
                    source,
                })?;
            sqlx::query("INSERT INTO _migrations (module, id, applied_at) VALUES (?, ?, ?)")
                .bind(module)
                .bind(migration.id)
                .bind(chrono::Utc::now().to_rfc3339())
                .execute(&mut *tx)
                .await?;
            tx.commit().await?;

            tracing::info!(module = %module, migration = migration.id, "migration applied");
            applied += 1;
        }

        Ok(applied)
    }
}

/// Core module owning the pool lifecycle.
pub struct DatabaseModule {
    db: Database,
}

impl DatabaseModule {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

#[async_trait]
impl Module for DatabaseModule {
    fn name(&self) -> &'static str {
        "db"
    }

    async fn init(&self, _ctx: &InitCtx<'_>) -> anyhow::Result<()> {
        self.db.ping().await?;
        tracing::info!(module = self.name(), "database reachable");
        Ok(())
    }

    async fn stop(&self) -> anyhow::Result<()> {
        self.db.close().await;
        tracing::info!(module = self.name(), "database pool closed");
        Ok(())
    }
}

/// Create the `db` core module for a connected database
pub fn create_module(db: Database) -> Arc<dyn Module> {
    Arc::new(DatabaseModule::new(db))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn migrations() -> Vec<(String, Migration)> {
        vec![
            (
                "reviews".to_string(),
                Migration {
                    id: "001_init",
                    up: r#"
                        CREATE TABLE reviews (id INTEGER PRIMARY KEY, name TEXT NOT NULL);
                        CREATE INDEX reviews_name ON reviews(name);
                    "#,
                },
            ),
            (
                "reviews".to_string(),
                Migration {
                    id: "002_featured",
                    up: "ALTER TABLE reviews ADD COLUMN is_featured INTEGER NOT NULL DEFAULT 0;",
                },
            ),
        ]
    }

    #[tokio::test]
    async fn migrations_apply_once() {
        let db = Database::in_memory().await.unwrap();

        assert_eq!(db.migrate(&migrations()).await.unwrap(), 2);
        assert_eq!(db.migrate(&migrations()).await.unwrap(), 0);

        sqlx::query("INSERT INTO reviews (name, is_featured) VALUES ('Amani', 1)")
            .execute(db.pool())
            .await
            .unwrap();
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM _migrations")
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!(count, 2);
    }

    #[tokio::test]
    async fn broken_migration_names_its_origin() {
        let db = Database::in_memory().await.unwrap();
        let broken = vec![(
            "blog".to_string(),
            Migration {
                id: "001_init",
                up: "CREATE TABLE",
            },
        )];

        let err = db.migrate(&broken).await.unwrap_err();
        assert!(matches!(err, DbError::Migration { ref module, .. } if module == "blog"));
    }

    #[tokio::test]
    async fn ping_succeeds_on_open_pool() {
        let db = Database::in_memory().await.unwrap();
        db.ping().await.unwrap();
    }
}
