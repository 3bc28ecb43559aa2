use anyhow::{Context, Result};
use sqlx::migrate::MigrateDatabase;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::{Sqlite, SqlitePool};
use tracing::info;

/// Every record is a JSON document keyed by id. `sort_key` carries the
/// timestamp a collection lists by. The activity log is append-only.
const MIGRATIONS_SQL: &str = "
CREATE TABLE IF NOT EXISTS profile (
    id TEXT PRIMARY KEY NOT NULL,
    sort_key INTEGER NOT NULL DEFAULT 0,
    data TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS settings (
    id TEXT PRIMARY KEY NOT NULL,
    sort_key INTEGER NOT NULL DEFAULT 0,
    data TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS resumes (
    id TEXT PRIMARY KEY NOT NULL,
    sort_key INTEGER NOT NULL DEFAULT 0, -- created, epoch ms
    data TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS custom_templates (
    id TEXT PRIMARY KEY NOT NULL,
    sort_key INTEGER NOT NULL DEFAULT 0, -- updated, epoch ms
    data TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS creative_designs (
    id TEXT PRIMARY KEY NOT NULL,
    sort_key INTEGER NOT NULL DEFAULT 0, -- updated, epoch ms
    data TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS prompts (
    id TEXT PRIMARY KEY NOT NULL,
    sort_key INTEGER NOT NULL DEFAULT 0,
    data TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS activity_logs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    timestamp INTEGER NOT NULL,
    provider TEXT NOT NULL,
    model TEXT NOT NULL,
    status TEXT NOT NULL,
    request TEXT NOT NULL,
    response TEXT NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_activity_logs_timestamp ON activity_logs(timestamp);
";

/// Opens (creating if needed) the SQLite database and applies the schema.
pub async fn create_pool(database_url: &str) -> Result<SqlitePool> {
    info!("Connecting to SQLite at {database_url}...");

    if !Sqlite::database_exists(database_url).await.unwrap_or(false) {
        info!("Database not found, creating...");
        Sqlite::create_database(database_url)
            .await
            .context("Failed to create database")?;
    }

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect(database_url)
        .await
        .context("Failed to connect to SQLite database")?;

    run_migrations(&pool).await?;

    info!("SQLite connection pool established");
    Ok(pool)
}

pub async fn run_migrations(pool: &SqlitePool) -> Result<()> {
    sqlx::query(MIGRATIONS_SQL)
        .execute(pool)
        .await
        .context("Failed to run database migrations")?;
    Ok(())
}

/// A migrated in-memory database. One connection, since every new
/// connection to `sqlite::memory:` would see an empty database.
#[cfg(test)]
pub async fn memory_pool() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await
        .unwrap();
    run_migrations(&pool).await.unwrap();
    pool
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_migrations_are_idempotent() {
        let pool = memory_pool().await;
        run_migrations(&pool).await.unwrap();
        let tables: Vec<String> = sqlx::query_scalar(
            "SELECT name FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%' ORDER BY name",
        )
        .fetch_all(&pool)
        .await
        .unwrap();
        assert_eq!(
            tables,
            vec![
                "activity_logs",
                "creative_designs",
                "custom_templates",
                "profile",
                "prompts",
                "resumes",
                "settings"
            ]
        );
    }

    #[tokio::test]
    async fn test_create_pool_creates_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("resume.db");
        let url = format!("sqlite://{}?mode=rwc", path.display());
        let pool = create_pool(&url).await.unwrap();
        pool.close().await;
        assert!(path.exists());
    }
}
