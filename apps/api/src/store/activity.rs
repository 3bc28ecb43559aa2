use async_trait::async_trait;
use serde_json::Value;
use sqlx::{FromRow, SqlitePool};
use tracing::error;

use crate::models::activity::{ActivityLog, ActivityStatus};
use crate::store::{StoreError, StoreResult};

const TABLE: &str = "activity_logs";

/// Where provider calls are recorded. Recording never fails from the
/// caller's point of view.
#[async_trait]
pub trait ActivitySink: Send + Sync {
    async fn record(&self, entry: ActivityLog);
}

/// Activity log backed by the `activity_logs` table.
#[derive(Clone)]
pub struct SqliteActivityLog {
    pool: SqlitePool,
}

impl SqliteActivityLog {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ActivitySink for SqliteActivityLog {
    async fn record(&self, entry: ActivityLog) {
        if let Err(e) = append_activity(&self.pool, &entry).await {
            error!("Failed to log activity: {e}");
        }
    }
}

#[derive(Debug, FromRow)]
struct ActivityRow {
    id: i64,
    timestamp: i64,
    provider: String,
    model: String,
    status: String,
    request: String,
    response: String,
}

impl ActivityRow {
    fn into_log(self) -> StoreResult<ActivityLog> {
        let corrupt = |source| StoreError::Corrupt {
            table: TABLE,
            id: self.id.to_string(),
            source,
        };
        let request: Value = serde_json::from_str(&self.request).map_err(corrupt)?;
        let response: Value = serde_json::from_str(&self.response).map_err(corrupt)?;
        let status = match self.status.as_str() {
            "success" => ActivityStatus::Success,
            _ => ActivityStatus::Error,
        };
        Ok(ActivityLog {
            id: Some(self.id),
            timestamp: self.timestamp,
            provider: self.provider,
            model: self.model,
            request,
            response,
            status,
        })
    }
}

/// Appends an entry and returns its assigned id.
pub async fn append_activity(pool: &SqlitePool, entry: &ActivityLog) -> StoreResult<i64> {
    let result = sqlx::query(
        "INSERT INTO activity_logs (timestamp, provider, model, status, request, response) \
         VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(entry.timestamp)
    .bind(&entry.provider)
    .bind(&entry.model)
    .bind(entry.status.as_str())
    .bind(entry.request.to_string())
    .bind(entry.response.to_string())
    .execute(pool)
    .await?;
    Ok(result.last_insert_rowid())
}

/// Most recent entries first.
pub async fn list_activity(pool: &SqlitePool, limit: i64) -> StoreResult<Vec<ActivityLog>> {
    let rows: Vec<ActivityRow> = sqlx::query_as(
        "SELECT id, timestamp, provider, model, status, request, response \
         FROM activity_logs ORDER BY timestamp DESC, id DESC LIMIT ?",
    )
    .bind(limit)
    .fetch_all(pool)
    .await?;
    rows.into_iter().map(ActivityRow::into_log).collect()
}

/// Removes every entry. Returns how many were removed.
pub async fn clear_activity(pool: &SqlitePool) -> StoreResult<u64> {
    let result = sqlx::query("DELETE FROM activity_logs").execute(pool).await?;
    Ok(result.rows_affected())
}
