// Persistence for every record the app owns. Records are JSON documents in
// SQLite; each collection is its own table.

pub mod activity;
pub mod prompts;

use serde::de::DeserializeOwned;
use serde::Serialize;
use sqlx::SqlitePool;
use thiserror::Error;
use tracing::debug;

use crate::models::profile::{Profile, ProfileError, MASTER_PROFILE_ID};
use crate::models::prompt::PromptTemplate;
use crate::models::resume::{CreativeDesign, CustomTemplate, ResumeVersion};
use crate::models::settings::{AppSettings, APP_SETTINGS_ID};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Storage unavailable: {0}")]
    Unavailable(#[from] sqlx::Error),

    #[error("Corrupt record {table}/{id}: {source}")]
    Corrupt {
        table: &'static str,
        id: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid record: {0}")]
    Invalid(String),
}

impl From<ProfileError> for StoreError {
    fn from(e: ProfileError) -> Self {
        StoreError::Invalid(e.to_string())
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// A record kept as a JSON document in its own table.
pub trait Document: Serialize + DeserializeOwned {
    const TABLE: &'static str;

    fn id(&self) -> &str;

    /// Lists are ordered by this, newest first.
    fn sort_key(&self) -> i64 {
        0
    }
}

impl Document for Profile {
    const TABLE: &'static str = "profile";
    fn id(&self) -> &str {
        &self.id
    }
}

impl Document for AppSettings {
    const TABLE: &'static str = "settings";
    fn id(&self) -> &str {
        &self.id
    }
}

impl Document for ResumeVersion {
    const TABLE: &'static str = "resumes";
    fn id(&self) -> &str {
        &self.id
    }
    fn sort_key(&self) -> i64 {
        self.created
    }
}

impl Document for CustomTemplate {
    const TABLE: &'static str = "custom_templates";
    fn id(&self) -> &str {
        &self.id
    }
    fn sort_key(&self) -> i64 {
        self.updated
    }
}

impl Document for CreativeDesign {
    const TABLE: &'static str = "creative_designs";
    fn id(&self) -> &str {
        &self.id
    }
    fn sort_key(&self) -> i64 {
        self.updated
    }
}

impl Document for PromptTemplate {
    const TABLE: &'static str = "prompts";
    fn id(&self) -> &str {
        &self.id
    }
}

fn decode<T: Document>(id: &str, data: &str) -> StoreResult<T> {
    serde_json::from_str(data).map_err(|source| StoreError::Corrupt {
        table: T::TABLE,
        id: id.to_string(),
        source,
    })
}

// ── Generic document access ──────────────────────────────────────────────────

pub async fn get<T: Document>(pool: &SqlitePool, id: &str) -> StoreResult<Option<T>> {
    let sql = format!("SELECT data FROM {} WHERE id = ?", T::TABLE);
    let data: Option<String> = sqlx::query_scalar(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    data.map(|d| decode(id, &d)).transpose()
}

/// All records of a collection, newest first, ties broken by id.
pub async fn list<T: Document>(pool: &SqlitePool) -> StoreResult<Vec<T>> {
    let sql = format!(
        "SELECT id, data FROM {} ORDER BY sort_key DESC, id ASC",
        T::TABLE
    );
    let rows: Vec<(String, String)> = sqlx::query_as(&sql).fetch_all(pool).await?;
    rows.iter().map(|(id, data)| decode(id, data)).collect()
}

/// Inserts or replaces the record with the same id.
pub async fn put<T: Document>(pool: &SqlitePool, doc: &T) -> StoreResult<()> {
    if doc.id().trim().is_empty() {
        return Err(StoreError::Invalid(format!(
            "{} record has an empty id",
            T::TABLE
        )));
    }
    let data = serde_json::to_string(doc).map_err(|e| StoreError::Invalid(e.to_string()))?;
    let sql = format!(
        "INSERT INTO {} (id, sort_key, data) VALUES (?, ?, ?) \
         ON CONFLICT(id) DO UPDATE SET sort_key = excluded.sort_key, data = excluded.data",
        T::TABLE
    );
    sqlx::query(&sql)
        .bind(doc.id())
        .bind(doc.sort_key())
        .bind(data)
        .execute(pool)
        .await?;
    debug!("Stored {}/{}", T::TABLE, doc.id());
    Ok(())
}

/// Returns whether a record was removed.
pub async fn delete<T: Document>(pool: &SqlitePool, id: &str) -> StoreResult<bool> {
    let sql = format!("DELETE FROM {} WHERE id = ?", T::TABLE);
    let result = sqlx::query(&sql).bind(id).execute(pool).await?;
    Ok(result.rows_affected() > 0)
}

// ── Singletons ───────────────────────────────────────────────────────────────

pub async fn get_profile(pool: &SqlitePool) -> StoreResult<Option<Profile>> {
    get(pool, MASTER_PROFILE_ID).await
}

/// Replaces the master profile after checking collection id invariants.
pub async fn put_profile(pool: &SqlitePool, profile: &Profile) -> StoreResult<()> {
    if profile.id != MASTER_PROFILE_ID {
        return Err(StoreError::Invalid(format!(
            "profile id must be '{MASTER_PROFILE_ID}', got '{}'",
            profile.id
        )));
    }
    profile.validate()?;
    put(pool, profile).await
}

/// Stored settings, or the defaults when none were saved yet.
pub async fn get_settings(pool: &SqlitePool) -> StoreResult<AppSettings> {
    Ok(get(pool, APP_SETTINGS_ID).await?.unwrap_or_default())
}

pub async fn put_settings(pool: &SqlitePool, settings: &AppSettings) -> StoreResult<()> {
    if settings.id != APP_SETTINGS_ID {
        return Err(StoreError::Invalid(format!(
            "settings id must be '{APP_SETTINGS_ID}', got '{}'",
            settings.id
        )));
    }
    put(pool, settings).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{create_pool, memory_pool};
    use crate::models::profile::SkillItem;
    use crate::models::settings::ProviderKind;

    fn resume(id: &str, created: i64) -> ResumeVersion {
        ResumeVersion {
            id: id.to_string(),
            created,
            name: format!("Resume {id}"),
            template_id: "classic".to_string(),
            custom_code: None,
            tailored_content: Default::default(),
            canvas: None,
            meta: Default::default(),
        }
    }

    #[tokio::test]
    async fn test_crud_cycle() {
        let pool = memory_pool().await;
        assert!(get::<ResumeVersion>(&pool, "r1").await.unwrap().is_none());

        put(&pool, &resume("r1", 1)).await.unwrap();
        let mut updated = resume("r1", 1);
        updated.name = "Renamed".into();
        put(&pool, &updated).await.unwrap();

        let loaded: ResumeVersion = get(&pool, "r1").await.unwrap().unwrap();
        assert_eq!(loaded.name, "Renamed");

        assert!(delete::<ResumeVersion>(&pool, "r1").await.unwrap());
        assert!(!delete::<ResumeVersion>(&pool, "r1").await.unwrap());
    }

    #[tokio::test]
    async fn test_list_is_newest_first() {
        let pool = memory_pool().await;
        put(&pool, &resume("old", 10)).await.unwrap();
        put(&pool, &resume("new", 30)).await.unwrap();
        put(&pool, &resume("mid", 20)).await.unwrap();
        let ids: Vec<String> = list::<ResumeVersion>(&pool)
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(ids, vec!["new", "mid", "old"]);
    }

    #[tokio::test]
    async fn test_empty_id_is_rejected() {
        let pool = memory_pool().await;
        let err = put(&pool, &resume("", 1)).await.unwrap_err();
        assert!(matches!(err, StoreError::Invalid(_)));
    }

    #[tokio::test]
    async fn test_put_profile_enforces_invariants() {
        let pool = memory_pool().await;
        let mut profile = Profile::default();
        profile.skills = vec![
            SkillItem {
                id: "s".into(),
                ..Default::default()
            },
            SkillItem {
                id: "s".into(),
                ..Default::default()
            },
        ];
        assert!(matches!(
            put_profile(&pool, &profile).await,
            Err(StoreError::Invalid(_))
        ));
        assert!(get_profile(&pool).await.unwrap().is_none());

        profile.skills.pop();
        put_profile(&pool, &profile).await.unwrap();
        assert_eq!(get_profile(&pool).await.unwrap(), Some(profile));
    }

    #[tokio::test]
    async fn test_profile_id_is_fixed() {
        let pool = memory_pool().await;
        let profile = Profile {
            id: "other".into(),
            ..Default::default()
        };
        assert!(put_profile(&pool, &profile).await.is_err());
    }

    #[tokio::test]
    async fn test_settings_default_until_saved() {
        let pool = memory_pool().await;
        assert_eq!(get_settings(&pool).await.unwrap(), AppSettings::default());

        let mut settings = AppSettings::default();
        settings.active_provider = ProviderKind::OpenRouter;
        put_settings(&pool, &settings).await.unwrap();
        assert_eq!(
            get_settings(&pool).await.unwrap().active_provider,
            ProviderKind::OpenRouter
        );
    }

    #[tokio::test]
    async fn test_corrupt_record_is_reported() {
        let pool = memory_pool().await;
        sqlx::query("INSERT INTO resumes (id, sort_key, data) VALUES ('bad', 0, 'not json')")
            .execute(&pool)
            .await
            .unwrap();
        let err = get::<ResumeVersion>(&pool, "bad").await.unwrap_err();
        assert!(matches!(err, StoreError::Corrupt { table: "resumes", .. }));
    }

    #[tokio::test]
    async fn test_profile_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let url = format!("sqlite://{}?mode=rwc", dir.path().join("p.db").display());

        let pool = create_pool(&url).await.unwrap();
        let mut profile = Profile::default();
        profile.basics.first_name = "Ada".into();
        put_profile(&pool, &profile).await.unwrap();
        pool.close().await;

        let pool = create_pool(&url).await.unwrap();
        let loaded = get_profile(&pool).await.unwrap().unwrap();
        assert_eq!(loaded.basics.first_name, "Ada");
    }
}
