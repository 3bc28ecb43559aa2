use sqlx::SqlitePool;
use tracing::info;

use crate::llm_client::prompts::default_prompts;
use crate::models::now_millis;
use crate::models::prompt::PromptTemplate;
use crate::store::{self, StoreResult};

pub async fn get_prompt(pool: &SqlitePool, id: &str) -> StoreResult<Option<PromptTemplate>> {
    store::get(pool, id).await
}

pub async fn list_prompts(pool: &SqlitePool) -> StoreResult<Vec<PromptTemplate>> {
    store::list(pool).await
}

/// Saves a user edit. The record becomes custom so resets leave it alone.
pub async fn put_prompt(pool: &SqlitePool, prompt: &PromptTemplate) -> StoreResult<PromptTemplate> {
    let saved = PromptTemplate {
        is_custom: true,
        last_updated: now_millis(),
        ..prompt.clone()
    };
    store::put(pool, &saved).await?;
    Ok(saved)
}

/// Inserts built-ins that are not stored yet. Returns how many were added.
pub async fn initialize_prompts(pool: &SqlitePool) -> StoreResult<usize> {
    let mut added = 0;
    for prompt in default_prompts(now_millis()) {
        if store::get::<PromptTemplate>(pool, &prompt.id).await?.is_none() {
            store::put(pool, &prompt).await?;
            added += 1;
        }
    }
    if added > 0 {
        info!("Seeded {added} built-in prompts");
    }
    Ok(added)
}

/// Restores built-ins to their shipped text, skipping custom records.
/// Returns how many were written.
pub async fn reset_default_prompts(pool: &SqlitePool) -> StoreResult<usize> {
    let mut written = 0;
    for prompt in default_prompts(now_millis()) {
        let existing = store::get::<PromptTemplate>(pool, &prompt.id).await?;
        if existing.map_or(false, |p| p.is_custom) {
            continue;
        }
        store::put(pool, &prompt).await?;
        written += 1;
    }
    info!("Reset {written} built-in prompts");
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::memory_pool;
    use crate::llm_client::prompts::{HELLO_JSON, RESUME_TAILOR};

    #[tokio::test]
    async fn test_initialize_only_adds_missing() {
        let pool = memory_pool().await;
        assert_eq!(initialize_prompts(&pool).await.unwrap(), 4);
        assert_eq!(initialize_prompts(&pool).await.unwrap(), 0);
        assert_eq!(list_prompts(&pool).await.unwrap().len(), 4);
    }

    #[tokio::test]
    async fn test_initialize_keeps_edits() {
        let pool = memory_pool().await;
        initialize_prompts(&pool).await.unwrap();
        let mut tailor = get_prompt(&pool, RESUME_TAILOR).await.unwrap().unwrap();
        tailor.system_prompt = "Be brief.".into();
        put_prompt(&pool, &tailor).await.unwrap();

        store::delete::<PromptTemplate>(&pool, HELLO_JSON).await.unwrap();
        assert_eq!(initialize_prompts(&pool).await.unwrap(), 1);
        let tailor = get_prompt(&pool, RESUME_TAILOR).await.unwrap().unwrap();
        assert_eq!(tailor.system_prompt, "Be brief.");
    }

    #[tokio::test]
    async fn test_put_marks_custom() {
        let pool = memory_pool().await;
        initialize_prompts(&pool).await.unwrap();
        let prompt = get_prompt(&pool, HELLO_JSON).await.unwrap().unwrap();
        assert!(!prompt.is_custom);
        let saved = put_prompt(&pool, &prompt).await.unwrap();
        assert!(saved.is_custom);
        assert!(get_prompt(&pool, HELLO_JSON).await.unwrap().unwrap().is_custom);
    }

    #[tokio::test]
    async fn test_reset_skips_custom_prompts() {
        let pool = memory_pool().await;
        initialize_prompts(&pool).await.unwrap();

        let mut tailor = get_prompt(&pool, RESUME_TAILOR).await.unwrap().unwrap();
        tailor.user_prompt_template = "mine".into();
        put_prompt(&pool, &tailor).await.unwrap();

        // A built-in edited behind the vault's back is still restored.
        let mut hello = get_prompt(&pool, HELLO_JSON).await.unwrap().unwrap();
        hello.user_prompt_template = "drifted".into();
        store::put(&pool, &hello).await.unwrap();

        assert_eq!(reset_default_prompts(&pool).await.unwrap(), 3);
        let tailor = get_prompt(&pool, RESUME_TAILOR).await.unwrap().unwrap();
        assert_eq!(tailor.user_prompt_template, "mine");
        let hello = get_prompt(&pool, HELLO_JSON).await.unwrap().unwrap();
        assert_eq!(hello.user_prompt_template, "Return hit in JSON format.");
    }
}
