use sqlx::SqlitePool;
use tracing::{info, warn};

use crate::llm_client::prompts::HELLO_JSON;
use crate::llm_client::{LlmClient, LlmError};
use crate::models::settings::{ProviderCredentials, ProviderKind};
use crate::notifications::NotificationKind;
use crate::store::prompts::get_prompt;
use crate::store::{get_settings, put_settings};

/// Verifies `key` with the handshake prompt and, on success, stores the key
/// and model and makes `provider` the active one. Progress and the final
/// verdict go to the notification sink.
pub async fn validate_and_activate(
    pool: &SqlitePool,
    llm: &LlmClient,
    provider: ProviderKind,
    key: &str,
    model: &str,
) -> bool {
    let notifier = llm.notifier();
    let toast = notifier.add(
        &format!("Initializing {} Activation...", provider.display_name()),
        NotificationKind::Loading,
    );

    match activate(pool, llm, provider, key, model, &toast).await {
        Ok(()) => {
            info!("{provider} activated with model {model}");
            notifier.update(
                &toast,
                &format!(
                    "{} Activated! Connection successful.",
                    provider.display_name()
                ),
                Some(NotificationKind::Success),
            );
            true
        }
        Err(e) => {
            warn!("{provider} activation failed: {e}");
            notifier.update(
                &toast,
                &format!(
                    "{} Activation Failed: {}",
                    provider.display_name(),
                    e.user_message()
                ),
                Some(NotificationKind::Error),
            );
            false
        }
    }
}

async fn activate(
    pool: &SqlitePool,
    llm: &LlmClient,
    provider: ProviderKind,
    key: &str,
    model: &str,
    toast: &str,
) -> Result<(), LlmError> {
    let notifier = llm.notifier();

    notifier.update(toast, "Fetching verification prompt...", None);
    let prompt = get_prompt(pool, HELLO_JSON)
        .await?
        .ok_or(LlmError::PromptMissing)?;

    notifier.update(
        toast,
        &format!("Connecting to {} ({model})...", provider.display_name()),
        None,
    );
    llm.handshake(
        provider,
        key,
        model,
        &prompt.system_prompt,
        &prompt.user_prompt_template,
    )
    .await?;

    let mut settings = get_settings(pool).await?;
    *settings.providers.get_mut(provider) = ProviderCredentials {
        key: key.to_string(),
        model: model.to_string(),
    };
    settings.active_provider = provider;
    put_settings(pool, &settings).await?;
    Ok(())
}

/// Runs a completion with the key stored for `provider`. `model` falls back
/// to the stored model when absent or blank.
pub async fn generate(
    pool: &SqlitePool,
    llm: &LlmClient,
    provider: ProviderKind,
    system: &str,
    user: &str,
    model: Option<&str>,
) -> Result<String, LlmError> {
    let settings = get_settings(pool).await?;
    let credentials = settings.providers.get(provider);
    if credentials.key.is_empty() {
        return Err(LlmError::MissingKey(provider));
    }
    let model = model
        .filter(|m| !m.trim().is_empty())
        .unwrap_or(&credentials.model);

    let notifier = llm.notifier();
    let toast = notifier.add("AI Architect is starting...", NotificationKind::Loading);
    notifier.update(
        &toast,
        &format!("Contacting {} AI...", provider.display_name()),
        None,
    );

    match llm
        .complete(provider, &credentials.key, system, user, model)
        .await
    {
        Ok(content) => {
            notifier.update(
                &toast,
                "Response received! Processing...",
                Some(NotificationKind::Success),
            );
            Ok(content)
        }
        Err(e) => {
            notifier.update(
                &toast,
                &format!("{} Error: {}", provider.display_name(), e.user_message()),
                Some(NotificationKind::Error),
            );
            Err(e)
        }
    }
}

/// Same as [`generate`] against whichever provider is currently active.
pub async fn generate_with_active(
    pool: &SqlitePool,
    llm: &LlmClient,
    system: &str,
    user: &str,
) -> Result<String, LlmError> {
    let provider = get_settings(pool).await?.active_provider;
    generate(pool, llm, provider, system, user, None).await
}

/// Lists a provider's models, reporting progress to the notification sink.
pub async fn fetch_models(
    llm: &LlmClient,
    provider: ProviderKind,
    key: &str,
) -> Result<Vec<crate::llm_client::ModelInfo>, LlmError> {
    let notifier = llm.notifier();
    let toast = notifier.add("Fetching available models...", NotificationKind::Loading);
    match llm.list_models(provider, key).await {
        Ok(models) => {
            notifier.update(
                &toast,
                &format!("Found {} models", models.len()),
                Some(NotificationKind::Success),
            );
            Ok(models)
        }
        Err(e) => {
            notifier.update(
                &toast,
                &format!("Failed to fetch models: {}", e.user_message()),
                Some(NotificationKind::Error),
            );
            Err(e)
        }
    }
}
