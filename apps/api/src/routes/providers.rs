use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::errors::AppError;
use crate::llm_client::activation::{fetch_models, generate, validate_and_activate};
use crate::llm_client::{LlmError, ModelInfo};
use crate::models::activity::ActivityLog;
use crate::models::settings::ProviderKind;
use crate::notifications::Notification;
use crate::state::AppState;
use crate::store::activity::{clear_activity, list_activity};
use crate::store::get_settings;

const DEFAULT_ACTIVITY_LIMIT: i64 = 100;

#[derive(Deserialize)]
pub struct ActivateRequest {
    pub key: String,
    pub model: String,
}

#[derive(Serialize)]
pub struct ActivateResponse {
    pub provider: ProviderKind,
    pub activated: bool,
}

#[derive(Deserialize)]
pub struct CompleteRequest {
    pub system: String,
    pub user: String,
    #[serde(default)]
    pub model: Option<String>,
}

#[derive(Serialize)]
pub struct CompleteResponse {
    pub content: String,
}

#[derive(Deserialize)]
pub struct ModelsQuery {
    /// Defaults to the stored key.
    pub key: Option<String>,
}

#[derive(Deserialize)]
pub struct ActivityQuery {
    pub limit: Option<i64>,
}

/// POST /api/v1/providers/:provider/activate
/// The outcome message is published to the notification list.
pub async fn handle_activate(
    State(state): State<AppState>,
    Path(provider): Path<ProviderKind>,
    Json(req): Json<ActivateRequest>,
) -> Result<Json<ActivateResponse>, AppError> {
    if req.key.trim().is_empty() || req.model.trim().is_empty() {
        return Err(AppError::Validation("key and model are required".to_string()));
    }
    let activated =
        validate_and_activate(&state.db, &state.llm, provider, req.key.trim(), req.model.trim())
            .await;
    Ok(Json(ActivateResponse {
        provider,
        activated,
    }))
}

/// POST /api/v1/providers/:provider/complete
pub async fn handle_complete(
    State(state): State<AppState>,
    Path(provider): Path<ProviderKind>,
    Json(req): Json<CompleteRequest>,
) -> Result<Json<CompleteResponse>, AppError> {
    let content = generate(
        &state.db,
        &state.llm,
        provider,
        &req.system,
        &req.user,
        req.model.as_deref(),
    )
    .await?;
    Ok(Json(CompleteResponse { content }))
}

/// GET /api/v1/providers/:provider/models
pub async fn handle_list_models(
    State(state): State<AppState>,
    Path(provider): Path<ProviderKind>,
    Query(query): Query<ModelsQuery>,
) -> Result<Json<Vec<ModelInfo>>, AppError> {
    let key = match query.key.filter(|k| !k.is_empty()) {
        Some(key) => key,
        None => get_settings(&state.db).await?.providers.get(provider).key.clone(),
    };
    if key.is_empty() {
        return Err(LlmError::MissingKey(provider).into());
    }
    Ok(Json(fetch_models(&state.llm, provider, &key).await?))
}

/// GET /api/v1/activity
pub async fn handle_list_activity(
    State(state): State<AppState>,
    Query(query): Query<ActivityQuery>,
) -> Result<Json<Vec<ActivityLog>>, AppError> {
    let limit = query.limit.unwrap_or(DEFAULT_ACTIVITY_LIMIT).clamp(1, 1000);
    Ok(Json(list_activity(&state.db, limit).await?))
}

/// DELETE /api/v1/activity
pub async fn handle_clear_activity(State(state): State<AppState>) -> Result<Json<Value>, AppError> {
    let deleted = clear_activity(&state.db).await?;
    Ok(Json(json!({ "deleted": deleted })))
}

/// GET /api/v1/notifications
pub async fn handle_list_notifications(State(state): State<AppState>) -> Json<Vec<Notification>> {
    Json(state.notifications.list())
}
