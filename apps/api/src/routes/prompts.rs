use axum::{
    extract::{Path, State},
    Json,
};
use serde_json::{json, Value};

use crate::errors::AppError;
use crate::models::prompt::PromptTemplate;
use crate::state::AppState;
use crate::store::prompts::{get_prompt, list_prompts, put_prompt, reset_default_prompts};

/// GET /api/v1/prompts
pub async fn handle_list_prompts(
    State(state): State<AppState>,
) -> Result<Json<Vec<PromptTemplate>>, AppError> {
    Ok(Json(list_prompts(&state.db).await?))
}

/// GET /api/v1/prompts/:id
pub async fn handle_get_prompt(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<PromptTemplate>, AppError> {
    get_prompt(&state.db, &id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Prompt {id} not found")))
}

/// PUT /api/v1/prompts/:id
/// Saved prompts become custom and are skipped by resets.
pub async fn handle_put_prompt(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(mut prompt): Json<PromptTemplate>,
) -> Result<Json<PromptTemplate>, AppError> {
    prompt.id = id;
    Ok(Json(put_prompt(&state.db, &prompt).await?))
}

/// POST /api/v1/prompts/reset
pub async fn handle_reset_prompts(State(state): State<AppState>) -> Result<Json<Value>, AppError> {
    let reset = reset_default_prompts(&state.db).await?;
    Ok(Json(json!({ "reset": reset })))
}
