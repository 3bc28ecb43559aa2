use axum::{extract::State, Json};

use crate::errors::AppError;
use crate::models::profile::{Profile, MASTER_PROFILE_ID};
use crate::models::settings::{AppSettings, APP_SETTINGS_ID};
use crate::state::AppState;
use crate::store::{get_profile, get_settings, put_profile, put_settings};

/// GET /api/v1/profile
/// An empty profile is returned until one is saved.
pub async fn handle_get_profile(State(state): State<AppState>) -> Result<Json<Profile>, AppError> {
    Ok(Json(get_profile(&state.db).await?.unwrap_or_default()))
}

/// PUT /api/v1/profile
pub async fn handle_put_profile(
    State(state): State<AppState>,
    Json(mut profile): Json<Profile>,
) -> Result<Json<Profile>, AppError> {
    profile.id = MASTER_PROFILE_ID.to_string();
    profile.assign_missing_ids();
    put_profile(&state.db, &profile).await?;
    Ok(Json(profile))
}

/// GET /api/v1/settings
pub async fn handle_get_settings(
    State(state): State<AppState>,
) -> Result<Json<AppSettings>, AppError> {
    Ok(Json(get_settings(&state.db).await?))
}

/// PUT /api/v1/settings
pub async fn handle_put_settings(
    State(state): State<AppState>,
    Json(mut settings): Json<AppSettings>,
) -> Result<Json<AppSettings>, AppError> {
    settings.id = APP_SETTINGS_ID.to_string();
    put_settings(&state.db, &settings).await?;
    Ok(Json(settings))
}
