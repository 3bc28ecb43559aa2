use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::document::{
    cover_letter_document, cover_letter_file_name, resume_document, resume_file_name,
    CoverLetterData,
};
use crate::errors::AppError;
use crate::models::resume::ResumeVersion;
use crate::state::AppState;
use crate::store::{self, get_profile};
use crate::tailoring::tailor_resume;
use crate::template::render_template;

#[derive(Deserialize)]
pub struct RenderRequest {
    pub template: String,
    /// Rendering context. Defaults to `{ "profile": <master profile> }`.
    #[serde(default)]
    pub data: Option<Value>,
}

#[derive(Serialize)]
pub struct RenderResponse {
    pub html: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportResponse {
    pub file_name: String,
    pub document: Value,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TailorRequest {
    pub job_description: String,
}

async fn profile_context(state: &AppState) -> Result<Value, AppError> {
    let profile = get_profile(&state.db).await?.unwrap_or_default();
    Ok(json!({ "profile": profile }))
}

/// POST /api/v1/render
pub async fn handle_render(
    State(state): State<AppState>,
    Json(req): Json<RenderRequest>,
) -> Result<Json<RenderResponse>, AppError> {
    let data = match req.data {
        Some(data) => data,
        None => profile_context(&state).await?,
    };
    Ok(Json(RenderResponse {
        html: render_template(&req.template, &data),
    }))
}

/// GET /api/v1/resumes/:id/render
/// Renders the résumé's custom code with `{ profile, resume }` in scope.
pub async fn handle_render_resume(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<RenderResponse>, AppError> {
    let resume: ResumeVersion = store::get(&state.db, &id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Resume {id} not found")))?;
    let code = resume
        .custom_code
        .as_deref()
        .filter(|c| !c.is_empty())
        .ok_or_else(|| AppError::Validation(format!("Resume {id} has no custom template code")))?;

    let mut data = profile_context(&state).await?;
    data["resume"] = serde_json::to_value(&resume).map_err(anyhow::Error::from)?;
    Ok(Json(RenderResponse {
        html: render_template(code, &data),
    }))
}

/// POST /api/v1/resumes/:id/tailor
pub async fn handle_tailor_resume(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<TailorRequest>,
) -> Result<Json<ResumeVersion>, AppError> {
    let resume = tailor_resume(&state.db, &state.llm, &id, &req.job_description).await?;
    Ok(Json(resume))
}

/// GET /api/v1/export/:template_id
pub async fn handle_export_resume(
    State(state): State<AppState>,
    Path(template_id): Path<String>,
) -> Result<Json<ExportResponse>, AppError> {
    let profile = get_profile(&state.db).await?.unwrap_or_default();
    Ok(Json(ExportResponse {
        file_name: resume_file_name(&profile.basics),
        document: resume_document(&profile, &template_id),
    }))
}

/// POST /api/v1/export/cover-letter
pub async fn handle_export_cover_letter(
    State(state): State<AppState>,
    Json(data): Json<CoverLetterData>,
) -> Result<Json<ExportResponse>, AppError> {
    let profile = get_profile(&state.db).await?.unwrap_or_default();
    let today = chrono::Local::now().date_naive();
    Ok(Json(ExportResponse {
        file_name: cover_letter_file_name(&profile.basics),
        document: cover_letter_document(&profile, &data, today),
    }))
}
