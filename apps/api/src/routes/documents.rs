// CRUD over saved résumés, custom templates and canvas designs.

use std::collections::BTreeMap;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::Value;

use crate::errors::AppError;
use crate::models::now_millis;
use crate::models::profile::new_item_id;
use crate::models::resume::{CanvasItem, CreativeDesign, CustomTemplate, ResumeVersion};
use crate::state::AppState;
use crate::store::{self, Document};

async fn fetch<T: Document>(state: &AppState, id: &str, what: &str) -> Result<T, AppError> {
    store::get(&state.db, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("{what} {id} not found")))
}

fn check_path_id<T: Document>(path_id: &str, doc: &T) -> Result<(), AppError> {
    if doc.id() != path_id {
        return Err(AppError::Validation(format!(
            "Body id '{}' does not match path id '{path_id}'",
            doc.id()
        )));
    }
    Ok(())
}

async fn remove<T: Document>(state: &AppState, id: &str, what: &str) -> Result<StatusCode, AppError> {
    if store::delete::<T>(&state.db, id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound(format!("{what} {id} not found")))
    }
}

// ── Résumé versions ─────────────────────────────────────────────────────────

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewResume {
    pub name: String,
    pub template_id: String,
    #[serde(default)]
    pub custom_code: Option<String>,
    #[serde(default)]
    pub meta: BTreeMap<String, Value>,
}

/// GET /api/v1/resumes
pub async fn handle_list_resumes(
    State(state): State<AppState>,
) -> Result<Json<Vec<ResumeVersion>>, AppError> {
    Ok(Json(store::list(&state.db).await?))
}

/// POST /api/v1/resumes
pub async fn handle_create_resume(
    State(state): State<AppState>,
    Json(req): Json<NewResume>,
) -> Result<(StatusCode, Json<ResumeVersion>), AppError> {
    let resume = ResumeVersion {
        id: new_item_id(),
        created: now_millis(),
        name: req.name,
        template_id: req.template_id,
        custom_code: req.custom_code,
        tailored_content: Default::default(),
        canvas: None,
        meta: req.meta,
    };
    store::put(&state.db, &resume).await?;
    Ok((StatusCode::CREATED, Json(resume)))
}

/// GET /api/v1/resumes/:id
pub async fn handle_get_resume(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<ResumeVersion>, AppError> {
    Ok(Json(fetch(&state, &id, "Resume").await?))
}

/// PUT /api/v1/resumes/:id
pub async fn handle_put_resume(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(resume): Json<ResumeVersion>,
) -> Result<Json<ResumeVersion>, AppError> {
    check_path_id(&id, &resume)?;
    store::put(&state.db, &resume).await?;
    Ok(Json(resume))
}

/// DELETE /api/v1/resumes/:id
pub async fn handle_delete_resume(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    remove::<ResumeVersion>(&state, &id, "Resume").await
}

// ── Custom templates ────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct NewTemplate {
    pub name: String,
    pub code: String,
}

/// GET /api/v1/templates
pub async fn handle_list_templates(
    State(state): State<AppState>,
) -> Result<Json<Vec<CustomTemplate>>, AppError> {
    Ok(Json(store::list(&state.db).await?))
}

/// POST /api/v1/templates
pub async fn handle_create_template(
    State(state): State<AppState>,
    Json(req): Json<NewTemplate>,
) -> Result<(StatusCode, Json<CustomTemplate>), AppError> {
    let now = now_millis();
    let template = CustomTemplate {
        id: new_item_id(),
        name: req.name,
        code: req.code,
        created: now,
        updated: now,
    };
    store::put(&state.db, &template).await?;
    Ok((StatusCode::CREATED, Json(template)))
}

/// GET /api/v1/templates/:id
pub async fn handle_get_template(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<CustomTemplate>, AppError> {
    Ok(Json(fetch(&state, &id, "Template").await?))
}

/// PUT /api/v1/templates/:id
pub async fn handle_put_template(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(mut template): Json<CustomTemplate>,
) -> Result<Json<CustomTemplate>, AppError> {
    check_path_id(&id, &template)?;
    template.updated = now_millis();
    store::put(&state.db, &template).await?;
    Ok(Json(template))
}

/// DELETE /api/v1/templates/:id
pub async fn handle_delete_template(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    remove::<CustomTemplate>(&state, &id, "Template").await
}

// ── Creative designs ────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct NewDesign {
    pub name: String,
    #[serde(default)]
    pub items: Vec<CanvasItem>,
}

/// GET /api/v1/designs
pub async fn handle_list_designs(
    State(state): State<AppState>,
) -> Result<Json<Vec<CreativeDesign>>, AppError> {
    Ok(Json(store::list(&state.db).await?))
}

/// POST /api/v1/designs
pub async fn handle_create_design(
    State(state): State<AppState>,
    Json(req): Json<NewDesign>,
) -> Result<(StatusCode, Json<CreativeDesign>), AppError> {
    let design = CreativeDesign {
        id: new_item_id(),
        name: req.name,
        items: req.items,
        updated: now_millis(),
    };
    store::put(&state.db, &design).await?;
    Ok((StatusCode::CREATED, Json(design)))
}

/// GET /api/v1/designs/:id
pub async fn handle_get_design(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<CreativeDesign>, AppError> {
    Ok(Json(fetch(&state, &id, "Design").await?))
}

/// PUT /api/v1/designs/:id
pub async fn handle_put_design(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(mut design): Json<CreativeDesign>,
) -> Result<Json<CreativeDesign>, AppError> {
    check_path_id(&id, &design)?;
    design.updated = now_millis();
    store::put(&state.db, &design).await?;
    Ok(Json(design))
}

/// DELETE /api/v1/designs/:id
pub async fn handle_delete_design(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    remove::<CreativeDesign>(&state, &id, "Design").await
}
