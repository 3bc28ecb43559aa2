pub mod documents;
pub mod health;
pub mod profile;
pub mod prompts;
pub mod providers;
pub mod render;

use axum::{
    routing::{get, post},
    Router,
};

use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Profile and settings singletons
        .route(
            "/api/v1/profile",
            get(profile::handle_get_profile).put(profile::handle_put_profile),
        )
        .route(
            "/api/v1/settings",
            get(profile::handle_get_settings).put(profile::handle_put_settings),
        )
        // Saved résumés
        .route(
            "/api/v1/resumes",
            get(documents::handle_list_resumes).post(documents::handle_create_resume),
        )
        .route(
            "/api/v1/resumes/:id",
            get(documents::handle_get_resume)
                .put(documents::handle_put_resume)
                .delete(documents::handle_delete_resume),
        )
        .route(
            "/api/v1/resumes/:id/tailor",
            post(render::handle_tailor_resume),
        )
        .route(
            "/api/v1/resumes/:id/render",
            get(render::handle_render_resume),
        )
        // Custom templates and canvas designs
        .route(
            "/api/v1/templates",
            get(documents::handle_list_templates).post(documents::handle_create_template),
        )
        .route(
            "/api/v1/templates/:id",
            get(documents::handle_get_template)
                .put(documents::handle_put_template)
                .delete(documents::handle_delete_template),
        )
        .route(
            "/api/v1/designs",
            get(documents::handle_list_designs).post(documents::handle_create_design),
        )
        .route(
            "/api/v1/designs/:id",
            get(documents::handle_get_design)
                .put(documents::handle_put_design)
                .delete(documents::handle_delete_design),
        )
        // Prompt vault
        .route("/api/v1/prompts", get(prompts::handle_list_prompts))
        .route("/api/v1/prompts/reset", post(prompts::handle_reset_prompts))
        .route(
            "/api/v1/prompts/:id",
            get(prompts::handle_get_prompt).put(prompts::handle_put_prompt),
        )
        // Rendering and export
        .route("/api/v1/render", post(render::handle_render))
        .route(
            "/api/v1/export/cover-letter",
            post(render::handle_export_cover_letter),
        )
        .route(
            "/api/v1/export/:template_id",
            get(render::handle_export_resume),
        )
        // Providers
        .route(
            "/api/v1/providers/:provider/activate",
            post(providers::handle_activate),
        )
        .route(
            "/api/v1/providers/:provider/complete",
            post(providers::handle_complete),
        )
        .route(
            "/api/v1/providers/:provider/models",
            get(providers::handle_list_models),
        )
        .route(
            "/api/v1/activity",
            get(providers::handle_list_activity).delete(providers::handle_clear_activity),
        )
        .route(
            "/api/v1/notifications",
            get(providers::handle_list_notifications),
        )
        .with_state(state)
}
