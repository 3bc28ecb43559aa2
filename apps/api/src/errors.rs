use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::llm_client::LlmError;
use crate::store::StoreError;
use crate::tailoring::TailorError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Storage error: {0}")]
    Store(#[from] StoreError),

    #[error("Provider error: {0}")]
    Llm(#[from] LlmError),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl From<TailorError> for AppError {
    fn from(e: TailorError) -> Self {
        match e {
            TailorError::ResumeNotFound(id) => AppError::NotFound(format!("Resume {id} not found")),
            TailorError::EmptyJobDescription => AppError::Validation(e.to_string()),
            TailorError::PromptMissing(_) => AppError::Internal(anyhow::anyhow!(e.to_string())),
            TailorError::Llm(e) => AppError::Llm(e),
            TailorError::Store(e) => AppError::Store(e),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::Store(StoreError::Invalid(msg)) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
            }
            AppError::Store(e) => {
                tracing::error!("Storage error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "DATABASE_ERROR",
                    "A database error occurred".to_string(),
                )
            }
            AppError::Llm(e @ LlmError::MissingKey(_)) => {
                (StatusCode::BAD_REQUEST, "PROVIDER_NOT_CONFIGURED", e.to_string())
            }
            AppError::Llm(LlmError::Store(e)) => {
                tracing::error!("Storage error: {e}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "DATABASE_ERROR",
                    "A database error occurred".to_string(),
                )
            }
            AppError::Llm(e) => {
                tracing::error!("Provider error: {e}");
                (StatusCode::BAD_GATEWAY, "PROVIDER_ERROR", e.user_message())
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": {
                "code": code,
                "message": message
            }
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::settings::ProviderKind;

    fn status_of(e: AppError) -> StatusCode {
        e.into_response().status()
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(status_of(AppError::NotFound("x".into())), StatusCode::NOT_FOUND);
        assert_eq!(
            status_of(AppError::Store(StoreError::Invalid("dup".into()))),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(AppError::Llm(LlmError::MissingKey(ProviderKind::OpenAi))),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            status_of(AppError::Llm(LlmError::Api {
                status: 401,
                message: "bad key".into()
            })),
            StatusCode::BAD_GATEWAY
        );
    }

    #[test]
    fn test_tailor_errors_map() {
        assert!(matches!(
            AppError::from(TailorError::ResumeNotFound("r".into())),
            AppError::NotFound(_)
        ));
        assert!(matches!(
            AppError::from(TailorError::EmptyJobDescription),
            AppError::Validation(_)
        ));
    }
}
