use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde::Serialize;
use thiserror::Error;

use crate::services::{model_service::ModelError, text_extractor::ExtractError};

#[derive(Debug, Clone, Error)]
pub enum AppError {
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("Corrupt document: {0}")]
    CorruptDocument(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Generation failed: {0}")]
    GenerationFailed(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Internal server error: {0}")]
    InternalError(String),
}

impl AppError {
    pub fn error_code(&self) -> &'static str {
        match self {
            AppError::UnsupportedFormat(_) => "UNSUPPORTED_FORMAT",
            AppError::CorruptDocument(_) => "CORRUPT_DOCUMENT",
            AppError::ValidationError(_) => "VALIDATION_ERROR",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::GenerationFailed(_) => "GENERATION_FAILED",
            AppError::DatabaseError(_) => "DATABASE_ERROR",
            AppError::InternalError(_) => "INTERNAL_ERROR",
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: u16,
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::UnsupportedFormat(_) => StatusCode::BAD_REQUEST,
            AppError::CorruptDocument(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::GenerationFailed(_) => StatusCode::BAD_GATEWAY,
            AppError::DatabaseError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        if self.status_code().is_server_error() {
            log::error!("[{}] {}", self.error_code(), self);
        }
        HttpResponse::build(self.status_code()).json(ErrorResponse {
            error: self.to_string(),
            code: self.status_code().as_u16(),
        })
    }
}

impl From<mongodb::error::Error> for AppError {
    fn from(err: mongodb::error::Error) -> Self {
        AppError::DatabaseError(err.to_string())
    }
}
impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::ValidationError(err.to_string())
    }
}
impl From<ExtractError> for AppError {
    fn from(err: ExtractError) -> Self {
        match err {
            ExtractError::UnsupportedFormat(msg) => AppError::UnsupportedFormat(msg),
            ExtractError::CorruptDocument(msg) => AppError::CorruptDocument(msg),
            ExtractError::TooLarge { .. } => AppError::ValidationError(err.to_string()),
            ExtractError::Io(err) => AppError::InternalError(err.to_string()),
        }
    }
}
impl From<ModelError> for AppError {
    fn from(err: ModelError) -> Self {
        AppError::GenerationFailed(err.to_string())
    }
}
impl From<actix_multipart::MultipartError> for AppError {
    fn from(err: actix_multipart::MultipartError) -> Self {
        AppError::ValidationError(format!("Invalid multipart upload: {}", err))
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_error_status_codes() {
        assert_eq!(
            AppError::UnsupportedFormat("test".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::CorruptDocument("test".into()).status_code(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            AppError::NotFound("test".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::GenerationFailed("test".into()).status_code(),
            StatusCode::BAD_GATEWAY
        );
    }

    #[test]
    fn test_error_messages() {
        let err = AppError::NotFound("run 4".into());
        assert_eq!(err.to_string(), "Not found: run 4");
    }

    #[test]
    fn test_model_error_becomes_generation_failed() {
        let err: AppError = ModelError::Timeout(Duration::from_secs(3)).into();
        assert!(matches!(err, AppError::GenerationFailed(_)));
        assert_eq!(err.error_code(), "GENERATION_FAILED");
    }

    #[test]
    fn test_extract_error_keeps_its_kind() {
        let unsupported: AppError = ExtractError::UnsupportedFormat("not a zip".into()).into();
        let corrupt: AppError = ExtractError::CorruptDocument("bad xml".into()).into();

        assert!(matches!(unsupported, AppError::UnsupportedFormat(_)));
        assert!(matches!(corrupt, AppError::CorruptDocument(_)));
    }

    #[actix_web::test]
    async fn test_error_response_body_has_error_key() {
        let resp = AppError::UnsupportedFormat("Only .docx files allowed".into()).error_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let body = actix_web::body::to_bytes(resp.into_body()).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["error"], "Unsupported format: Only .docx files allowed");
        assert_eq!(json["code"], 400);
    }
}
