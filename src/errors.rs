// src/errors.rs
use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum CreatorError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Generative service error: {0}")]
    Transport(String),

    #[error("Response is not valid JSON: {0}")]
    Parse(String),

    #[error("Response field `{field}` is missing or has the wrong type")]
    Schema { field: String },

    #[error("Image processing error: {0}")]
    ImageProcessing(String),

    #[error("Session not found: {0}")]
    SessionNotFound(Uuid),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl CreatorError {
    pub fn schema(field: impl Into<String>) -> Self {
        CreatorError::Schema {
            field: field.into(),
        }
    }

    fn category(&self) -> &'static str {
        match self {
            CreatorError::Validation(_) => "Validation error",
            CreatorError::Transport(_) => "AI service error",
            CreatorError::Parse(_) => "Malformed AI response",
            CreatorError::Schema { .. } => "Invalid AI response",
            CreatorError::ImageProcessing(_) => "Image processing error",
            CreatorError::SessionNotFound(_) => "Session not found",
            CreatorError::Config(_) => "Configuration error",
            CreatorError::Serialization(_) => "Data processing error",
        }
    }
}

impl ResponseError for CreatorError {
    fn status_code(&self) -> StatusCode {
        match self {
            CreatorError::Validation(_) | CreatorError::ImageProcessing(_) => {
                StatusCode::BAD_REQUEST
            }
            CreatorError::SessionNotFound(_) => StatusCode::NOT_FOUND,
            CreatorError::Transport(_) => StatusCode::SERVICE_UNAVAILABLE,
            CreatorError::Parse(_) | CreatorError::Schema { .. } => StatusCode::BAD_GATEWAY,
            CreatorError::Config(_) | CreatorError::Serialization(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(serde_json::json!({
            "error": self.category(),
            "message": self.to_string()
        }))
    }
}
