//! Error types for cantoria.
//!
//! The taxonomy maps 1:1 onto the HTTP surface: missing input (400),
//! lyrics not found (404), conversion failure (500), internal pipeline
//! failure (500). Response bodies carry the legacy `{"erro": ...}` shape.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Required request input absent or empty (400)
    #[error("Missing input: {0}")]
    MissingInput(String),

    /// No lyrics could be resolved for the requested song (404)
    #[error("Lyrics not found for: {0}")]
    LyricsNotFound(String),

    /// External audio conversion failed (500)
    #[error("Audio conversion failed: {0}")]
    ConversionFailure(String),

    /// Catch-all for provider failures inside the pipeline (500)
    #[error("Internal pipeline error: {0}")]
    Internal(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        // User-facing messages keep the wording the legacy clients expect.
        let (status, message) = match self {
            ApiError::MissingInput(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::LyricsNotFound(_) => (
                StatusCode::NOT_FOUND,
                "Não encontramos a letra dessa música.".to_string(),
            ),
            ApiError::ConversionFailure(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "O servidor falhou ao converter o formato do áudio.".to_string(),
            ),
            ApiError::Internal(msg) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Erro interno no servidor: {}", msg),
            ),
            ApiError::Io(ref err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Erro interno no servidor: {}", err),
            ),
        };

        let body = Json(json!({ "erro": message }));

        (status, body).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
