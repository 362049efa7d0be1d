//! `POST /analisar`: score one sung performance
//!
//! Multipart form: `audio` (file, required), `titulo` and `artista`
//! (text, required). Field validation itself lives in the pipeline so a
//! rejected request provably has no side effects.

use axum::{
    extract::{Multipart, State},
    routing::post,
    Json, Router,
};
use tracing::debug;

use crate::error::{ApiError, ApiResult};
use crate::services::AnalysisRequest;
use crate::types::AnalysisResponse;
use crate::AppState;

/// POST /analisar
pub async fn analyze(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> ApiResult<Json<AnalysisResponse>> {
    let mut title = String::new();
    let mut artist = String::new();
    let mut audio: Option<Vec<u8>> = None;
    let mut file_name: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|err| ApiError::MissingInput(format!("Requisição multipart inválida: {}", err)))?
    {
        // Field accessors consume the field, so grab the name up front.
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("audio") => {
                file_name = field.file_name().map(str::to_string);
                let bytes = field.bytes().await.map_err(|err| {
                    ApiError::MissingInput(format!("Falha ao ler o arquivo de áudio: {}", err))
                })?;
                audio = Some(bytes.to_vec());
            }
            Some("titulo") => {
                title = field.text().await.map_err(|err| {
                    ApiError::MissingInput(format!("Campo 'titulo' inválido: {}", err))
                })?;
            }
            Some("artista") => {
                artist = field.text().await.map_err(|err| {
                    ApiError::MissingInput(format!("Campo 'artista' inválido: {}", err))
                })?;
            }
            other => {
                debug!(field = ?other, "Ignoring unknown multipart field");
            }
        }
    }

    let request = AnalysisRequest {
        title,
        artist,
        audio,
        file_name,
    };

    let response = state.pipeline.analyze(request).await?;
    Ok(Json(response))
}

/// Build analysis routes
pub fn analyze_routes() -> Router<AppState> {
    Router::new().route("/analisar", post(analyze))
}
