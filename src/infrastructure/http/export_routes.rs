//! Export API routes

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header, HeaderName, StatusCode},
    response::{IntoResponse, Response},
    Json,
};

use crate::application::dto::{ErrorResponseDto, ExportRequestDto};
use crate::application::services::{ExportError, ExportOutcome};
use crate::infrastructure::state::AppState;

/// Number of records left out for missing or invalid coordinates
pub const DROPPED_RECORDS_HEADER: &str = "x-export-dropped-records";

/// Export the selected map layers as a downloadable file
///
/// Encoding runs on the blocking pool; the response is only sent once the
/// whole file has been serialized.
pub async fn export_map(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ExportRequestDto>, JsonRejection>,
) -> Response {
    let Json(request) = match payload {
        Ok(request) => request,
        Err(rejection) => {
            tracing::warn!("Rejected export request: {}", rejection.body_text());
            return (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponseDto::new("Invalid request", rejection.body_text())),
            )
                .into_response();
        }
    };

    let service = state.export_service.clone();
    let result = tokio::task::spawn_blocking(move || service.export(&request))
        .await
        .unwrap_or_else(|e| Err(ExportError::Failed(anyhow::anyhow!("Export task failed: {}", e))));

    match result {
        Ok(outcome) => {
            tracing::debug!(format = %outcome.format, "Sending export file");
            file_response(outcome)
        }
        Err(e) => error_response(e),
    }
}

fn file_response(outcome: ExportOutcome) -> Response {
    let ExportOutcome {
        payload, dropped, ..
    } = outcome;

    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, payload.content_type.to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", payload.filename),
            ),
            (
                HeaderName::from_static(DROPPED_RECORDS_HEADER),
                dropped.total().to_string(),
            ),
        ],
        payload.bytes,
    )
        .into_response()
}

fn error_response(error: ExportError) -> Response {
    let (status, body) = match &error {
        ExportError::UnsupportedFormat(e) => {
            tracing::warn!("{}", e);
            (
                StatusCode::BAD_REQUEST,
                ErrorResponseDto::new("Unsupported format", e.to_string()),
            )
        }
        ExportError::TooLarge { .. } => {
            tracing::warn!("{}", error);
            (
                StatusCode::PAYLOAD_TOO_LARGE,
                ErrorResponseDto::new("Export too large", error.to_string()),
            )
        }
        ExportError::Failed(e) => {
            tracing::error!("Export failed: {:#}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                ErrorResponseDto::new("Server error", "Failed to generate export file")
                    .with_details(error.to_string()),
            )
        }
    };
    (status, Json(body)).into_response()
}
