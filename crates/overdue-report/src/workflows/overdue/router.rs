use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;

use super::domain::{SearchRequest, ValidationError};
use super::registry::RegistryApi;
use super::service::{ReportService, ReportServiceError};
use super::store::BlobStore;
use super::writer::REPORT_CONTENT_TYPE;

/// Router builder exposing report generation and download.
pub fn report_router<R, S>(service: Arc<ReportService<R, S>>) -> Router
where
    R: RegistryApi + 'static,
    S: BlobStore + 'static,
{
    Router::new()
        .route("/search-companies", post(search_handler::<R, S>))
        .route("/download-report/:filename", get(download_handler::<R, S>))
        .with_state(service)
}

pub(crate) async fn search_handler<R, S>(
    State(service): State<Arc<ReportService<R, S>>>,
    payload: Result<Json<SearchRequest>, JsonRejection>,
) -> Response
where
    R: RegistryApi + 'static,
    S: BlobStore + 'static,
{
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => {
            let error = ValidationError::InvalidRequest(rejection.body_text());
            return error_response(StatusCode::BAD_REQUEST, error.to_string());
        }
    };

    match service.search(request).await {
        Ok(outcome) => (StatusCode::OK, Json(outcome)).into_response(),
        Err(ReportServiceError::Validation(error)) => {
            error_response(StatusCode::BAD_REQUEST, error.to_string())
        }
        Err(other) => error_response(StatusCode::INTERNAL_SERVER_ERROR, other.to_string()),
    }
}

pub(crate) async fn download_handler<R, S>(
    State(service): State<Arc<ReportService<R, S>>>,
    Path(filename): Path<String>,
) -> Response
where
    R: RegistryApi + 'static,
    S: BlobStore + 'static,
{
    match service.download(&filename).await {
        Ok(bytes) => (
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, REPORT_CONTENT_TYPE.to_string()),
                (
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename=\"{filename}\""),
                ),
            ],
            bytes,
        )
            .into_response(),
        Err(error) if error.is_not_found() => {
            error_response(StatusCode::NOT_FOUND, "File not found.".to_string())
        }
        Err(other) => error_response(StatusCode::INTERNAL_SERVER_ERROR, other.to_string()),
    }
}

fn error_response(status: StatusCode, message: String) -> Response {
    let payload = json!({
        "status": "error",
        "message": message,
    });
    (status, Json(payload)).into_response()
}
