use axum::extract::{Multipart, Path, State};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use garde::Validate;
use uuid::Uuid;

use crate::app_state::AppState;
use crate::models::batch::{BatchStatusResponse, SubmitRequest, SubmitResponse};
use crate::services::report;
use crate::services::upload;

/// POST /api/v1/batches — Submit a batch of numbers as JSON.
pub async fn submit_batch(
    State(state): State<AppState>,
    Json(request): Json<SubmitRequest>,
) -> Result<Json<SubmitResponse>, StatusCode> {
    request
        .validate()
        .map_err(|_| StatusCode::UNPROCESSABLE_ENTITY)?;

    let total = request.numbers.len();
    let job_id = state
        .verifier
        .submit(request.numbers)
        .await
        .map_err(|_| StatusCode::UNPROCESSABLE_ENTITY)?;

    Ok(Json(SubmitResponse {
        job_id,
        total,
        message: "Batch submitted for verification".to_string(),
    }))
}

/// POST /api/v1/batches/upload — Submit a batch as an uploaded CSV file.
pub async fn upload_batch(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<SubmitResponse>, StatusCode> {
    let mut csv_data: Option<Vec<u8>> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|_| StatusCode::BAD_REQUEST)?
    {
        if field.name() == Some("file") {
            let data = field.bytes().await.map_err(|_| StatusCode::BAD_REQUEST)?;
            csv_data = Some(data.to_vec());
        }
    }

    let csv_data = csv_data.ok_or(StatusCode::BAD_REQUEST)?;

    // A parse failure rejects the submission outright; no job is created.
    let numbers = upload::parse_batch_csv(&csv_data).map_err(|e| {
        tracing::warn!(error = %e, "Rejected unparseable batch upload");
        StatusCode::BAD_REQUEST
    })?;

    let total = numbers.len();
    let job_id = state
        .verifier
        .submit(numbers)
        .await
        .map_err(|_| StatusCode::UNPROCESSABLE_ENTITY)?;

    Ok(Json(SubmitResponse {
        job_id,
        total,
        message: "Batch submitted for verification".to_string(),
    }))
}

/// GET /api/v1/batches/{job_id} — Poll a batch's per-number statuses.
pub async fn get_batch_status(
    State(state): State<AppState>,
    Path(job_id): Path<Uuid>,
) -> Result<Json<BatchStatusResponse>, StatusCode> {
    let snapshot = state
        .verifier
        .query_status(job_id)
        .await
        .ok_or(StatusCode::NOT_FOUND)?;

    Ok(Json(BatchStatusResponse::from(snapshot)))
}

/// GET /api/v1/batches/{job_id}/report.csv — Download the CSV report.
pub async fn download_csv(
    State(state): State<AppState>,
    Path(job_id): Path<Uuid>,
) -> Result<impl IntoResponse, StatusCode> {
    let snapshot = state
        .verifier
        .query_status(job_id)
        .await
        .ok_or(StatusCode::NOT_FOUND)?;

    let bytes = report::render_csv(&snapshot).map_err(|e| {
        tracing::error!(job_id = %job_id, error = %e, "CSV report rendering failed");
        StatusCode::INTERNAL_SERVER_ERROR
    })?;

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=results_{job_id}.csv"),
            ),
        ],
        bytes,
    ))
}

/// GET /api/v1/batches/{job_id}/report.pdf — Download the PDF report.
pub async fn download_pdf(
    State(state): State<AppState>,
    Path(job_id): Path<Uuid>,
) -> Result<impl IntoResponse, StatusCode> {
    let snapshot = state
        .verifier
        .query_status(job_id)
        .await
        .ok_or(StatusCode::NOT_FOUND)?;

    let bytes = report::render_pdf(&snapshot).map_err(|e| {
        tracing::error!(job_id = %job_id, error = %e, "PDF report rendering failed");
        StatusCode::INTERNAL_SERVER_ERROR
    })?;

    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=results_{job_id}.pdf"),
            ),
        ],
        bytes,
    ))
}

/// GET /api/v1/sample — Download a sample upload file.
pub async fn download_sample() -> Result<impl IntoResponse, StatusCode> {
    let bytes = report::sample_csv().map_err(|e| {
        tracing::error!(error = %e, "Sample CSV rendering failed");
        StatusCode::INTERNAL_SERVER_ERROR
    })?;

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv".to_string()),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=sample_numbers.csv".to_string(),
            ),
        ],
        bytes,
    ))
}
