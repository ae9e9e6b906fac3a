use axum::{
    extract::{DefaultBodyLimit, Multipart, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use std::collections::BTreeSet;
use tracing::{debug, error, info, instrument, warn};
use utoipa::{OpenApi, ToSchema};

use crate::pages;
use crate::process_error::ProcessError;
use crate::radiation::{GapFinding, GapRecord};
use crate::services::{RadiationService, ResampledCsv, Tool, ToolOutput};
use crate::upload::UploadForm;

#[derive(Clone)]
pub struct AppState {
    pub radiation_service: RadiationService,
    pub max_upload_bytes: usize,
}

#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
}

#[derive(Serialize, ToSchema)]
pub struct GapReportResponse {
    pub tolerance_hours: u32,
    pub station_count: usize,
    /// One sentence per gap, or one per clean station
    pub messages: Vec<String>,
    pub gaps: Vec<GapRecord>,
}

#[derive(Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

/// Multipart form accepted by the upload endpoints
#[derive(ToSchema)]
pub struct UploadRequest {
    #[schema(value_type = String, format = Binary)]
    pub file: Vec<u8>,
    pub tool: Option<Tool>,
    pub tolerance: Option<u32>,
}

#[derive(OpenApi)]
#[openapi(
    paths(health, check_gaps_json),
    components(schemas(
        HealthResponse,
        GapReportResponse,
        GapRecord,
        ErrorResponse,
        UploadRequest,
        Tool
    )),
    tags((name = "radiation", description = "Solar radiation resampling and gap checks"))
)]
pub struct ApiDoc;

pub fn generate_openapi_spec() -> utoipa::openapi::OpenApi {
    ApiDoc::openapi()
}

pub fn create_router(state: AppState) -> Router {
    let body_limit = state.max_upload_bytes;

    let api_routes = Router::new()
        .route("/health", get(health))
        .route("/gaps", post(check_gaps_json));

    Router::new()
        .route("/", get(index).post(process_upload))
        .nest("/api/v1", api_routes)
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}

#[utoipa::path(
    get,
    path = "/api/v1/health",
    tag = "radiation",
    responses((status = 200, description = "Service is up", body = HealthResponse))
)]
#[instrument(skip(_state))]
async fn health(State(_state): State<AppState>) -> impl IntoResponse {
    debug!("Health check requested");
    let response = HealthResponse {
        status: "healthy".to_string(),
    };
    (StatusCode::OK, Json(response))
}

#[instrument(skip(state))]
async fn index(State(state): State<AppState>) -> Html<String> {
    Html(pages::index(
        state.radiation_service.default_tolerance_hours(),
        None,
    ))
}

/// Browser upload: CSV download for the interpolator, HTML list for gaps
#[instrument(skip(state, multipart))]
async fn process_upload(State(state): State<AppState>, multipart: Multipart) -> Response {
    let form = match UploadForm::from_multipart(multipart).await {
        Ok(form) => form,
        Err(e) => {
            warn!("Rejected upload: {}", e);
            return error_page(&state, StatusCode::BAD_REQUEST, &e.to_string());
        }
    };

    let tool = match form.tool() {
        Ok(tool) => tool,
        Err(e) => {
            warn!("Rejected upload '{}': {}", form.file_name, e);
            return error_page(&state, status_for(&e), &e.user_message());
        }
    };

    info!(
        "Running {} on '{}' ({} bytes)",
        tool,
        form.file_name,
        form.contents.len()
    );

    let service = state.radiation_service.clone();
    let default_tolerance = service.default_tolerance_hours();
    let tolerance_hours = form.tolerance_hours;
    let file_name = form.file_name;
    let contents = form.contents;

    match run_blocking(move || service.run(tool, &contents, tolerance_hours)).await {
        Ok(ToolOutput::Resampled(csv)) => {
            info!(
                "Returning {} rows for {} stations as {}",
                csv.row_count, csv.station_count, csv.filename
            );
            csv_download(csv)
        }
        Ok(ToolOutput::Gaps(findings)) => {
            let tolerance = tolerance_hours.unwrap_or(default_tolerance);
            (StatusCode::OK, Html(pages::gap_report(&findings, tolerance))).into_response()
        }
        Err(e) => {
            error!("Failed to process '{}': {}", file_name, e);
            error_page(&state, status_for(&e), &e.user_message())
        }
    }
}

#[utoipa::path(
    post,
    path = "/api/v1/gaps",
    tag = "radiation",
    request_body(content = UploadRequest, content_type = "multipart/form-data"),
    responses(
        (status = 200, description = "Gap findings per station", body = GapReportResponse),
        (status = 400, description = "Invalid upload", body = ErrorResponse),
        (status = 422, description = "File could not be processed", body = ErrorResponse),
        (status = 500, description = "Processing task failed", body = ErrorResponse)
    )
)]
#[instrument(skip(state, multipart))]
async fn check_gaps_json(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<GapReportResponse>, (StatusCode, Json<ErrorResponse>)> {
    let form = UploadForm::from_multipart(multipart).await.map_err(|e| {
        warn!("Rejected upload: {}", e);
        json_error(StatusCode::BAD_REQUEST, e.to_string())
    })?;

    let tolerance = form
        .tolerance_hours
        .unwrap_or(state.radiation_service.default_tolerance_hours());

    let service = state.radiation_service.clone();
    let contents = form.contents;
    let findings = run_blocking(move || service.check_gaps(&contents, Some(tolerance)))
        .await
        .map_err(|e| {
            error!("Failed to check gaps in '{}': {}", form.file_name, e);
            json_error(status_for(&e), e.user_message())
        })?;

    let station_count = findings
        .iter()
        .map(GapFinding::station_code)
        .collect::<BTreeSet<_>>()
        .len();

    info!(
        "Gap check on '{}': {} findings across {} stations",
        form.file_name,
        findings.len(),
        station_count
    );

    Ok(Json(GapReportResponse {
        tolerance_hours: tolerance,
        station_count,
        messages: findings.iter().map(ToString::to_string).collect(),
        gaps: findings.iter().filter_map(GapFinding::as_gap).cloned().collect(),
    }))
}

/// Run CPU-bound parsing and resampling off the async worker threads
async fn run_blocking<T, F>(job: F) -> Result<T, ProcessError>
where
    F: FnOnce() -> Result<T, ProcessError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(job)
        .await
        .unwrap_or_else(|e| Err(ProcessError::from(e)))
}

fn status_for(error: &ProcessError) -> StatusCode {
    if error.is_validation() {
        StatusCode::BAD_REQUEST
    } else if error.is_internal() {
        StatusCode::INTERNAL_SERVER_ERROR
    } else {
        StatusCode::UNPROCESSABLE_ENTITY
    }
}

fn error_page(state: &AppState, status: StatusCode, message: &str) -> Response {
    let page = pages::index(
        state.radiation_service.default_tolerance_hours(),
        Some(message),
    );
    (status, Html(page)).into_response()
}

fn json_error(status: StatusCode, message: String) -> (StatusCode, Json<ErrorResponse>) {
    (status, Json(ErrorResponse { error: message }))
}

fn csv_download(csv: ResampledCsv) -> Response {
    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/csv".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename={}", csv.filename),
            ),
        ],
        csv.body,
    )
        .into_response()
}
