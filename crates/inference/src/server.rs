use crate::{error::DetectError, service::DetectionService};
use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, Multipart, State, multipart::MultipartRejection},
    routing::{get, post},
};
use schema::{DetectionResponse, HealthResponse};
use tower_http::trace::TraceLayer;

#[derive(Clone)]
pub struct AppState {
    pub service: DetectionService,
}

pub fn router(state: AppState, max_upload_bytes: usize) -> Router {
    Router::new()
        .route("/detect", post(detect))
        .route("/health", get(health))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn detect(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<DetectionResponse>, DetectError> {
    let upload = common::read_upload(multipart).await.inspect_err(|e| {
        tracing::warn!(status = e.status.as_u16(), "Rejected upload: {}", e);
    })?;

    let response = state.service.detect(upload).await?;
    Ok(Json(response))
}

async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse::healthy(state.service.model_loaded()))
}
