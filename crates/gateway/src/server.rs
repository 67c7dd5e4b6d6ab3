use crate::{client::InferenceClient, error::ProxyError, metrics::ProxyMetrics};
use axum::{
    Router,
    extract::{DefaultBodyLimit, Multipart, State, multipart::MultipartRejection},
    http::header,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
};
use std::time::Instant;
use tower_http::trace::TraceLayer;
use tracing::Instrument;

const INDEX_HTML: &str = include_str!("../static/index.html");

#[derive(Clone)]
pub struct AppState {
    pub client: InferenceClient,
    pub metrics: ProxyMetrics,
}

impl AppState {
    pub fn new(client: InferenceClient) -> Self {
        Self {
            client,
            metrics: ProxyMetrics::init("gateway"),
        }
    }
}

pub fn router(state: AppState, max_upload_bytes: usize) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/upload", post(upload))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

async fn upload(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Response, ProxyError> {
    let upload = common::read_upload(multipart).await.inspect_err(|e| {
        tracing::warn!(status = e.status.as_u16(), "Rejected upload: {}", e);
    })?;

    let filename = upload.display_name().to_string();
    let span = tracing::info_span!("forward_upload", filename = %filename);

    let start = Instant::now();
    let result = state.client.detect(upload).instrument(span).await;
    let elapsed = start.elapsed().as_secs_f64();

    match result {
        Ok(body) => {
            state.metrics.record(elapsed, "success");
            tracing::info!(
                filename = %filename,
                elapsed_ms = elapsed * 1000.0,
                "Forwarded image to AI backend"
            );
            Ok(([(header::CONTENT_TYPE, "application/json")], body).into_response())
        }
        Err(err) => {
            state.metrics.record(elapsed, err.outcome());
            log_failure(&err);
            Err(err)
        }
    }
}

fn log_failure(err: &ProxyError) {
    match err {
        ProxyError::Downstream { status, body } => {
            tracing::error!(status = status.as_u16(), "AI backend error: {}", body);
        }
        ProxyError::Unavailable(e) => {
            tracing::error!(cause = %e, "Failed to connect to AI backend service");
        }
        ProxyError::Timeout(e) => {
            tracing::error!(cause = %e, "Request to AI backend timed out");
        }
        ProxyError::Unexpected(msg) => {
            tracing::error!("Unexpected error: {}", msg);
        }
        ProxyError::Upload(_) => {}
    }
}
