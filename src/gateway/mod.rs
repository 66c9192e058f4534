//! HTTP gateway (Axum) exposing the quiz pipeline.

pub mod error;
pub mod handler;
pub mod state;
pub mod streaming;


use axum::{
    Json, Router,
    http::{HeaderMap, StatusCode, header::HeaderValue},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

pub use error::{ErrorResponse, GatewayError};
pub use handler::{QuizRequest, QuizResponse, create_quiz_handler, parse_request, run_pipeline};
pub use state::HandlerState;
pub use streaming::stream_quiz_handler;

/// Response header carrying a short machine-readable outcome.
pub const QUIZFORGE_STATUS_HEADER: &str = "x-quizforge-status";

pub fn create_router_with_state(state: HandlerState) -> Router {
    Router::new()
        .route("/healthz", get(health_handler))
        .route("/v1/quiz", post(create_quiz_handler))
        .route("/v1/quiz/stream", post(stream_quiz_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[derive(serde::Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

#[tracing::instrument]
pub async fn health_handler() -> Response {
    let mut headers = HeaderMap::new();
    headers.insert(QUIZFORGE_STATUS_HEADER, HeaderValue::from_static("healthy"));

    (
        StatusCode::OK,
        headers,
        Json(HealthResponse { status: "ok" }),
    )
        .into_response()
}
