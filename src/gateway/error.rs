use axum::{
    Json,
    http::{HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use thiserror::Error;

use super::QUIZFORGE_STATUS_HEADER;
use crate::evaluation::EvaluationError;
use crate::generators::GeneratorError;
use crate::model::ModelError;
use crate::reporting::ReportError;
use crate::retrieval::RetrievalError;
use crate::service::QuizServiceError;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error(transparent)]
    InvalidSlot(#[from] ModelError),

    #[error(transparent)]
    Retrieval(#[from] RetrievalError),

    #[error(transparent)]
    Pipeline(#[from] QuizServiceError),

    #[error(transparent)]
    Report(#[from] ReportError),

    #[error("internal error: {0}")]
    InternalError(String),
}

#[derive(Debug, serde::Serialize, serde::Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: u16,
}

impl GatewayError {
    /// HTTP status and the short code sent in the status header.
    pub fn classify(&self) -> (StatusCode, &'static str) {
        match self {
            GatewayError::InvalidRequest(_) | GatewayError::InvalidSlot(_) => {
                (StatusCode::BAD_REQUEST, "invalid_request")
            }
            GatewayError::Retrieval(e) => classify_retrieval(e),
            GatewayError::Pipeline(e) => classify_pipeline(e),
            GatewayError::Report(_) | GatewayError::InternalError(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "internal_error")
            }
        }
    }

    pub fn to_error_response(&self) -> ErrorResponse {
        ErrorResponse {
            error: self.to_string(),
            code: self.classify().0.as_u16(),
        }
    }
}

fn classify_retrieval(error: &RetrievalError) -> (StatusCode, &'static str) {
    match error {
        RetrievalError::MissingFilter { .. } => (StatusCode::BAD_REQUEST, "invalid_request"),
        RetrievalError::EmbeddingFailed { .. }
        | RetrievalError::SearchFailed { .. }
        | RetrievalError::RerankFailed { .. } => (StatusCode::BAD_GATEWAY, "retrieval_error"),
        RetrievalError::InvalidConfig { .. } => {
            (StatusCode::INTERNAL_SERVER_ERROR, "internal_error")
        }
    }
}

fn classify_pipeline(error: &QuizServiceError) -> (StatusCode, &'static str) {
    match error {
        QuizServiceError::Generation(GeneratorError::Retrieval(e)) => classify_retrieval(e),
        QuizServiceError::Generation(GeneratorError::Lookup { .. }) => {
            (StatusCode::BAD_GATEWAY, "lookup_error")
        }
        QuizServiceError::Evaluation(EvaluationError::Generation { .. }) => {
            (StatusCode::BAD_GATEWAY, "provider_error")
        }
        QuizServiceError::Evaluation(EvaluationError::SchemaViolation { .. })
        | QuizServiceError::RatingCountMismatch { .. }
        | QuizServiceError::InvalidRating { .. } => {
            (StatusCode::INTERNAL_SERVER_ERROR, "evaluation_error")
        }
        _ => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let (status, quizforge_status) = self.classify();

        let mut headers = HeaderMap::new();
        headers.insert(
            QUIZFORGE_STATUS_HEADER,
            HeaderValue::from_static(quizforge_status),
        );

        let body = Json(ErrorResponse {
            error: self.to_string(),
            code: status.as_u16(),
        });

        (status, headers, body).into_response()
    }
}
