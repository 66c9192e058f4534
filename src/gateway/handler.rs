use axum::{
    Json,
    extract::State,
    http::{HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use super::QUIZFORGE_STATUS_HEADER;
use super::error::GatewayError;
use super::state::HandlerState;
use crate::model::{LessonPlan, QuizQuestion, QuizSlot, RelevantLessonPlan};
use crate::reporting::{ReportNode, Task, Tracker};

/// Body of `POST /v1/quiz` and `POST /v1/quiz/stream`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizRequest {
    pub slot: String,
    pub lesson_plan: LessonPlan,
    #[serde(default)]
    pub relevant_lesson_plans: Vec<RelevantLessonPlan>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct QuizResponse {
    pub questions: Vec<QuizQuestion>,
    pub report: ReportNode,
}

/// Parses the raw body; a bad shape or unknown slot is a 400.
pub fn parse_request(body: serde_json::Value) -> Result<(QuizSlot, QuizRequest), GatewayError> {
    let request: QuizRequest = serde_json::from_value(body)
        .map_err(|e| GatewayError::InvalidRequest(format!("Invalid request schema: {}", e)))?;
    let slot: QuizSlot = request.slot.parse()?;
    Ok((slot, request))
}

#[instrument(skip(state, body), fields(slot = tracing::field::Empty))]
pub async fn create_quiz_handler(
    State(state): State<HandlerState>,
    Json(body): Json<serde_json::Value>,
) -> Result<Response, GatewayError> {
    let (slot, request) = parse_request(body)?;
    tracing::Span::current().record("slot", tracing::field::display(slot));

    let tracker = Tracker::new();
    let questions = run_pipeline(&state, slot, request, &tracker).await?;

    let status = if questions.is_empty() { "empty" } else { "ok" };
    let mut headers = HeaderMap::new();
    headers.insert(QUIZFORGE_STATUS_HEADER, HeaderValue::from_static(status));

    Ok((
        StatusCode::OK,
        headers,
        Json(QuizResponse {
            questions,
            report: tracker.get_report(),
        }),
    )
        .into_response())
}

/// One tracked pipeline run: optional retrieval, then the quiz service.
pub async fn run_pipeline(
    state: &HandlerState,
    slot: QuizSlot,
    request: QuizRequest,
    tracker: &Tracker,
) -> Result<Vec<QuizQuestion>, GatewayError> {
    tracker
        .run(|task| async move {
            task.set_data("slot", slot);
            let relevant = resolve_relevant(state, &request, &task).await?;
            let questions = state
                .quiz_service
                .create_best_quiz(slot, &request.lesson_plan, &relevant, &task)
                .await?;
            Ok::<_, GatewayError>(questions)
        })
        .await
}

async fn resolve_relevant(
    state: &HandlerState,
    request: &QuizRequest,
    task: &Task,
) -> Result<Vec<RelevantLessonPlan>, GatewayError> {
    if !request.relevant_lesson_plans.is_empty() {
        return Ok(request.relevant_lesson_plans.clone());
    }

    let plan = &request.lesson_plan;
    let (Some(retriever), Some(key_stage), Some(subject)) = (
        state.retriever.as_ref(),
        plan.key_stage.as_deref(),
        plan.subject.as_deref(),
    ) else {
        debug!(lesson = %plan.title, "Running without relevant lesson plans");
        return Ok(Vec::new());
    };

    let query = plan.search_text();
    let key_stages = [key_stage.to_string()];
    let subjects = [subject.to_string()];

    task.child("retrieval", |t| async move {
        let hits = retriever
            .relevant_lesson_plans(&query, &key_stages, &subjects)
            .await?;
        t.set_data("hits", hits.len());
        Ok::<_, GatewayError>(hits)
    })
    .await
}
