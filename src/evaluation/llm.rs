use std::marker::PhantomData;
use std::sync::Arc;

use async_trait::async_trait;
use futures_util::future::join_all;
use genai::Client;
use genai::chat::{ChatMessage, ChatOptions, ChatRequest, JsonSpec};
use serde_json::Value;
use tracing::{debug, instrument};

use super::QuizEvaluator;
use super::error::{EvaluationError, EvaluationResult};
use super::schema::RatingSchema;
use crate::model::{LessonPlan, QuizCandidatePool, QuizSlot};
use crate::reporting::Task;

const SYSTEM_PROMPT: &str = "You are an experienced teacher reviewing quiz questions for a lesson. \
Judge how well the candidate questions check the prior knowledge (starter quiz) or the key \
learning points (exit quiz) of the lesson, their accuracy, and their age-appropriateness. \
Reply only with JSON matching the provided schema.";

/// One structured-output call: instructions, prompt and the schema the reply must match.
#[derive(Debug, Clone, PartialEq)]
pub struct StructuredRequest {
    pub schema_name: String,
    pub schema: Value,
    pub system: String,
    pub prompt: String,
}

/// Opaque "structured generation" capability.
#[async_trait]
pub trait StructuredGenerator: Send + Sync {
    async fn generate(&self, request: StructuredRequest) -> EvaluationResult<Value>;
}

/// [`StructuredGenerator`] backed by a genai chat client with a JSON-schema response format.
#[derive(Clone)]
pub struct GenaiStructuredGenerator {
    client: Client,
    model: String,
}

impl std::fmt::Debug for GenaiStructuredGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GenaiStructuredGenerator")
            .field("model", &self.model)
            .finish_non_exhaustive()
    }
}

impl GenaiStructuredGenerator {
    pub fn new(model: &str) -> Self {
        Self::with_client(Client::default(), model)
    }

    pub fn with_client(client: Client, model: &str) -> Self {
        Self {
            client,
            model: model.to_string(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl StructuredGenerator for GenaiStructuredGenerator {
    async fn generate(&self, request: StructuredRequest) -> EvaluationResult<Value> {
        let chat = ChatRequest::new(vec![ChatMessage::user(request.prompt)])
            .with_system(request.system);
        let options = ChatOptions::default()
            .with_response_format(JsonSpec::new(request.schema_name, request.schema));

        let response = self
            .client
            .exec_chat(&self.model, chat, Some(&options))
            .await
            .map_err(|e| EvaluationError::Generation {
                message: e.to_string(),
            })?;

        let text = response
            .first_text()
            .ok_or_else(|| EvaluationError::Generation {
                message: "model returned no text".to_string(),
            })?;

        serde_json::from_str(text).map_err(|e| EvaluationError::Generation {
            message: format!("reply is not JSON: {}", e),
        })
    }
}

/// Rates each pool with one structured LLM call; calls run concurrently.
pub struct LlmQuizEvaluator<R: RatingSchema> {
    generator: Arc<dyn StructuredGenerator>,
    _rating: PhantomData<fn() -> R>,
}

impl<R: RatingSchema> LlmQuizEvaluator<R> {
    pub const NAME: &'static str = "llmEvaluator";

    pub fn new(generator: Arc<dyn StructuredGenerator>) -> Self {
        Self {
            generator,
            _rating: PhantomData,
        }
    }

    fn request_for(&self, lesson_plan: &LessonPlan, slot: QuizSlot, pool: &QuizCandidatePool) -> StructuredRequest {
        StructuredRequest {
            schema_name: R::NAME.to_string(),
            schema: R::output_schema(),
            system: SYSTEM_PROMPT.to_string(),
            prompt: build_prompt(lesson_plan, slot, pool),
        }
    }

    async fn rate(&self, index: usize, request: StructuredRequest) -> EvaluationResult<R> {
        let reply = self.generator.generate(request).await?;
        let rating: R = serde_json::from_value(reply)
            .map_err(|e| EvaluationError::SchemaViolation {
                index,
                reason: e.to_string(),
            })?;
        rating
            .validate()
            .map_err(|reason| EvaluationError::SchemaViolation { index, reason })?;
        Ok(rating)
    }
}

#[async_trait]
impl<R: RatingSchema> QuizEvaluator<R> for LlmQuizEvaluator<R> {
    fn name(&self) -> &str {
        Self::NAME
    }

    #[instrument(skip_all, fields(pools = pools.len(), slot = %slot))]
    async fn evaluate(
        &self,
        pools: &[QuizCandidatePool],
        lesson_plan: &LessonPlan,
        slot: QuizSlot,
        task: &Task,
    ) -> EvaluationResult<Vec<R>> {
        if pools.is_empty() {
            return Ok(Vec::new());
        }

        let calls = pools.iter().enumerate().map(|(index, pool)| {
            let request = self.request_for(lesson_plan, slot, pool);
            self.rate(index, request)
        });

        let ratings = join_all(calls)
            .await
            .into_iter()
            .collect::<EvaluationResult<Vec<R>>>()?;

        let scores: Vec<f64> = ratings.iter().map(|r| r.rating()).collect();
        debug!(?scores, "Pools rated");
        task.set_data("ratings", &scores);
        Ok(ratings)
    }
}

/// User prompt describing the lesson and one candidate pool.
pub fn build_prompt(lesson_plan: &LessonPlan, slot: QuizSlot, pool: &QuizCandidatePool) -> String {
    let mut out = String::new();
    out.push_str(&format!("Lesson title: {}\n", lesson_plan.title));
    if let Some(subject) = &lesson_plan.subject {
        out.push_str(&format!("Subject: {}\n", subject));
    }
    if let Some(key_stage) = &lesson_plan.key_stage {
        out.push_str(&format!("Key stage: {}\n", key_stage));
    }
    if let Some(topic) = &lesson_plan.topic {
        out.push_str(&format!("Topic: {}\n", topic));
    }

    let (focus_label, focus) = match slot {
        QuizSlot::Starter => ("Prior knowledge", &lesson_plan.prior_knowledge),
        QuizSlot::Exit => ("Key learning points", &lesson_plan.key_learning_points),
    };
    if !focus.is_empty() {
        out.push_str(&format!("{}:\n", focus_label));
        for item in focus {
            out.push_str(&format!("- {}\n", item));
        }
    }

    out.push_str(&format!(
        "\nQuiz: {} ({} candidate questions from {})\n",
        slot,
        pool.len(),
        pool.source().kind()
    ));
    for (i, question) in pool.questions().iter().enumerate() {
        out.push_str(&format!("{}. {}\n", i + 1, question.render()));
    }
    out
}
