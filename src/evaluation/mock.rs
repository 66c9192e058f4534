use std::sync::RwLock;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use serde_json::Value;

use super::QuizEvaluator;
use super::error::{EvaluationError, EvaluationResult};
use super::llm::{StructuredGenerator, StructuredRequest};
use super::schema::RatingSchema;
use crate::model::{LessonPlan, QuizCandidatePool, QuizSlot};
use crate::reporting::Task;

/// Replies with queued JSON values in call order; records every request.
#[derive(Default)]
pub struct MockStructuredGenerator {
    replies: Vec<Value>,
    fail_with: Option<String>,
    requests: RwLock<Vec<StructuredRequest>>,
    calls: AtomicUsize,
}

impl MockStructuredGenerator {
    /// The n-th call gets `replies[n]` (the last reply repeats).
    pub fn with_replies(replies: Vec<Value>) -> Self {
        Self {
            replies,
            ..Self::default()
        }
    }

    pub fn failing(message: &str) -> Self {
        Self {
            fail_with: Some(message.to_string()),
            ..Self::default()
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<StructuredRequest> {
        self.requests.read().expect("lock poisoned").clone()
    }
}

#[async_trait]
impl StructuredGenerator for MockStructuredGenerator {
    async fn generate(&self, request: StructuredRequest) -> EvaluationResult<Value> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.write().expect("lock poisoned").push(request);

        if let Some(message) = &self.fail_with {
            return Err(EvaluationError::Generation {
                message: message.clone(),
            });
        }

        self.replies
            .get(n)
            .or_else(|| self.replies.last())
            .cloned()
            .ok_or_else(|| EvaluationError::Generation {
                message: "no mock reply queued".to_string(),
            })
    }
}

/// Evaluator returning canned ratings (whatever the pools) or a schema violation.
pub struct MockEvaluator<R: RatingSchema> {
    ratings: Vec<R>,
    violation: Option<String>,
    calls: AtomicUsize,
}

impl<R: RatingSchema> MockEvaluator<R> {
    pub fn with_ratings(ratings: Vec<R>) -> Self {
        Self {
            ratings,
            violation: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn schema_violation(reason: &str) -> Self {
        Self {
            ratings: Vec::new(),
            violation: Some(reason.to_string()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl<R: RatingSchema> QuizEvaluator<R> for MockEvaluator<R> {
    fn name(&self) -> &str {
        "mockEvaluator"
    }

    async fn evaluate(
        &self,
        _pools: &[QuizCandidatePool],
        _lesson_plan: &LessonPlan,
        _slot: QuizSlot,
        _task: &Task,
    ) -> EvaluationResult<Vec<R>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(reason) = &self.violation {
            return Err(EvaluationError::SchemaViolation {
                index: 0,
                reason: reason.clone(),
            });
        }
        Ok(self.ratings.clone())
    }
}
