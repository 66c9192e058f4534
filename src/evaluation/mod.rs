//! Pool evaluators: one schema-checked rating per candidate pool, index-aligned.

pub mod error;
pub mod llm;
#[cfg(any(test, feature = "mock"))]
pub mod mock;
pub mod return_first;
pub mod schema;


pub use error::{EvaluationError, EvaluationResult};
pub use llm::{
    GenaiStructuredGenerator, LlmQuizEvaluator, StructuredGenerator, StructuredRequest,
    build_prompt,
};
#[cfg(any(test, feature = "mock"))]
pub use mock::{MockEvaluator, MockStructuredGenerator};
pub use return_first::ReturnFirstEvaluator;
pub use schema::{QuizRating, RatingSchema};

use async_trait::async_trait;

use crate::model::{LessonPlan, QuizCandidatePool, QuizSlot};
use crate::reporting::Task;

/// Scores candidate pools against a lesson plan.
///
/// Returns exactly one rating per pool in pool order, and `[]` for no pools.
/// A reply that violates `R`'s schema is an error, not a low score.
#[async_trait]
pub trait QuizEvaluator<R: RatingSchema>: Send + Sync {
    fn name(&self) -> &str;

    async fn evaluate(
        &self,
        pools: &[QuizCandidatePool],
        lesson_plan: &LessonPlan,
        slot: QuizSlot,
        task: &Task,
    ) -> EvaluationResult<Vec<R>>;
}
