//! Candidate generators: each proposes zero or more question pools for one quiz slot.
//!
//! Generators never fail for lack of material. A lesson plan without the inputs a
//! generator needs yields an empty `Vec`, and the service treats that as "no pools".

pub mod based_on;
pub mod cached;
pub mod current_quiz;
pub mod error;
pub mod lookup;
#[cfg(any(test, feature = "mock"))]
pub mod mock;
pub mod question_search;
pub mod similar_lessons;

#[cfg(test)]
mod tests;

pub use based_on::BasedOnLessonGenerator;
pub use cached::CachedQuizGenerator;
pub use current_quiz::CurrentQuizGenerator;
pub use error::{GeneratorError, GeneratorResult};
pub use lookup::{InMemoryQuestionBank, QuestionLookup};
#[cfg(any(test, feature = "mock"))]
pub use mock::{MockGenerator, MockQuestionLookup, MockQuestionSearch};
pub use question_search::{QuestionSearch, QuestionSearchGenerator};
pub use similar_lessons::SimilarLessonsGenerator;

use async_trait::async_trait;

use crate::model::{LessonPlan, QuizCandidatePool, QuizSlot, RelevantLessonPlan};
use crate::reporting::Task;

/// A source of candidate pools.
///
/// Implementations must not mutate the lesson plan and should record
/// diagnostics through `task` rather than returning them.
#[async_trait]
pub trait QuizCandidateGenerator: Send + Sync {
    /// Stable name used for the generator's report node.
    fn name(&self) -> &str;

    async fn starter_quiz_candidates(
        &self,
        lesson_plan: &LessonPlan,
        relevant_lesson_plans: &[RelevantLessonPlan],
        task: &Task,
    ) -> GeneratorResult<Vec<QuizCandidatePool>>;

    async fn exit_quiz_candidates(
        &self,
        lesson_plan: &LessonPlan,
        relevant_lesson_plans: &[RelevantLessonPlan],
        task: &Task,
    ) -> GeneratorResult<Vec<QuizCandidatePool>>;

    /// Routes to the per-slot method.
    async fn candidates_for(
        &self,
        slot: QuizSlot,
        lesson_plan: &LessonPlan,
        relevant_lesson_plans: &[RelevantLessonPlan],
        task: &Task,
    ) -> GeneratorResult<Vec<QuizCandidatePool>> {
        match slot {
            QuizSlot::Starter => {
                self.starter_quiz_candidates(lesson_plan, relevant_lesson_plans, task)
                    .await
            }
            QuizSlot::Exit => {
                self.exit_quiz_candidates(lesson_plan, relevant_lesson_plans, task)
                    .await
            }
        }
    }
}
