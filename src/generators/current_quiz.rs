use async_trait::async_trait;
use tracing::debug;

use super::QuizCandidateGenerator;
use super::error::GeneratorResult;
use crate::model::{
    CandidateSourceRef, LessonPlan, QuizCandidatePool, QuizQuestion, QuizSlot, RelevantLessonPlan,
};
use crate::reporting::Task;

/// Offers the quiz already on the lesson plan, so edits can start from it.
///
/// Questions are relabelled `CURRENT-Q1..n` by position.
#[derive(Debug, Clone, Copy, Default)]
pub struct CurrentQuizGenerator;

impl CurrentQuizGenerator {
    pub const NAME: &'static str = "currentQuiz";

    pub fn new() -> Self {
        Self
    }

    fn candidates(&self, slot: QuizSlot, lesson_plan: &LessonPlan) -> Vec<QuizCandidatePool> {
        let existing = lesson_plan.quiz(slot);
        if existing.is_empty() {
            debug!(lesson = %lesson_plan.title, slot = %slot, "No current quiz");
            return Vec::new();
        }

        let questions: Vec<QuizQuestion> = existing
            .iter()
            .enumerate()
            .map(|(index, question)| {
                let mut question = question.clone();
                question.uid = format!("CURRENT-Q{}", index + 1);
                question
            })
            .collect();

        vec![QuizCandidatePool::new(
            questions,
            CandidateSourceRef::CurrentQuiz { slot },
        )]
    }
}

#[async_trait]
impl QuizCandidateGenerator for CurrentQuizGenerator {
    fn name(&self) -> &str {
        Self::NAME
    }

    async fn starter_quiz_candidates(
        &self,
        lesson_plan: &LessonPlan,
        _relevant_lesson_plans: &[RelevantLessonPlan],
        _task: &Task,
    ) -> GeneratorResult<Vec<QuizCandidatePool>> {
        Ok(self.candidates(QuizSlot::Starter, lesson_plan))
    }

    async fn exit_quiz_candidates(
        &self,
        lesson_plan: &LessonPlan,
        _relevant_lesson_plans: &[RelevantLessonPlan],
        _task: &Task,
    ) -> GeneratorResult<Vec<QuizCandidatePool>> {
        Ok(self.candidates(QuizSlot::Exit, lesson_plan))
    }
}
