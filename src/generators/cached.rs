use async_trait::async_trait;

use super::QuizCandidateGenerator;
use super::error::GeneratorResult;
use crate::model::{
    CandidateSourceRef, LessonPlan, QuizCandidatePool, QuizQuestion, QuizSlot, RelevantLessonPlan,
};
use crate::reporting::Task;

/// Serves one fixed quiz per slot whatever the lesson plan. Used by the demo mode.
#[derive(Debug, Clone, Default)]
pub struct CachedQuizGenerator {
    label: String,
    starter_quiz: Vec<QuizQuestion>,
    exit_quiz: Vec<QuizQuestion>,
}

impl CachedQuizGenerator {
    pub const NAME: &'static str = "cached";

    pub fn new(
        label: impl Into<String>,
        starter_quiz: Vec<QuizQuestion>,
        exit_quiz: Vec<QuizQuestion>,
    ) -> Self {
        Self {
            label: label.into(),
            starter_quiz,
            exit_quiz,
        }
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    fn candidates(&self, slot: QuizSlot) -> Vec<QuizCandidatePool> {
        let questions = match slot {
            QuizSlot::Starter => &self.starter_quiz,
            QuizSlot::Exit => &self.exit_quiz,
        };
        if questions.is_empty() {
            return Vec::new();
        }
        vec![QuizCandidatePool::new(
            questions.clone(),
            CandidateSourceRef::Cached {
                label: self.label.clone(),
            },
        )]
    }
}

#[async_trait]
impl QuizCandidateGenerator for CachedQuizGenerator {
    fn name(&self) -> &str {
        Self::NAME
    }

    async fn starter_quiz_candidates(
        &self,
        _lesson_plan: &LessonPlan,
        _relevant_lesson_plans: &[RelevantLessonPlan],
        _task: &Task,
    ) -> GeneratorResult<Vec<QuizCandidatePool>> {
        Ok(self.candidates(QuizSlot::Starter))
    }

    async fn exit_quiz_candidates(
        &self,
        _lesson_plan: &LessonPlan,
        _relevant_lesson_plans: &[RelevantLessonPlan],
        _task: &Task,
    ) -> GeneratorResult<Vec<QuizCandidatePool>> {
        Ok(self.candidates(QuizSlot::Exit))
    }
}
