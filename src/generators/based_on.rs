use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use super::QuizCandidateGenerator;
use super::error::GeneratorResult;
use super::lookup::QuestionLookup;
use crate::constants::BASED_ON_FALLBACK_TITLE;
use crate::model::{CandidateSourceRef, LessonPlan, QuizCandidatePool, QuizSlot, RelevantLessonPlan};
use crate::reporting::Task;

/// Reuses the questions of the lesson the plan was based on.
pub struct BasedOnLessonGenerator {
    lookup: Arc<dyn QuestionLookup>,
}

impl BasedOnLessonGenerator {
    pub const NAME: &'static str = "basedOnLesson";

    pub fn new(lookup: Arc<dyn QuestionLookup>) -> Self {
        Self { lookup }
    }

    async fn candidates(
        &self,
        slot: QuizSlot,
        lesson_plan: &LessonPlan,
        task: &Task,
    ) -> GeneratorResult<Vec<QuizCandidatePool>> {
        let Some(based_on) = lesson_plan.based_on.as_ref() else {
            debug!(lesson = %lesson_plan.title, slot = %slot, "No basedOn reference");
            return Ok(Vec::new());
        };

        let questions = self
            .lookup
            .questions_for_lesson_plan(&based_on.id, slot)
            .await?;

        task.set_data("lessonPlanId", &based_on.id);
        task.set_data("questionCount", questions.len());

        if questions.is_empty() {
            debug!(lesson_plan_id = %based_on.id, slot = %slot, "Based-on lesson has no questions");
            return Ok(Vec::new());
        }

        let lesson_title = based_on
            .title
            .clone()
            .filter(|t| !t.trim().is_empty())
            .unwrap_or_else(|| BASED_ON_FALLBACK_TITLE.to_string());

        Ok(vec![QuizCandidatePool::new(
            questions,
            CandidateSourceRef::BasedOnLesson {
                lesson_plan_id: based_on.id.clone(),
                lesson_title,
            },
        )])
    }
}

#[async_trait]
impl QuizCandidateGenerator for BasedOnLessonGenerator {
    fn name(&self) -> &str {
        Self::NAME
    }

    async fn starter_quiz_candidates(
        &self,
        lesson_plan: &LessonPlan,
        _relevant_lesson_plans: &[RelevantLessonPlan],
        task: &Task,
    ) -> GeneratorResult<Vec<QuizCandidatePool>> {
        self.candidates(QuizSlot::Starter, lesson_plan, task).await
    }

    async fn exit_quiz_candidates(
        &self,
        lesson_plan: &LessonPlan,
        _relevant_lesson_plans: &[RelevantLessonPlan],
        task: &Task,
    ) -> GeneratorResult<Vec<QuizCandidatePool>> {
        self.candidates(QuizSlot::Exit, lesson_plan, task).await
    }
}
