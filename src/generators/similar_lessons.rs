use std::sync::Arc;

use async_trait::async_trait;
use futures_util::future::join_all;
use tracing::{debug, warn};

use super::QuizCandidateGenerator;
use super::error::{GeneratorError, GeneratorResult};
use super::lookup::QuestionLookup;
use crate::constants::DEFAULT_MAX_SIMILAR_LESSONS;
use crate::model::{CandidateSourceRef, LessonPlan, QuizCandidatePool, QuizSlot, RelevantLessonPlan};
use crate::reporting::Task;
use crate::retrieval::LessonPlanRetriever;

/// One pool per semantically similar lesson that has questions for the slot.
pub struct SimilarLessonsGenerator {
    lookup: Arc<dyn QuestionLookup>,
    retriever: Option<Arc<dyn LessonPlanRetriever>>,
    max_lessons: usize,
}

impl SimilarLessonsGenerator {
    pub const NAME: &'static str = "similarLessons";

    pub fn new(lookup: Arc<dyn QuestionLookup>) -> Self {
        Self {
            lookup,
            retriever: None,
            max_lessons: DEFAULT_MAX_SIMILAR_LESSONS,
        }
    }

    /// Lets the generator fetch relevant lessons itself when the caller passes none.
    pub fn with_retriever(mut self, retriever: Arc<dyn LessonPlanRetriever>) -> Self {
        self.retriever = Some(retriever);
        self
    }

    pub fn with_max_lessons(mut self, max_lessons: usize) -> Self {
        self.max_lessons = max_lessons;
        self
    }

    pub fn max_lessons(&self) -> usize {
        self.max_lessons
    }

    async fn resolve_relevant(
        &self,
        lesson_plan: &LessonPlan,
        relevant_lesson_plans: &[RelevantLessonPlan],
        task: &Task,
    ) -> GeneratorResult<Vec<RelevantLessonPlan>> {
        if !relevant_lesson_plans.is_empty() {
            return Ok(relevant_lesson_plans.to_vec());
        }

        let Some(retriever) = self.retriever.as_ref() else {
            return Ok(Vec::new());
        };
        let (Some(key_stage), Some(subject)) = (
            lesson_plan.key_stage.as_deref(),
            lesson_plan.subject.as_deref(),
        ) else {
            debug!(lesson = %lesson_plan.title, "Skipping retrieval without key stage and subject");
            return Ok(Vec::new());
        };

        let query = lesson_plan.search_text();
        let key_stages = [key_stage.to_string()];
        let subjects = [subject.to_string()];

        task.child("retrieval", |t| async move {
            let hits = retriever
                .relevant_lesson_plans(&query, &key_stages, &subjects)
                .await?;
            t.set_data("hits", hits.len());
            Ok::<_, GeneratorError>(hits)
        })
        .await
    }

    async fn candidates(
        &self,
        slot: QuizSlot,
        lesson_plan: &LessonPlan,
        relevant_lesson_plans: &[RelevantLessonPlan],
        task: &Task,
    ) -> GeneratorResult<Vec<QuizCandidatePool>> {
        let relevant = self
            .resolve_relevant(lesson_plan, relevant_lesson_plans, task)
            .await?;

        if relevant.is_empty() {
            return Ok(Vec::new());
        }

        let selected: Vec<&RelevantLessonPlan> = relevant.iter().take(self.max_lessons).collect();

        let lookups = selected.iter().map(|lesson| {
            self.lookup
                .questions_for_lesson_plan(&lesson.lesson_plan_id, slot)
        });
        let results = join_all(lookups).await;

        let mut pools = Vec::with_capacity(selected.len());
        for (lesson, result) in selected.into_iter().zip(results) {
            let questions = result?;
            if questions.is_empty() {
                warn!(
                    lesson_plan_id = %lesson.lesson_plan_id,
                    slot = %slot,
                    "Similar lesson has no questions"
                );
                continue;
            }
            pools.push(QuizCandidatePool::new(
                questions,
                CandidateSourceRef::SimilarLessons {
                    lesson_plan_id: lesson.lesson_plan_id.clone(),
                    lesson_title: lesson.title.clone(),
                },
            ));
        }

        task.set_data("consulted", relevant.len().min(self.max_lessons));
        task.set_data("pools", pools.len());
        Ok(pools)
    }
}

#[async_trait]
impl QuizCandidateGenerator for SimilarLessonsGenerator {
    fn name(&self) -> &str {
        Self::NAME
    }

    async fn starter_quiz_candidates(
        &self,
        lesson_plan: &LessonPlan,
        relevant_lesson_plans: &[RelevantLessonPlan],
        task: &Task,
    ) -> GeneratorResult<Vec<QuizCandidatePool>> {
        self.candidates(QuizSlot::Starter, lesson_plan, relevant_lesson_plans, task)
            .await
    }

    async fn exit_quiz_candidates(
        &self,
        lesson_plan: &LessonPlan,
        relevant_lesson_plans: &[RelevantLessonPlan],
        task: &Task,
    ) -> GeneratorResult<Vec<QuizCandidatePool>> {
        self.candidates(QuizSlot::Exit, lesson_plan, relevant_lesson_plans, task)
            .await
    }
}
