use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info};

use super::QuizCandidateGenerator;
use super::error::GeneratorResult;
use super::lookup::InMemoryQuestionBank;
use crate::constants::{DEFAULT_QUESTION_POOL_SIZE, DEFAULT_QUESTION_SEARCH_LIMIT};
use crate::model::{
    CandidateSourceRef, LessonPlan, QuizCandidatePool, QuizQuestion, QuizSlot, RelevantLessonPlan,
    StemBlock,
};
use crate::reporting::Task;
use crate::retrieval::LexicalCrossEncoder;

/// Question-level search over every stored question, best match first.
#[async_trait]
pub trait QuestionSearch: Send + Sync {
    async fn search_questions(&self, query: &str, limit: usize) -> GeneratorResult<Vec<QuizQuestion>>;
}

#[async_trait]
impl QuestionSearch for InMemoryQuestionBank {
    async fn search_questions(&self, query: &str, limit: usize) -> GeneratorResult<Vec<QuizQuestion>> {
        let scorer = LexicalCrossEncoder::new();

        let mut scored: Vec<(f32, &QuizQuestion)> = self
            .all_questions()
            .filter_map(|question| {
                let stem = stem_text(question);
                (scorer.shared_terms(query, &stem) > 0).then(|| (scorer.score(query, &stem), question))
            })
            .collect();
        scored.sort_by(|a, b| b.0.total_cmp(&a.0).then_with(|| a.1.uid.cmp(&b.1.uid)));

        let mut seen = HashSet::new();
        Ok(scored
            .into_iter()
            .filter(|&(_, q)| seen.insert(q.uid.as_str()))
            .take(limit)
            .map(|(_, q)| q.clone())
            .collect())
    }
}

fn stem_text(question: &QuizQuestion) -> String {
    question
        .stem
        .iter()
        .map(StemBlock::render)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Searches individual questions by the lesson's keywords and cuts the hits
/// into fixed-size pools.
///
/// A short final pool is topped up from the lesson plan's own quiz for the slot.
pub struct QuestionSearchGenerator {
    search: Arc<dyn QuestionSearch>,
    pool_size: usize,
    limit: usize,
}

impl QuestionSearchGenerator {
    pub const NAME: &'static str = "questionSearch";

    pub fn new(search: Arc<dyn QuestionSearch>) -> Self {
        Self {
            search,
            pool_size: DEFAULT_QUESTION_POOL_SIZE,
            limit: DEFAULT_QUESTION_SEARCH_LIMIT,
        }
    }

    pub fn with_pool_size(mut self, pool_size: usize) -> Self {
        self.pool_size = pool_size.max(1);
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    async fn candidates(
        &self,
        slot: QuizSlot,
        lesson_plan: &LessonPlan,
        task: &Task,
    ) -> GeneratorResult<Vec<QuizCandidatePool>> {
        if lesson_plan.key_stage.is_none() {
            debug!(lesson = %lesson_plan.title, "Skipping question search without key stage");
            return Ok(Vec::new());
        }

        let query = search_query(lesson_plan, slot);
        let hits = self.search.search_questions(&query, self.limit).await?;
        task.set_data("matches", hits.len());
        if hits.is_empty() {
            return Ok(Vec::new());
        }

        let pools = split_into_pools(hits, lesson_plan.quiz(slot), self.pool_size);
        info!(lesson = %lesson_plan.title, slot = %slot, pools = pools.len(), "Question search pools built");
        Ok(pools)
    }
}

/// Title, topic and the slot's focus points (prior knowledge or key learning points).
pub fn search_query(lesson_plan: &LessonPlan, slot: QuizSlot) -> String {
    let focus = match slot {
        QuizSlot::Starter => &lesson_plan.prior_knowledge,
        QuizSlot::Exit => &lesson_plan.key_learning_points,
    };

    std::iter::once(lesson_plan.title.as_str())
        .chain(lesson_plan.topic.as_deref())
        .chain(focus.iter().map(String::as_str))
        .filter(|part| !part.trim().is_empty())
        .collect::<Vec<_>>()
        .join(". ")
}

fn split_into_pools(
    hits: Vec<QuizQuestion>,
    padding: &[QuizQuestion],
    pool_size: usize,
) -> Vec<QuizCandidatePool> {
    let source = CandidateSourceRef::Generated {
        generator: QuestionSearchGenerator::NAME.to_string(),
    };

    let mut chunks: Vec<Vec<QuizQuestion>> = hits.chunks(pool_size).map(<[_]>::to_vec).collect();
    if let Some(last) = chunks.last_mut() {
        let present: HashSet<String> = last.iter().map(|q| q.uid.clone()).collect();
        let missing = pool_size - last.len();
        last.extend(
            padding
                .iter()
                .filter(|q| !present.contains(&q.uid) && q.validate().is_ok())
                .take(missing)
                .cloned(),
        );
    }

    chunks
        .into_iter()
        .map(|questions| QuizCandidatePool::new(questions, source.clone()))
        .collect()
}

#[async_trait]
impl QuizCandidateGenerator for QuestionSearchGenerator {
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
