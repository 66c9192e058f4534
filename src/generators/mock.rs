use std::collections::HashMap;
use std::sync::RwLock;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;

use super::QuizCandidateGenerator;
use super::error::{GeneratorError, GeneratorResult};
use super::lookup::QuestionLookup;
use super::question_search::QuestionSearch;
use crate::model::{LessonPlan, QuizCandidatePool, QuizQuestion, QuizSlot, RelevantLessonPlan};
use crate::reporting::Task;

/// Question lookup that records every call.
#[derive(Default)]
pub struct MockQuestionLookup {
    questions: RwLock<HashMap<(String, QuizSlot), Vec<QuizQuestion>>>,
    calls: RwLock<Vec<(String, QuizSlot)>>,
    fail_with: Option<String>,
}

impl MockQuestionLookup {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every lookup fails with `reason`.
    pub fn failing(reason: &str) -> Self {
        Self {
            fail_with: Some(reason.to_string()),
            ..Self::default()
        }
    }

    pub fn with_questions(self, lesson_plan_id: &str, slot: QuizSlot, questions: Vec<QuizQuestion>) -> Self {
        self.questions
            .write()
            .expect("lock poisoned")
            .insert((lesson_plan_id.to_string(), slot), questions);
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.read().expect("lock poisoned").len()
    }

    pub fn calls(&self) -> Vec<(String, QuizSlot)> {
        self.calls.read().expect("lock poisoned").clone()
    }
}

#[async_trait]
impl QuestionLookup for MockQuestionLookup {
    async fn questions_for_lesson_plan(
        &self,
        lesson_plan_id: &str,
        slot: QuizSlot,
    ) -> GeneratorResult<Vec<QuizQuestion>> {
        self.calls
            .write()
            .expect("lock poisoned")
            .push((lesson_plan_id.to_string(), slot));

        if let Some(reason) = &self.fail_with {
            return Err(GeneratorError::Lookup {
                lesson_plan_id: lesson_plan_id.to_string(),
                reason: reason.clone(),
            });
        }

        Ok(self
            .questions
            .read()
            .expect("lock poisoned")
            .get(&(lesson_plan_id.to_string(), slot))
            .cloned()
            .unwrap_or_default())
    }
}

/// Generator returning canned pools, optionally after a delay or with an error.
pub struct MockGenerator {
    name: String,
    pools: Vec<QuizCandidatePool>,
    delay: Option<Duration>,
    fail_with: Option<String>,
    calls: AtomicUsize,
}

impl MockGenerator {
    pub fn new(name: &str, pools: Vec<QuizCandidatePool>) -> Self {
        Self {
            name: name.to_string(),
            pools,
            delay: None,
            fail_with: None,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn empty(name: &str) -> Self {
        Self::new(name, Vec::new())
    }

    pub fn failing(name: &str, reason: &str) -> Self {
        Self {
            fail_with: Some(reason.to_string()),
            ..Self::new(name, Vec::new())
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    async fn respond(&self, task: &Task) -> GeneratorResult<Vec<QuizCandidatePool>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(reason) = &self.fail_with {
            return Err(GeneratorError::Lookup {
                lesson_plan_id: self.name.clone(),
                reason: reason.clone(),
            });
        }
        task.set_data("pools", self.pools.len());
        Ok(self.pools.clone())
    }
}

#[async_trait]
impl QuizCandidateGenerator for MockGenerator {
    fn name(&self) -> &str {
        &self.name
    }

    async fn starter_quiz_candidates(
        &self,
        _lesson_plan: &LessonPlan,
        _relevant_lesson_plans: &[RelevantLessonPlan],
        task: &Task,
    ) -> GeneratorResult<Vec<QuizCandidatePool>> {
        self.respond(task).await
    }

    async fn exit_quiz_candidates(
        &self,
        _lesson_plan: &LessonPlan,
        _relevant_lesson_plans: &[RelevantLessonPlan],
        task: &Task,
    ) -> GeneratorResult<Vec<QuizCandidatePool>> {
        self.respond(task).await
    }
}

/// Question search returning canned hits and recording each query.
#[derive(Default)]
pub struct MockQuestionSearch {
    hits: Vec<QuizQuestion>,
    queries: RwLock<Vec<(String, usize)>>,
    fail_with: Option<String>,
}

impl MockQuestionSearch {
    pub fn new(hits: Vec<QuizQuestion>) -> Self {
        Self {
            hits,
            ..Self::default()
        }
    }

    pub fn failing(reason: &str) -> Self {
        Self {
            fail_with: Some(reason.to_string()),
            ..Self::default()
        }
    }

    pub fn call_count(&self) -> usize {
        self.queries.read().expect("lock poisoned").len()
    }

    pub fn queries(&self) -> Vec<(String, usize)> {
        self.queries.read().expect("lock poisoned").clone()
    }
}

#[async_trait]
impl QuestionSearch for MockQuestionSearch {
    async fn search_questions(&self, query: &str, limit: usize) -> GeneratorResult<Vec<QuizQuestion>> {
        self.queries
            .write()
            .expect("lock poisoned")
            .push((query.to_string(), limit));
        if let Some(reason) = &self.fail_with {
            return Err(GeneratorError::Search {
                reason: reason.clone(),
            });
        }
        Ok(self.hits.iter().take(limit).cloned().collect())
    }
}
