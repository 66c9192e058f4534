use std::marker::PhantomData;

use async_trait::async_trait;

use super::QuizEvaluator;
use super::error::EvaluationResult;
use super::schema::RatingSchema;
use crate::model::{LessonPlan, QuizCandidatePool, QuizSlot};
use crate::reporting::Task;

/// Trusts the first source: pool 0 gets 1.0, every other pool 0.0. Never calls a model.
pub struct ReturnFirstEvaluator<R: RatingSchema> {
    _rating: PhantomData<fn() -> R>,
}

impl<R: RatingSchema> Default for ReturnFirstEvaluator<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: RatingSchema> ReturnFirstEvaluator<R> {
    pub const NAME: &'static str = "returnFirst";

    pub const TOP: f64 = 1.0;
    pub const BOTTOM: f64 = 0.0;

    pub fn new() -> Self {
        Self {
            _rating: PhantomData,
        }
    }
}

#[async_trait]
impl<R: RatingSchema> QuizEvaluator<R> for ReturnFirstEvaluator<R> {
    fn name(&self) -> &str {
        Self::NAME
    }

    async fn evaluate(
        &self,
        pools: &[QuizCandidatePool],
        _lesson_plan: &LessonPlan,
        _slot: QuizSlot,
        _task: &Task,
    ) -> EvaluationResult<Vec<R>> {
        Ok((0..pools.len())
            .map(|i| {
                if i == 0 {
                    R::fixed(Self::TOP, "first source preferred")
                } else {
                    R::fixed(Self::BOTTOM, "not the first source")
                }
            })
            .collect())
    }
}
