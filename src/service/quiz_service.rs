use std::collections::HashMap;
use std::sync::Arc;

use futures_util::future::join_all;
use tracing::{debug, info, instrument, warn};

use super::error::{QuizServiceError, QuizServiceResult};
use crate::evaluation::{QuizEvaluator, RatingSchema};
use crate::generators::{GeneratorError, QuizCandidateGenerator};
use crate::model::{LessonPlan, QuizCandidatePool, QuizQuestion, QuizSlot, RelevantLessonPlan};
use crate::reporting::Task;
use crate::selection::QuizSelector;

/// Generator fan-out, one evaluation batch, then selection.
///
/// Report layout under the calling task:
///
/// ```text
/// generators/<generator name>   one node per generator, "#n" suffix for repeats
/// evaluate
/// select
/// ```
pub struct QuizService<R: RatingSchema> {
    generators: Vec<Arc<dyn QuizCandidateGenerator>>,
    evaluator: Arc<dyn QuizEvaluator<R>>,
    selector: Arc<dyn QuizSelector<R>>,
}

impl<R: RatingSchema> Clone for QuizService<R> {
    fn clone(&self) -> Self {
        Self {
            generators: self.generators.clone(),
            evaluator: Arc::clone(&self.evaluator),
            selector: Arc::clone(&self.selector),
        }
    }
}

impl<R: RatingSchema> std::fmt::Debug for QuizService<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QuizService")
            .field("generators", &self.generator_names())
            .field("evaluator", &self.evaluator.name())
            .field("selector", &self.selector.name())
            .finish()
    }
}

impl<R: RatingSchema> QuizService<R> {
    /// Pools are joined in `generators` order, which decides selection ties.
    pub fn new(
        generators: Vec<Arc<dyn QuizCandidateGenerator>>,
        evaluator: Arc<dyn QuizEvaluator<R>>,
        selector: Arc<dyn QuizSelector<R>>,
    ) -> Self {
        Self {
            generators,
            evaluator,
            selector,
        }
    }

    pub fn generator_names(&self) -> Vec<&str> {
        self.generators.iter().map(|g| g.name()).collect()
    }

    pub fn evaluator_name(&self) -> &str {
        self.evaluator.name()
    }

    pub fn selector_name(&self) -> &str {
        self.selector.name()
    }

    /// Best available quiz for `slot`.
    ///
    /// `Ok(vec![])` means no source material: no generator produced a pool, or the
    /// evaluator rated none. Evaluator contract breaches and upstream failures are errors.
    #[instrument(
        skip(self, lesson_plan, relevant_lesson_plans, task),
        fields(lesson = %lesson_plan.title, slot = %slot)
    )]
    pub async fn create_best_quiz(
        &self,
        slot: QuizSlot,
        lesson_plan: &LessonPlan,
        relevant_lesson_plans: &[RelevantLessonPlan],
        task: &Task,
    ) -> QuizServiceResult<Vec<QuizQuestion>> {
        let pools = self
            .generate(slot, lesson_plan, relevant_lesson_plans, task)
            .await?;

        if pools.is_empty() {
            warn!(lesson = %lesson_plan.title, slot = %slot, "No candidate pools, returning an empty quiz");
            task.set_data("outcome", "noCandidates");
            return Ok(Vec::new());
        }

        let ratings = self.evaluate(slot, lesson_plan, &pools, task).await?;

        if ratings.is_empty() {
            warn!(
                lesson = %lesson_plan.title,
                slot = %slot,
                pools = pools.len(),
                "Evaluator returned no ratings, returning an empty quiz"
            );
            task.set_data("outcome", "noRatings");
            return Ok(Vec::new());
        }

        let questions = self.select(&pools, &ratings, task).await?;

        info!(
            lesson = %lesson_plan.title,
            slot = %slot,
            pools = pools.len(),
            questions = questions.len(),
            "Quiz selected"
        );
        Ok(questions)
    }

    async fn generate(
        &self,
        slot: QuizSlot,
        lesson_plan: &LessonPlan,
        relevant_lesson_plans: &[RelevantLessonPlan],
        task: &Task,
    ) -> QuizServiceResult<Vec<QuizCandidatePool>> {
        let generators = &self.generators;
        let names = node_names(generators.iter().map(|g| g.name()));

        task.child("generators", |t| async move {
            let runs = generators.iter().zip(&names).map(|(generator, name)| {
                let t = &t;
                async move {
                    t.child(name, |gt| async move {
                        let pools = generator
                            .candidates_for(slot, lesson_plan, relevant_lesson_plans, &gt)
                            .await?;
                        gt.set_data("pools", pools.len());
                        Ok::<_, GeneratorError>(pools)
                    })
                    .await
                }
            });

            let mut pools = Vec::new();
            for (name, result) in names.iter().zip(join_all(runs).await) {
                let contributed = result?;
                debug!(generator = %name, pools = contributed.len(), "Generator finished");
                pools.extend(contributed);
            }

            t.set_data("pools", pools.len());
            Ok::<_, QuizServiceError>(pools)
        })
        .await
    }

    async fn evaluate(
        &self,
        slot: QuizSlot,
        lesson_plan: &LessonPlan,
        pools: &[QuizCandidatePool],
        task: &Task,
    ) -> QuizServiceResult<Vec<R>> {
        let evaluator = &self.evaluator;

        task.child("evaluate", |t| async move {
            t.set_data("evaluator", evaluator.name());
            let ratings = evaluator.evaluate(pools, lesson_plan, slot, &t).await?;
            if !ratings.is_empty() {
                check_ratings(pools.len(), &ratings)?;
            }
            Ok::<_, QuizServiceError>(ratings)
        })
        .await
    }

    async fn select(
        &self,
        pools: &[QuizCandidatePool],
        ratings: &[R],
        task: &Task,
    ) -> QuizServiceResult<Vec<QuizQuestion>> {
        let selector = &self.selector;

        task.child("select", |t| async move {
            let questions = selector.select_best_quiz(pools, ratings)?;
            t.set_data("selector", selector.name());
            t.set_data("questionCount", questions.len());
            Ok::<_, QuizServiceError>(questions)
        })
        .await
    }
}

fn check_ratings<R: RatingSchema>(pools: usize, ratings: &[R]) -> QuizServiceResult<()> {
    if ratings.len() != pools {
        return Err(QuizServiceError::RatingCountMismatch {
            pools,
            ratings: ratings.len(),
        });
    }
    for (index, rating) in ratings.iter().enumerate() {
        rating
            .validate()
            .map_err(|reason| QuizServiceError::InvalidRating { index, reason })?;
    }
    Ok(())
}

/// Report node names for the generator fan-out; repeats become `name#2`, `name#3`, ...
pub(crate) fn node_names<'a>(names: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    let mut seen: HashMap<&str, usize> = HashMap::new();
    names
        .into_iter()
        .map(|name| {
            let count = seen.entry(name).or_insert(0);
            *count += 1;
            if *count == 1 {
                name.to_string()
            } else {
                format!("{name}#{count}")
            }
        })
        .collect()
}
