//! Winner selection over rated pools. Pure; never calls out.

pub mod error;

pub use error::{SelectionError, SelectionResult};

use std::cmp::Ordering;

use crate::evaluation::RatingSchema;
use crate::model::{QuizCandidatePool, QuizQuestion};

pub trait QuizSelector<R: RatingSchema>: Send + Sync {
    fn name(&self) -> &str;

    /// Questions of the winning pool; `[]` when there are no pools.
    fn select_best_quiz(
        &self,
        pools: &[QuizCandidatePool],
        ratings: &[R],
    ) -> SelectionResult<Vec<QuizQuestion>>;
}

/// Argmax over ratings; the lowest index wins ties.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimpleQuizSelector;

impl SimpleQuizSelector {
    pub const NAME: &'static str = "simple";

    pub fn new() -> Self {
        Self
    }
}

impl<R: RatingSchema> QuizSelector<R> for SimpleQuizSelector {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn select_best_quiz(
        &self,
        pools: &[QuizCandidatePool],
        ratings: &[R],
    ) -> SelectionResult<Vec<QuizQuestion>> {
        if pools.len() != ratings.len() {
            return Err(SelectionError::LengthMismatch {
                pools: pools.len(),
                ratings: ratings.len(),
            });
        }

        Ok(best_index(ratings.iter().map(|r| r.rating()))
            .map(|i| pools[i].questions().to_vec())
            .unwrap_or_default())
    }
}

/// Index of the first maximum. NaN scores never win.
pub fn best_index(scores: impl IntoIterator<Item = f64>) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, score) in scores.into_iter().enumerate() {
        if score.is_nan() {
            continue;
        }
        match best {
            Some((_, top)) if score.partial_cmp(&top) != Some(Ordering::Greater) => {}
            _ => best = Some((i, score)),
        }
    }
    best.map(|(i, _)| i)
}
