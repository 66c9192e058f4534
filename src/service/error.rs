use thiserror::Error;

use crate::evaluation::EvaluationError;
use crate::generators::GeneratorError;
use crate::reporting::ReportError;
use crate::selection::SelectionError;

/// Errors surfaced by [`crate::service::QuizService`] and its factory.
///
/// Degraded outcomes (no pools, no ratings) are not errors; they yield an empty quiz.
#[derive(Debug, Error)]
pub enum QuizServiceError {
    #[error(transparent)]
    Generation(#[from] GeneratorError),

    #[error(transparent)]
    Evaluation(#[from] EvaluationError),

    #[error(transparent)]
    Selection(#[from] SelectionError),

    #[error(transparent)]
    Report(#[from] ReportError),

    /// The evaluator broke its one-rating-per-pool contract.
    #[error("evaluator returned {ratings} ratings for {pools} pools")]
    RatingCountMismatch { pools: usize, ratings: usize },

    #[error("rating for pool {index} failed validation: {reason}")]
    InvalidRating { index: usize, reason: String },

    /// A configured strategy has no collaborator to run with.
    #[error("{strategy} requires {dependency}")]
    MissingDependency {
        strategy: &'static str,
        dependency: &'static str,
    },
}

pub type QuizServiceResult<T> = Result<T, QuizServiceError>;
