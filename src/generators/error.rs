use thiserror::Error;

use crate::reporting::ReportError;
use crate::retrieval::RetrievalError;

/// Errors raised by candidate generators and question lookups.
///
/// A missing source is never an error; generators return no pools instead.
#[derive(Debug, Error)]
pub enum GeneratorError {
    /// The lookup-by-identifier capability failed.
    #[error("question lookup failed for lesson '{lesson_plan_id}': {reason}")]
    Lookup {
        lesson_plan_id: String,
        reason: String,
    },

    /// Question-level search failed.
    #[error("question search failed: {reason}")]
    Search { reason: String },

    /// The question bank could not be read or parsed.
    #[error("failed to load question bank: {reason}")]
    QuestionBank { reason: String },

    #[error(transparent)]
    Retrieval(#[from] RetrievalError),

    #[error(transparent)]
    Report(#[from] ReportError),
}

/// Result type for generator operations.
pub type GeneratorResult<T> = Result<T, GeneratorError>;
