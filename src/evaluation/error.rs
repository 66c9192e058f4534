use thiserror::Error;

use crate::reporting::ReportError;

#[derive(Debug, Error)]
pub enum EvaluationError {
    /// The structured generation call failed (transport, provider, empty reply).
    #[error("structured generation failed: {message}")]
    Generation { message: String },

    /// The reply for pool `index` did not match the rating schema.
    #[error("rating for pool {index} violates the rating schema: {reason}")]
    SchemaViolation { index: usize, reason: String },

    #[error(transparent)]
    Report(#[from] ReportError),
}

/// Result type for evaluation operations.
pub type EvaluationResult<T> = Result<T, EvaluationError>;
