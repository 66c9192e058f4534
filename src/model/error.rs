use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
/// Errors raised while parsing or validating quiz data.
pub enum ModelError {
    /// Quiz slot string did not name the starter or exit quiz.
    #[error("unknown quiz slot '{value}': expected starterQuiz or exitQuiz")]
    UnknownSlot {
        /// Rejected input.
        value: String,
    },

    /// Question failed a structural invariant.
    #[error("invalid question '{uid}': {reason}")]
    InvalidQuestion {
        /// Question uid.
        uid: String,
        /// What was wrong.
        reason: String,
    },
}

/// Convenience result type for model operations.
pub type ModelResult<T> = Result<T, ModelError>;
