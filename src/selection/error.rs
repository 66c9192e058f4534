use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SelectionError {
    /// Pools and ratings must be parallel arrays.
    #[error("cannot select from {pools} pools with {ratings} ratings")]
    LengthMismatch { pools: usize, ratings: usize },
}

pub type SelectionResult<T> = Result<T, SelectionError>;
