use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
/// Errors raised by path-addressed report operations.
pub enum ReportError {
    /// A node was started before its parent existed.
    #[error("cannot start '{path}': parent node does not exist")]
    MissingParent {
        /// Slash-joined path of the rejected node.
        path: String,
    },

    /// No node exists at the path.
    #[error("report node not found: '{path}'")]
    NodeNotFound {
        /// Slash-joined path.
        path: String,
    },

    /// The root is created with the report and finished by `complete()`.
    #[error("'{operation}' is not allowed on the root node")]
    RootPath {
        /// Rejected operation.
        operation: &'static str,
    },
}

/// Convenience result type for report operations.
pub type ReportResult<T> = Result<T, ReportError>;
