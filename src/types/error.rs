//! Error types for the knowledge graph engine.

use thiserror::Error;

/// All errors that can occur in the knowledge graph engine.
#[derive(Error, Debug)]
pub enum GraphError {
    /// An id was empty or whitespace-only where a non-empty id is required.
    #[error("invalid id: {0:?}")]
    InvalidId(String),

    /// No node, edge, experience, pattern, or cluster exists with the given id.
    #[error("not found: {0}")]
    NotFound(String),

    /// A node or edge failed field-level validation.
    #[error("invalid data: {0}")]
    InvalidData(String),

    /// An operation would violate a structural constraint (missing endpoint,
    /// duplicate id, exceeded bound).
    #[error("constraint violation: {0}")]
    ConstraintViolation(String),

    /// A filesystem read/write/delete failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// A snapshot document failed to parse as JSON.
    #[error("invalid json: {0}")]
    InvalidJson(#[from] serde_json::Error),

    /// A snapshot document parsed but failed schema validation.
    #[error("invalid graph data: {0}")]
    InvalidGraphData(String),

    /// `load_with_recovery` found neither the primary file nor a backup.
    #[error("no backup available for {0}")]
    NoBackup(String),

    /// A `wait_for` call on the event bus exceeded its timeout.
    #[error("timed out waiting for event {0:?} after {1:?}")]
    Timeout(String, std::time::Duration),

    /// An event handler returned an error; other handlers still ran.
    #[error("handler error for event {0:?}: {1}")]
    HandlerError(String, String),
}

/// Convenience result type for knowledge graph engine operations.
pub type GraphResult<T> = Result<T, GraphError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_id_displays_the_offending_value() {
        let err = GraphError::InvalidId("   ".to_string());
        assert!(err.to_string().contains("invalid id"));
    }

    #[test]
    fn io_error_converts_via_from() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: GraphError = io_err.into();
        assert!(matches!(err, GraphError::Io(_)));
    }
}
