/// Result type for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;

/// Errors surfaced by the playback engine.
///
/// Only authored-data violations are reported; persistence and generation
/// failures degrade gracefully inside the engine.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// A transition or saved state names a node that does not exist.
    #[error("node not found: {0}")]
    NodeNotFound(String),
}

/// Failures of an external text-generation collaborator.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GenerationError {
    /// The request could not be completed.
    #[error("generation request failed: {0}")]
    RequestFailed(String),

    /// The collaborator answered with something unusable.
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// No generator is configured or reachable.
    #[error("text generation unavailable")]
    Unavailable,
}
