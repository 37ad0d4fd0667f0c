/// Alias for `Result<T, StoryError>`.
pub type StoryResult<T> = Result<T, StoryError>;

/// Errors that can occur when loading or querying a story graph.
#[derive(Debug, thiserror::Error)]
pub enum StoryError {
    /// The story file is not valid JSON or does not match the story shape.
    #[error("invalid story data: {0}")]
    Parse(#[from] serde_json::Error),

    /// Two nodes share the same identifier.
    #[error("duplicate node id: \"{0}\"")]
    DuplicateNode(String),

    /// The designated start node does not exist.
    #[error("start node not found: \"{0}\"")]
    MissingStart(String),

    /// A node identifier does not refer to any node in the graph.
    #[error("node not found: \"{0}\"")]
    NodeNotFound(String),
}
