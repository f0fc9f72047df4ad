// ABOUTME: Error types for container runtime operations.
// ABOUTME: One variant per step kind so job logs name what failed.

/// Errors from container runtime operations.
#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    #[error("image not found: {0}")]
    NotFound(String),

    #[error("pull failed: {0}")]
    PullFailed(String),

    #[error("push failed: {0}")]
    PushFailed(String),

    #[error("tag failed: {0}")]
    TagFailed(String),

    #[error("remove failed: {0}")]
    RemoveFailed(String),

    #[error("runtime unavailable: {0}")]
    Unavailable(String),

    #[error("runtime error: {0}")]
    Runtime(String),
}
