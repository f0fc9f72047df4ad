// ABOUTME: Error types for job submission and lookup.
// ABOUTME: Validation problems are rejected before anything is scheduled.

use crate::types::JobId;

/// Errors surfaced synchronously by the orchestrator's public operations.
///
/// Step failures during job execution never appear here; they are recorded
/// in the job's logs and item results instead.
#[derive(Debug, thiserror::Error)]
pub enum JobError {
    #[error("invalid job parameters: {0}")]
    Validation(String),

    #[error("job {0} not found")]
    NotFound(JobId),

    /// The runtime had to be consulted during submission (e.g. architecture
    /// detection) and was not reachable.
    #[error("runtime error: {0}")]
    Runtime(String),
}
