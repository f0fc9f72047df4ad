// ABOUTME: Application-wide error type for harbormaster.
// ABOUTME: Aggregates configuration, registry, runtime, and job errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Registry(#[from] crate::registry::RegistryError),

    #[error(transparent)]
    Runtime(#[from] crate::runtime::RuntimeError),

    #[error(transparent)]
    Job(#[from] crate::jobs::JobError),

    #[error("job failed: {0}")]
    JobFailed(String),

    #[error("runtime detection failed: {0}")]
    Detection(#[from] crate::runtime::DetectionError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
