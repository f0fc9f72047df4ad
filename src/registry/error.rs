// ABOUTME: Error types for registry protocol operations.
// ABOUTME: Distinguishes missing references from transport and API failures.

/// Errors from registry protocol operations.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    /// The repository, tag, or digest does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// Transport-level failure: connection refused, DNS, timeout.
    #[error("registry unavailable: {0}")]
    Unavailable(String),

    /// The registry refused a manifest delete (HTTP 405). Deletion must be
    /// enabled server-side with REGISTRY_STORAGE_DELETE_ENABLED=true.
    #[error("registry denied manifest delete (405); enable REGISTRY_STORAGE_DELETE_ENABLED=true on the registry and restart it")]
    DeleteDisabled,

    /// Any other non-success response from the registry API.
    #[error("registry API error {status}: {message}")]
    Api { status: u16, message: String },

    /// The registry answered, but not with what the protocol requires.
    #[error("registry protocol error: {0}")]
    Protocol(String),
}

impl RegistryError {
    /// Whether this error means the reference simply was not there.
    pub fn is_not_found(&self) -> bool {
        matches!(self, RegistryError::NotFound(_))
    }
}
