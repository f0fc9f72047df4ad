// ABOUTME: Container runtime seam: trait, bollard-backed implementation, detection.
// ABOUTME: Pull, tag, push, remove, and local image listing.

mod detection;
mod docker;
mod error;
mod types;

pub use detection::{DetectionError, RuntimeSocket, detect_local};
pub use docker::DockerRuntime;
pub use error::RuntimeError;
pub use types::LocalImage;

use crate::types::ImageRef;
use async_trait::async_trait;

/// The container runtime capabilities job execution depends on.
///
/// Every call is a single runtime API invocation; failures surface as
/// [`RuntimeError`] and are never retried here.
#[async_trait]
pub trait RuntimeOps: Send + Sync {
    /// Pull an image from its registry.
    async fn pull(&self, reference: &ImageRef) -> Result<(), RuntimeError>;

    /// Apply a new reference to an existing local image.
    async fn tag(&self, source: &ImageRef, target: &ImageRef) -> Result<(), RuntimeError>;

    /// Push a local reference to its registry.
    async fn push(&self, reference: &ImageRef) -> Result<(), RuntimeError>;

    /// Remove a single local tag (untag; image survives if referenced).
    async fn remove_tag(&self, reference: &ImageRef) -> Result<(), RuntimeError>;

    /// Remove an image by id. With `force` this also drops every tag
    /// still referencing the id.
    async fn remove_image(&self, id: &str, force: bool) -> Result<(), RuntimeError>;

    /// List locally stored image tags, up to `limit`.
    async fn list_images(&self, limit: usize) -> Result<Vec<LocalImage>, RuntimeError>;

    /// Raw machine architecture of the runtime host (e.g. `x86_64`).
    async fn host_architecture(&self) -> Result<String, RuntimeError>;

    /// Check connectivity to the runtime.
    async fn ping(&self) -> Result<(), RuntimeError>;
}
