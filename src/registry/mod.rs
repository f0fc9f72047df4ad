// ABOUTME: Registry protocol client and the trait seam the orchestrator consumes.
// ABOUTME: Read operations plus digest-first deletion.

mod client;
mod error;
mod types;

pub use client::RegistryClient;
pub use error::RegistryError;
pub use types::{HealthStatus, RepositoryPage, TagDescriptor};

use async_trait::async_trait;

/// The registry operations job execution depends on.
///
/// A deliberately narrow seam: jobs enumerate tags, resolve digests, and
/// delete manifests. Everything else on [`RegistryClient`] is a read
/// surface for the listing layer.
#[async_trait]
pub trait RegistryOps: Send + Sync {
    async fn tag_names(&self, repository: &str) -> Result<Vec<String>, RegistryError>;

    async fn resolve_digest(
        &self,
        repository: &str,
        reference: &str,
    ) -> Result<String, RegistryError>;

    async fn delete_manifest(&self, repository: &str, digest: &str)
        -> Result<(), RegistryError>;
}

#[async_trait]
impl RegistryOps for RegistryClient {
    async fn tag_names(&self, repository: &str) -> Result<Vec<String>, RegistryError> {
        RegistryClient::tag_names(self, repository).await
    }

    async fn resolve_digest(
        &self,
        repository: &str,
        reference: &str,
    ) -> Result<String, RegistryError> {
        RegistryClient::resolve_digest(self, repository, reference).await
    }

    async fn delete_manifest(
        &self,
        repository: &str,
        digest: &str,
    ) -> Result<(), RegistryError> {
        RegistryClient::delete_manifest(self, repository, digest).await
    }
}
