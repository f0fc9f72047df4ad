// ABOUTME: Bollard-based container runtime implementation.
// ABOUTME: Supports Docker and Podman via the Docker-compatible API.

use super::detection::RuntimeSocket;
use super::error::RuntimeError;
use super::types::LocalImage;
use super::RuntimeOps;
use crate::types::ImageRef;
use async_trait::async_trait;
use bollard::Docker;
use bollard::query_parameters::{
    CreateImageOptions, ListImagesOptions, PushImageOptions, RemoveImageOptions, TagImageOptions,
};
use futures::StreamExt;
use tracing::debug;

// =============================================================================
// Error Mapping Helpers
// =============================================================================

fn map_pull_error(e: bollard::errors::Error, image_name: &str) -> RuntimeError {
    match &e {
        bollard::errors::Error::DockerResponseServerError {
            status_code: 404, ..
        } => RuntimeError::NotFound(image_name.to_string()),
        _ => RuntimeError::PullFailed(format!("{image_name}: {e}")),
    }
}

fn map_tag_error(e: bollard::errors::Error, image_name: &str) -> RuntimeError {
    match &e {
        bollard::errors::Error::DockerResponseServerError {
            status_code: 404, ..
        } => RuntimeError::NotFound(image_name.to_string()),
        _ => RuntimeError::TagFailed(format!("{image_name}: {e}")),
    }
}

fn map_remove_error(e: bollard::errors::Error, image_name: &str) -> RuntimeError {
    match &e {
        bollard::errors::Error::DockerResponseServerError {
            status_code: 404, ..
        } => RuntimeError::NotFound(image_name.to_string()),
        _ => RuntimeError::RemoveFailed(format!("{image_name}: {e}")),
    }
}

// =============================================================================
// DockerRuntime
// =============================================================================

/// Container runtime implementation using bollard.
pub struct DockerRuntime {
    client: Docker,
}

impl DockerRuntime {
    pub fn new(client: Docker) -> Self {
        Self { client }
    }

    /// Connect to a runtime over a detected local socket.
    pub fn connect(socket: &RuntimeSocket) -> Result<Self, RuntimeError> {
        let client = Docker::connect_with_unix(&socket.path, 120, bollard::API_DEFAULT_VERSION)
            .map_err(|e| RuntimeError::Unavailable(e.to_string()))?;
        Ok(Self::new(client))
    }
}

/// Split a full reference into the name pushed/tagged to and its tag.
/// The Docker API wants `repo` and `tag` as separate parameters.
fn name_and_tag(reference: &ImageRef) -> (String, String) {
    let name = match reference.registry() {
        Some(registry) => format!("{}/{}", registry, reference.name()),
        None => reference.name().to_string(),
    };
    (name, reference.tag().unwrap_or("latest").to_string())
}

#[async_trait]
impl RuntimeOps for DockerRuntime {
    async fn pull(&self, reference: &ImageRef) -> Result<(), RuntimeError> {
        let image_name = reference.to_string();

        let opts = CreateImageOptions {
            from_image: Some(image_name.clone()),
            ..Default::default()
        };

        // Pull returns a stream of progress updates - consume it
        let mut stream = self.client.create_image(Some(opts), None, None);
        while let Some(result) = stream.next().await {
            let info = result.map_err(|e| map_pull_error(e, &image_name))?;
            if let Some(detail) = info.error_detail {
                let error = detail.message.unwrap_or_default();
                return Err(RuntimeError::PullFailed(format!("{image_name}: {error}")));
            }
        }

        Ok(())
    }

    async fn tag(&self, source: &ImageRef, target: &ImageRef) -> Result<(), RuntimeError> {
        let source_name = source.to_string();
        let (repo, tag) = name_and_tag(target);

        let opts = TagImageOptions {
            repo: Some(repo),
            tag: Some(tag),
        };

        self.client
            .tag_image(&source_name, Some(opts))
            .await
            .map_err(|e| map_tag_error(e, &source_name))
    }

    async fn push(&self, reference: &ImageRef) -> Result<(), RuntimeError> {
        let image_name = reference.to_string();
        let (name, tag) = name_and_tag(reference);

        let opts = PushImageOptions {
            tag: Some(tag),
            ..Default::default()
        };

        // Push errors often arrive in-stream rather than as transport errors
        let mut stream = self.client.push_image(&name, Some(opts), None);
        while let Some(result) = stream.next().await {
            let info =
                result.map_err(|e| RuntimeError::PushFailed(format!("{image_name}: {e}")))?;
            if let Some(detail) = info.error_detail {
                let error = detail.message.unwrap_or_default();
                return Err(RuntimeError::PushFailed(format!("{image_name}: {error}")));
            }
        }

        Ok(())
    }

    async fn remove_tag(&self, reference: &ImageRef) -> Result<(), RuntimeError> {
        let image_name = reference.to_string();

        let opts = RemoveImageOptions {
            force: false,
            ..Default::default()
        };

        self.client
            .remove_image(&image_name, Some(opts), None)
            .await
            .map_err(|e| map_remove_error(e, &image_name))?;

        Ok(())
    }

    async fn remove_image(&self, id: &str, force: bool) -> Result<(), RuntimeError> {
        let opts = RemoveImageOptions {
            force,
            ..Default::default()
        };

        self.client
            .remove_image(id, Some(opts), None)
            .await
            .map_err(|e| map_remove_error(e, id))?;

        Ok(())
    }

    async fn list_images(&self, limit: usize) -> Result<Vec<LocalImage>, RuntimeError> {
        let opts = ListImagesOptions {
            all: false,
            ..Default::default()
        };

        let summaries = self
            .client
            .list_images(Some(opts))
            .await
            .map_err(|e| RuntimeError::Runtime(format!("failed to list images: {e}")))?;

        let mut rows = Vec::new();
        'outer: for summary in summaries {
            // Untagged layers show up as "<none>:<none>"; skip them.
            let tags: Vec<&String> = summary
                .repo_tags
                .iter()
                .filter(|t| !t.contains("<none>"))
                .collect();
            if tags.is_empty() {
                continue;
            }

            // One inspect per image id covers all of its tags.
            let inspected = self.client.inspect_image(&summary.id).await;
            let (os, architecture) = match &inspected {
                Ok(details) => (details.os.clone(), details.architecture.clone()),
                Err(e) => {
                    debug!(id = %summary.id, error = %e, "image inspect failed");
                    (None, None)
                }
            };

            for reference in tags {
                let (repository, tag) = match reference.rsplit_once(':') {
                    Some((repo, tag)) => (repo.to_string(), tag.to_string()),
                    None => (reference.clone(), "latest".to_string()),
                };
                rows.push(LocalImage {
                    reference: reference.clone(),
                    repository,
                    tag,
                    id: summary.id.clone(),
                    size: summary.size,
                    os: os.clone(),
                    architecture: architecture.clone(),
                });
                if rows.len() >= limit {
                    break 'outer;
                }
            }
        }

        Ok(rows)
    }

    async fn host_architecture(&self) -> Result<String, RuntimeError> {
        let version = self
            .client
            .version()
            .await
            .map_err(|e| RuntimeError::Unavailable(e.to_string()))?;
        Ok(version
            .arch
            .filter(|a| !a.is_empty())
            .unwrap_or_else(|| std::env::consts::ARCH.to_string()))
    }

    async fn ping(&self) -> Result<(), RuntimeError> {
        self.client
            .ping()
            .await
            .map_err(|e| RuntimeError::Unavailable(e.to_string()))?;
        Ok(())
    }
}
