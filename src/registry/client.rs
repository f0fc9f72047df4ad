// ABOUTME: Stateless HTTP client for the Docker/OCI registry v2 protocol.
// ABOUTME: Catalog paging, tag inspection, digest resolution, manifest deletion.

use super::error::RegistryError;
use super::types::{
    CatalogResponse, ConfigBlob, HealthStatus, Manifest, MEDIA_TYPE_DOCKER_MANIFEST,
    MEDIA_TYPE_DOCKER_MANIFEST_LIST, MEDIA_TYPE_OCI_INDEX, MEDIA_TYPE_OCI_MANIFEST,
    RepositoryPage, TagDescriptor, TagListResponse, estimate_size, is_single_manifest,
};
use chrono::{DateTime, Utc};
use std::time::Duration;
use tracing::debug;

const DIGEST_HEADER: &str = "Docker-Content-Digest";

/// Accept header covering every manifest flavour we can inspect.
fn manifest_accept() -> String {
    [
        MEDIA_TYPE_DOCKER_MANIFEST,
        MEDIA_TYPE_OCI_MANIFEST,
        MEDIA_TYPE_DOCKER_MANIFEST_LIST,
        MEDIA_TYPE_OCI_INDEX,
    ]
    .join(", ")
}

/// Client for a single registry endpoint.
///
/// Holds no mutable state beyond the configured base URL, push host, and
/// request timeout; it is cheap to clone and safe to share.
#[derive(Debug, Clone)]
pub struct RegistryClient {
    base_url: String,
    push_host: String,
    client: reqwest::Client,
}

impl RegistryClient {
    pub fn new(
        base_url: &str,
        push_host: &str,
        timeout: Duration,
    ) -> Result<Self, RegistryError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| RegistryError::Unavailable(e.to_string()))?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            push_host: push_host.to_string(),
            client,
        })
    }

    pub fn push_host(&self) -> &str {
        &self.push_host
    }

    /// Whether the registry endpoint answers at all. A 401 still counts:
    /// auth-gated registries are reachable, just locked.
    pub async fn ping(&self) -> bool {
        match self.client.get(self.url("/v2/")).send().await {
            Ok(response) => {
                let status = response.status().as_u16();
                status == 200 || status == 401
            }
            Err(_) => false,
        }
    }

    /// Reachability probe via the smallest possible catalog request.
    pub async fn health(&self) -> HealthStatus {
        let healthy = self.list_repositories(1, None, false).await.is_ok();
        HealthStatus {
            healthy,
            push_host: self.push_host.clone(),
        }
    }

    /// One page of the repository catalog.
    ///
    /// `last` is the opaque cursor from a previous page's `next`. With
    /// `non_empty_only` each candidate repository costs one extra tag-list
    /// probe; repositories that cannot be probed are treated as empty.
    pub async fn list_repositories(
        &self,
        n: usize,
        last: Option<&str>,
        non_empty_only: bool,
    ) -> Result<RepositoryPage, RegistryError> {
        let mut request = self
            .client
            .get(self.url("/v2/_catalog"))
            .query(&[("n", n.to_string())]);
        if let Some(last) = last {
            request = request.query(&[("last", last)]);
        }

        let response = check(request.send().await, "GET").await?;
        let next = next_cursor_from_link(
            response
                .headers()
                .get(reqwest::header::LINK)
                .and_then(|v| v.to_str().ok()),
        );
        let payload: CatalogResponse = response
            .json()
            .await
            .map_err(|e| RegistryError::Protocol(format!("invalid catalog response: {e}")))?;
        let mut repositories = payload.repositories.unwrap_or_default();

        if non_empty_only {
            let mut filtered = Vec::with_capacity(repositories.len());
            for repository in repositories {
                match self.tag_names(&repository).await {
                    Ok(tags) if !tags.is_empty() => filtered.push(repository),
                    Ok(_) => {}
                    Err(e) => {
                        debug!(repository, error = %e, "skipping unprobeable repository");
                    }
                }
            }
            repositories = filtered;
        }

        Ok(RepositoryPage { repositories, next })
    }

    /// Tag names for a repository. A null `tags` field means none.
    pub async fn tag_names(&self, repository: &str) -> Result<Vec<String>, RegistryError> {
        let url = self.url(&format!("/v2/{repository}/tags/list"));
        let response = check(self.client.get(url).send().await, "GET").await?;
        let payload: TagListResponse = response
            .json()
            .await
            .map_err(|e| RegistryError::Protocol(format!("invalid tag list response: {e}")))?;
        Ok(payload.tags.unwrap_or_default())
    }

    /// Full tag listing with per-tag details.
    ///
    /// Inspection failures are isolated: a tag with a corrupt manifest
    /// yields a descriptor carrying only its name and the error.
    pub async fn list_tags(&self, repository: &str) -> Result<Vec<TagDescriptor>, RegistryError> {
        let names = self.tag_names(repository).await?;
        let mut descriptors = Vec::with_capacity(names.len());
        for tag in &names {
            match self.tag_details(repository, tag).await {
                Ok(descriptor) => descriptors.push(descriptor),
                Err(e) => descriptors.push(TagDescriptor::failed(tag, e.to_string())),
            }
        }
        Ok(descriptors)
    }

    /// Inspect a single tag: digest, media type, size, build time.
    pub async fn tag_details(
        &self,
        repository: &str,
        tag: &str,
    ) -> Result<TagDescriptor, RegistryError> {
        let digest = self.resolve_digest(repository, tag).await?;
        let (manifest, media_type) = self.get_manifest(repository, &digest).await?;
        let size_bytes = estimate_size(&manifest, &media_type);
        let created_at = self.extract_created(repository, &manifest, &media_type).await;
        Ok(TagDescriptor {
            tag: tag.to_string(),
            digest: Some(digest),
            media_type: Some(media_type),
            size_bytes,
            created_at,
            error: None,
        })
    }

    /// Resolve a tag or digest reference to its content digest.
    ///
    /// Registries normally answer the HEAD with a `Docker-Content-Digest`
    /// header; some omit it, so a GET fallback covers those.
    pub async fn resolve_digest(
        &self,
        repository: &str,
        reference: &str,
    ) -> Result<String, RegistryError> {
        let url = self.manifest_url(repository, reference);
        let response = check(
            self.client
                .head(&url)
                .header(reqwest::header::ACCEPT, manifest_accept())
                .send()
                .await,
            "HEAD",
        )
        .await?;
        if let Some(digest) = header_digest(&response) {
            return Ok(digest);
        }

        let fallback = check(
            self.client
                .get(&url)
                .header(reqwest::header::ACCEPT, manifest_accept())
                .send()
                .await,
            "GET",
        )
        .await?;
        header_digest(&fallback).ok_or_else(|| {
            RegistryError::Protocol(format!("digest not found for {repository}:{reference}"))
        })
    }

    /// Fetch a manifest and its effective media type.
    pub(crate) async fn get_manifest(
        &self,
        repository: &str,
        reference: &str,
    ) -> Result<(Manifest, String), RegistryError> {
        let url = self.manifest_url(repository, reference);
        let response = check(
            self.client
                .get(&url)
                .header(reqwest::header::ACCEPT, manifest_accept())
                .send()
                .await,
            "GET",
        )
        .await?;
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let manifest: Manifest = response
            .json()
            .await
            .map_err(|e| RegistryError::Protocol(format!("invalid manifest: {e}")))?;
        let media_type = content_type
            .or_else(|| manifest.media_type.clone())
            .unwrap_or_else(|| MEDIA_TYPE_DOCKER_MANIFEST.to_string());
        Ok((manifest, media_type))
    }

    /// Delete a tag. Registries only delete by digest, so the tag is
    /// resolved first; resolution failure aborts with nothing mutated.
    /// Returns the digest that was deleted.
    pub async fn delete_tag(&self, repository: &str, tag: &str) -> Result<String, RegistryError> {
        let digest = self.resolve_digest(repository, tag).await?;
        self.delete_manifest(repository, &digest).await?;
        Ok(digest)
    }

    pub async fn delete_manifest(
        &self,
        repository: &str,
        digest: &str,
    ) -> Result<(), RegistryError> {
        let url = self.manifest_url(repository, digest);
        check(self.client.delete(&url).send().await, "DELETE").await?;
        Ok(())
    }

    /// Build time from the image config blob, for single manifests only.
    /// Any failure along the way degrades to `None`; build time is
    /// cosmetic and never worth failing a listing for.
    async fn extract_created(
        &self,
        repository: &str,
        manifest: &Manifest,
        media_type: &str,
    ) -> Option<DateTime<Utc>> {
        if !is_single_manifest(media_type) {
            return None;
        }
        let config_digest = manifest.config.as_ref()?.digest.as_deref()?;
        let url = self.url(&format!("/v2/{repository}/blobs/{config_digest}"));
        let response = check(self.client.get(url).send().await, "GET").await.ok()?;
        let blob: ConfigBlob = response.json().await.ok()?;
        let created = blob.created?;
        DateTime::parse_from_rfc3339(&created)
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Manifest URL for a tag or digest reference. Tags are percent-encoded;
    /// digests keep their `:` (valid in a path segment).
    fn manifest_url(&self, repository: &str, reference: &str) -> String {
        let encoded = if reference.starts_with("sha256:") || reference.contains("sha512:") {
            reference.to_string()
        } else {
            urlencoding::encode(reference).into_owned()
        };
        format!("{}/v2/{}/manifests/{}", self.base_url, repository, encoded)
    }
}

fn header_digest(response: &reqwest::Response) -> Option<String> {
    response
        .headers()
        .get(DIGEST_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Map transport failures and non-success statuses to `RegistryError`.
async fn check(
    result: Result<reqwest::Response, reqwest::Error>,
    method: &str,
) -> Result<reqwest::Response, RegistryError> {
    let response = result.map_err(|e| {
        if e.is_timeout() {
            RegistryError::Unavailable(format!("request timed out: {e}"))
        } else {
            RegistryError::Unavailable(e.to_string())
        }
    })?;

    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let preview: String = body.chars().take(300).collect();
    match status.as_u16() {
        404 => Err(RegistryError::NotFound(preview)),
        405 if method == "DELETE" => Err(RegistryError::DeleteDisabled),
        code => Err(RegistryError::Api {
            status: code,
            message: preview,
        }),
    }
}

/// Extract the `last` query parameter from an RFC 5988 `Link` header's
/// `rel="next"` entry, the cursor format the registry catalog uses.
pub(crate) fn next_cursor_from_link(link: Option<&str>) -> Option<String> {
    let link = link?;
    for raw_part in link.split(',') {
        let part = raw_part.trim();
        if !part.contains("rel=\"next\"") {
            continue;
        }
        let url = part.strip_prefix('<')?.split('>').next()?;
        let query = url.split_once('?').map(|(_, q)| q)?;
        for pair in query.split('&') {
            if let Some(value) = pair.strip_prefix("last=") {
                let decoded = urlencoding::decode(value).ok()?;
                return Some(decoded.into_owned());
            }
        }
    }
    None
}
