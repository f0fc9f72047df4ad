// ABOUTME: Wire types for the registry HTTP API and the records derived from them.
// ABOUTME: Catalog pages, tag lists, manifests, and per-tag descriptors.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const MEDIA_TYPE_DOCKER_MANIFEST: &str = "application/vnd.docker.distribution.manifest.v2+json";
pub const MEDIA_TYPE_OCI_MANIFEST: &str = "application/vnd.oci.image.manifest.v1+json";
pub const MEDIA_TYPE_DOCKER_MANIFEST_LIST: &str =
    "application/vnd.docker.distribution.manifest.list.v2+json";
pub const MEDIA_TYPE_OCI_INDEX: &str = "application/vnd.oci.image.index.v1+json";

/// One page of the repository catalog.
#[derive(Debug, Clone, Serialize)]
pub struct RepositoryPage {
    pub repositories: Vec<String>,
    /// Continuation cursor; absent when the catalog is exhausted.
    pub next: Option<String>,
}

/// Minimal health snapshot: reachability plus the configured push host.
#[derive(Debug, Clone, Serialize)]
pub struct HealthStatus {
    pub healthy: bool,
    pub push_host: String,
}

/// Per-tag inspection result.
///
/// When inspection of a single tag fails only `tag` and `error` are set;
/// the failure never aborts the surrounding listing.
#[derive(Debug, Clone, Serialize)]
pub struct TagDescriptor {
    pub tag: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub digest: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub media_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size_bytes: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl TagDescriptor {
    pub fn failed(tag: &str, error: String) -> Self {
        Self {
            tag: tag.to_string(),
            digest: None,
            media_type: None,
            size_bytes: None,
            created_at: None,
            error: Some(error),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct CatalogResponse {
    #[serde(default)]
    pub repositories: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TagListResponse {
    #[serde(default)]
    pub tags: Option<Vec<String>>,
}

/// A content descriptor as it appears in manifests and indexes.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ContentDescriptor {
    #[serde(default)]
    pub digest: Option<String>,
    #[serde(default)]
    pub size: Option<u64>,
}

/// A manifest or manifest index; only the fields we inspect.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Manifest {
    #[serde(default)]
    pub media_type: Option<String>,
    #[serde(default)]
    pub config: Option<ContentDescriptor>,
    #[serde(default)]
    pub layers: Option<Vec<ContentDescriptor>>,
    #[serde(default)]
    pub manifests: Option<Vec<ContentDescriptor>>,
}

/// The slice of an image config blob we care about.
#[derive(Debug, Deserialize)]
pub(crate) struct ConfigBlob {
    #[serde(default)]
    pub created: Option<String>,
}

/// Media type with any parameters and casing stripped.
pub(crate) fn normalize_media_type(raw: &str) -> String {
    raw.split(';').next().unwrap_or("").trim().to_lowercase()
}

pub(crate) fn is_single_manifest(media_type: &str) -> bool {
    let normalized = normalize_media_type(media_type);
    normalized == MEDIA_TYPE_DOCKER_MANIFEST || normalized == MEDIA_TYPE_OCI_MANIFEST
}

pub(crate) fn is_manifest_index(media_type: &str) -> bool {
    let normalized = normalize_media_type(media_type);
    normalized == MEDIA_TYPE_DOCKER_MANIFEST_LIST || normalized == MEDIA_TYPE_OCI_INDEX
}

/// Estimate the stored size of a manifest: config + layer sizes for single
/// manifests, summed sub-manifest sizes for indexes, unknown otherwise.
pub(crate) fn estimate_size(manifest: &Manifest, media_type: &str) -> Option<u64> {
    if is_single_manifest(media_type) {
        let config = manifest.config.as_ref().and_then(|c| c.size).unwrap_or(0);
        let layers: u64 = manifest
            .layers
            .iter()
            .flatten()
            .filter_map(|l| l.size)
            .sum();
        return Some(config + layers);
    }

    if is_manifest_index(media_type) {
        let entries = manifest.manifests.as_ref()?;
        return Some(entries.iter().filter_map(|m| m.size).sum());
    }

    None
}
