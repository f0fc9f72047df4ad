// ABOUTME: Records describing locally stored images.
// ABOUTME: Read-only data supplied by the container runtime.

use serde::Serialize;

/// One locally stored image tag.
///
/// A single image id can appear under several references; callers that
/// remove by id must account for that.
#[derive(Debug, Clone, Serialize)]
pub struct LocalImage {
    /// Full `repository:tag` reference.
    pub reference: String,
    pub repository: String,
    pub tag: String,
    /// Runtime-assigned image id (shared across tags of the same image).
    pub id: String,
    /// Size in bytes as reported by the runtime.
    pub size: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub os: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub architecture: Option<String>,
}
