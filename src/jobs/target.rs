// ABOUTME: Target-reference rewrite rules for push and rename jobs.
// ABOUTME: Prefix add/remove, architecture tag suffixes, host qualification.

use crate::jobs::error::JobError;
use crate::types::ImageRef;
use serde::{Deserialize, Serialize};

/// How the repository prefix is rewritten.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum PrefixMode {
    #[default]
    None,
    Add,
    Remove,
}

/// Where the architecture tag suffix comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ArchMode {
    None,
    #[default]
    Auto,
    Custom,
}

/// Normalize a raw machine string to a short architecture label.
pub fn arch_label(raw: &str) -> String {
    let machine = raw.trim().to_lowercase();
    match machine.as_str() {
        "x86_64" | "amd64" | "x64" => "x86".to_string(),
        "aarch64" | "arm64" => "arm".to_string(),
        m if m.starts_with("arm") => "arm".to_string(),
        "" => "unknown".to_string(),
        m => m.to_string(),
    }
}

/// Rewrite a repository path by prefix.
///
/// Adding is idempotent: an already-prefixed repository is unchanged.
/// Removing can empty the name, which callers must reject.
pub fn apply_prefix(repository: &str, mode: PrefixMode, prefix: &str) -> String {
    let base = repository.trim_matches('/');
    let prefix = prefix.trim_matches('/');
    if prefix.is_empty() || mode == PrefixMode::None {
        return base.to_string();
    }
    match mode {
        PrefixMode::Add => {
            if base == prefix || base.starts_with(&format!("{prefix}/")) {
                base.to_string()
            } else {
                format!("{prefix}/{base}")
            }
        }
        PrefixMode::Remove => {
            if let Some(rest) = base.strip_prefix(&format!("{prefix}/")) {
                rest.to_string()
            } else if base == prefix {
                String::new()
            } else {
                base.to_string()
            }
        }
        PrefixMode::None => base.to_string(),
    }
}

/// Append `-<arch>` to a tag unless it already carries the suffix.
pub fn arch_suffixed_tag(tag: &str, arch: &str) -> String {
    if arch.is_empty() {
        return tag.to_string();
    }
    let suffix = format!("-{arch}");
    if tag.ends_with(&suffix) {
        tag.to_string()
    } else {
        format!("{tag}{suffix}")
    }
}

/// Build a full pushable reference. An empty host yields a bare
/// `repository:tag` reference.
pub fn build_reference(host: &str, repository: &str, tag: &str) -> Result<ImageRef, JobError> {
    let raw = if host.is_empty() {
        format!("{repository}:{tag}")
    } else {
        format!("{host}/{repository}:{tag}")
    };
    ImageRef::parse(&raw).map_err(|e| JobError::Validation(format!("bad target reference {raw:?}: {e}")))
}

/// Derive the registry-side repository and tag a source image maps to:
/// the source's own path with any registry component stripped, and its
/// tag (or flattened digest) as the default tag.
pub fn derive_target(source: &ImageRef) -> (String, String) {
    (source.name().to_string(), source.default_target_tag())
}
