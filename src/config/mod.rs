// ABOUTME: Environment-driven settings for registry access and job retention.
// ABOUTME: Normalizes registry URLs and derives the docker-facing push host.

use crate::error::{Error, Result};
use std::time::Duration;

pub const DEFAULT_REGISTRY_URL: &str = "http://127.0.0.1:5000";

/// Fewer retained jobs than this makes the history useless for polling
/// observers, so configured values are clamped up.
pub const MIN_JOB_RETENTION: usize = 20;

/// Runtime settings, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Base URL of the registry HTTP API, scheme included, no trailing slash.
    pub registry_api_url: String,
    /// Host (no scheme) that image references are tagged with for pushes.
    pub registry_push_host: String,
    /// Timeout applied to every registry request.
    pub request_timeout: Duration,
    /// Upper bound on a single catalog page.
    pub max_catalog_results: usize,
    /// Maximum number of job records retained in memory.
    pub job_retention: usize,
}

impl Settings {
    /// Load settings from environment variables, falling back to defaults.
    ///
    /// Recognised variables: `REGISTRY_API_URL`, `REGISTRY_PUSH_HOST`,
    /// `REQUEST_TIMEOUT_SEC`, `MAX_CATALOG_RESULTS`, `JOB_RETENTION`.
    pub fn from_env() -> Result<Self> {
        let registry_api_url = normalize_registry_url(std::env::var("REGISTRY_API_URL").ok());
        let registry_push_host = resolve_push_host(
            &registry_api_url,
            std::env::var("REGISTRY_PUSH_HOST").ok().as_deref(),
        );
        let timeout_secs = parse_env("REQUEST_TIMEOUT_SEC", 20u64)?;
        let max_catalog_results = parse_env("MAX_CATALOG_RESULTS", 200usize)?;
        let job_retention: usize = parse_env("JOB_RETENTION", 120usize)?;

        Ok(Self {
            registry_api_url,
            registry_push_host,
            request_timeout: Duration::from_secs(timeout_secs),
            max_catalog_results,
            job_retention: job_retention.max(MIN_JOB_RETENTION),
        })
    }
}

fn parse_env<T: std::str::FromStr>(name: &str, default: T) -> Result<T> {
    match std::env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| Error::InvalidConfig(format!("{name} is not a valid number: {raw:?}"))),
        Err(_) => Ok(default),
    }
}

/// Normalize a registry URL: default when unset, add `http://` when the
/// scheme is missing, strip trailing slashes.
pub fn normalize_registry_url(raw: Option<String>) -> String {
    let value = raw.map(|v| v.trim().to_string()).unwrap_or_default();
    let value = if value.is_empty() {
        DEFAULT_REGISTRY_URL.to_string()
    } else if value.starts_with("http://") || value.starts_with("https://") {
        value
    } else {
        format!("http://{value}")
    };
    value.trim_end_matches('/').to_string()
}

/// Derive the push host: the explicit override with any scheme stripped,
/// or the authority part of the API URL.
pub fn resolve_push_host(registry_url: &str, explicit: Option<&str>) -> String {
    if let Some(host) = explicit {
        let host = host.trim();
        if !host.is_empty() {
            return host
                .trim_start_matches("http://")
                .trim_start_matches("https://")
                .trim_end_matches('/')
                .to_string();
        }
    }
    registry_url
        .trim_start_matches("http://")
        .trim_start_matches("https://")
        .split('/')
        .next()
        .unwrap_or_default()
        .to_string()
}
