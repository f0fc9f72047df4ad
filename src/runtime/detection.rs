// ABOUTME: Local runtime socket detection.
// ABOUTME: Checks Podman sockets first, then Docker.

use std::path::Path;

const ROOTFUL_PODMAN: &str = "/run/podman/podman.sock";
const DOCKER_SOCKET: &str = "/var/run/docker.sock";

/// Error during runtime detection.
#[derive(Debug, thiserror::Error)]
pub enum DetectionError {
    #[error("no container runtime found (checked Podman and Docker sockets)")]
    NoRuntimeFound,
}

/// A detected runtime socket.
#[derive(Debug, Clone)]
pub struct RuntimeSocket {
    pub path: String,
}

/// Detect a container runtime socket on the local system.
///
/// Detection order:
/// 1. Rootless Podman socket (`/run/user/$UID/podman/podman.sock`)
/// 2. Rootful Podman socket (`/run/podman/podman.sock`)
/// 3. Docker socket (`/var/run/docker.sock`)
pub fn detect_local() -> Result<RuntimeSocket, DetectionError> {
    if let Some(uid) = get_uid() {
        let rootless = format!("/run/user/{uid}/podman/podman.sock");
        if Path::new(&rootless).exists() {
            return Ok(RuntimeSocket { path: rootless });
        }
    }

    for candidate in [ROOTFUL_PODMAN, DOCKER_SOCKET] {
        if Path::new(candidate).exists() {
            return Ok(RuntimeSocket {
                path: candidate.to_string(),
            });
        }
    }

    Err(DetectionError::NoRuntimeFound)
}

fn get_uid() -> Option<String> {
    std::env::var("UID").ok().or_else(|| {
        std::fs::read_to_string("/proc/self/status")
            .ok()
            .and_then(|s| {
                s.lines()
                    .find(|l| l.starts_with("Uid:"))
                    .and_then(|l| l.split_whitespace().nth(1))
                    .map(|s| s.to_string())
            })
    })
}
