// ABOUTME: The Job record: status, logs, timestamps, and per-item outcomes.
// ABOUTME: Mutated only by the job's own execution task via the store.

use crate::types::JobId;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// What a job does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum JobKind {
    /// Pull an external image and push it into the managed registry.
    MirrorSync,
    /// Batch-rename and push local images into the registry.
    LocalPush,
    /// Batch-rename remote repositories by prefix.
    RemotePrefixRename,
    /// Delete every tag of the selected repositories.
    RepoDelete,
    /// Remove local images by id.
    LocalDelete,
}

/// Job lifecycle state. Transitions only move forward:
/// `Queued -> Running -> {Success, Failed}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Queued,
    Running,
    Success,
    Failed,
}

impl JobStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, JobStatus::Success | JobStatus::Failed)
    }
}

/// Outcome of one sub-item of a batch job.
#[derive(Debug, Clone, Serialize)]
pub struct ItemOutcome {
    /// What was acted on: an image reference or `repository:tag` pair.
    pub item: String,
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ItemOutcome {
    pub fn ok(item: impl Into<String>) -> Self {
        Self {
            item: item.into(),
            ok: true,
            error: None,
        }
    }

    pub fn failed(item: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            item: item.into(),
            ok: false,
            error: Some(error.into()),
        }
    }
}

/// One unit of orchestrated work.
#[derive(Debug, Clone, Serialize)]
pub struct Job {
    pub id: JobId,
    pub kind: JobKind,
    pub status: JobStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Append-only step log, in the exact order steps were attempted.
    pub logs: Vec<String>,
    /// Human-readable description of what is acted on.
    pub source_summary: String,
    /// Human-readable description of where it goes.
    pub target_summary: String,
    /// Number of sub-items; batch jobs discovering sub-items at run time
    /// update this once enumeration completes.
    pub total_items: usize,
    /// Per-item outcomes, populated incrementally.
    pub item_results: Vec<ItemOutcome>,
}

impl Job {
    pub fn new(
        kind: JobKind,
        source_summary: impl Into<String>,
        target_summary: impl Into<String>,
        total_items: usize,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: JobId::generate(),
            kind,
            status: JobStatus::Queued,
            created_at: now,
            updated_at: now,
            logs: Vec::new(),
            source_summary: source_summary.into(),
            target_summary: target_summary.into(),
            total_items: total_items.max(1),
            item_results: Vec::new(),
        }
    }

    /// The aggregate status a finished batch derives from its outcomes.
    pub fn derived_status(&self) -> JobStatus {
        if self.item_results.iter().any(|r| !r.ok) {
            JobStatus::Failed
        } else {
            JobStatus::Success
        }
    }
}
