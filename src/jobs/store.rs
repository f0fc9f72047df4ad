// ABOUTME: Bounded in-memory job store with insertion-order eviction.
// ABOUTME: All access is serialized behind one mutex; reads return snapshots.

use super::job::{Job, JobStatus};
use crate::types::JobId;
use chrono::Utc;
use parking_lot::Mutex;
use std::collections::VecDeque;
use tracing::warn;

/// Process-wide job history, bounded by a retention count.
///
/// On insertion beyond capacity the oldest job by creation order is
/// evicted regardless of status — including a still-running job's record,
/// whose execution task then updates into the void. A known limitation of
/// the bounded-history design, kept deliberately.
pub struct JobStore {
    retention: usize,
    jobs: Mutex<VecDeque<Job>>,
}

impl JobStore {
    pub fn new(retention: usize) -> Self {
        Self {
            retention: retention.max(1),
            jobs: Mutex::new(VecDeque::new()),
        }
    }

    /// Insert a new job, evicting the oldest when over capacity.
    pub fn insert(&self, job: Job) {
        let mut jobs = self.jobs.lock();
        jobs.push_back(job);
        while jobs.len() > self.retention {
            if let Some(evicted) = jobs.pop_front() {
                warn!(id = %evicted.id, status = ?evicted.status, "evicting job from history");
            }
        }
    }

    /// Snapshot of one job.
    pub fn get(&self, id: &JobId) -> Option<Job> {
        self.jobs.lock().iter().find(|j| &j.id == id).cloned()
    }

    /// Most-recent-first snapshots, at most `limit`.
    pub fn list(&self, limit: usize) -> Vec<Job> {
        self.jobs.lock().iter().rev().take(limit).cloned().collect()
    }

    /// Append a log line, prefixed with a UTC `HH:MM:SS` timestamp.
    pub fn append_log(&self, id: &JobId, message: &str) {
        self.update(id, |job| {
            job.logs
                .push(format!("{} {}", Utc::now().format("%H:%M:%S"), message));
        });
    }

    /// Record a per-item outcome.
    pub fn record_item(&self, id: &JobId, outcome: super::job::ItemOutcome) {
        self.update(id, |job| job.item_results.push(outcome));
    }

    /// Overwrite the sub-item count once run-time enumeration settles it.
    pub fn set_total_items(&self, id: &JobId, total: usize) {
        self.update(id, |job| job.total_items = total.max(1));
    }

    /// Advance the job status. Transitions out of a terminal state are
    /// ignored: status moves forward only.
    pub fn set_status(&self, id: &JobId, status: JobStatus) {
        self.update(id, |job| {
            if job.status.is_terminal() {
                warn!(id = %job.id, from = ?job.status, to = ?status, "ignoring status change on finished job");
                return;
            }
            job.status = status;
        });
    }

    /// Derive and set the final status of a batch from its item results.
    pub fn finish_from_items(&self, id: &JobId) {
        self.update(id, |job| {
            if !job.status.is_terminal() {
                job.status = job.derived_status();
            }
        });
    }

    fn update(&self, id: &JobId, f: impl FnOnce(&mut Job)) {
        let mut jobs = self.jobs.lock();
        // Evicted jobs silently swallow updates from their execution task.
        if let Some(job) = jobs.iter_mut().find(|j| &j.id == id) {
            f(job);
            job.updated_at = Utc::now();
        }
    }
}
