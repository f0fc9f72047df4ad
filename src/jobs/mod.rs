// ABOUTME: Job orchestration: the Job model, the bounded store, target
// ABOUTME: rewrite rules, and the orchestrator that runs job bodies.

mod error;
mod job;
mod orchestrator;
mod store;
mod target;

pub use error::JobError;
pub use job::{ItemOutcome, Job, JobKind, JobStatus};
pub use orchestrator::{
    LocalDeleteParams, LocalPushParams, MirrorParams, Orchestrator, RemoteRenameParams,
    RepoDeleteParams,
};
pub use store::JobStore;
pub use target::{ArchMode, PrefixMode, apply_prefix, arch_label, arch_suffixed_tag};
