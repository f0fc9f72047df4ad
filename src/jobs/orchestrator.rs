// ABOUTME: Job orchestrator: validates submissions, schedules job bodies,
// ABOUTME: and records progress. Steps run sequentially; batches continue on error.

use super::error::JobError;
use super::job::{Job, ItemOutcome, JobKind, JobStatus};
use super::store::JobStore;
use super::target::{
    ArchMode, PrefixMode, apply_prefix, arch_label, arch_suffixed_tag, build_reference,
    derive_target,
};
use crate::registry::RegistryOps;
use crate::runtime::{LocalImage, RuntimeError, RuntimeOps};
use crate::types::{ImageRef, JobId};
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::info;

/// Parameters for a mirror-sync job.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MirrorParams {
    pub source_image: String,
    #[serde(default)]
    pub target_repository: Option<String>,
    #[serde(default)]
    pub target_tag: Option<String>,
    /// Remove the locally created target tag after a successful push.
    #[serde(default)]
    pub cleanup_local_tag: bool,
}

/// Parameters for a local-push job.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LocalPushParams {
    pub image_refs: Vec<String>,
    #[serde(default)]
    pub arch_mode: ArchMode,
    #[serde(default)]
    pub arch_value: String,
    #[serde(default)]
    pub prefix_mode: PrefixMode,
    #[serde(default)]
    pub prefix_value: String,
    #[serde(default)]
    pub cleanup_local_tag: bool,
    /// Delete the registry-side *source* tag after a successful push.
    /// Only meaningful when the source was itself registry-backed.
    #[serde(default)]
    pub cleanup_registry_source_tag: bool,
}

/// Parameters for a remote prefix-rename job.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RemoteRenameParams {
    pub repositories: Vec<String>,
    #[serde(default)]
    pub prefix_mode: PrefixMode,
    #[serde(default)]
    pub prefix_value: String,
    /// Delete the old tag from the registry after a successful rename.
    #[serde(default)]
    pub cleanup_source_tag: bool,
}

/// Parameters for a repository-delete job.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RepoDeleteParams {
    pub repositories: Vec<String>,
}

/// Parameters for a local-delete job.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LocalDeleteParams {
    pub image_refs: Vec<String>,
}

/// One planned local-push item, resolved at submission time.
#[derive(Debug, Clone)]
struct PushPlan {
    source: ImageRef,
    source_repo: String,
    source_tag: String,
    target: ImageRef,
}

/// Owns job lifecycle: creation, scheduled execution, bounded retention,
/// lookup. Each job body runs as an independent tokio task; within a job
/// all steps are strictly sequential.
pub struct Orchestrator<R, C> {
    registry: Arc<R>,
    runtime: Arc<C>,
    store: Arc<JobStore>,
    push_host: String,
}

/// Log one step's outcome and convert its error into the item-level string.
fn step<T, E: std::fmt::Display>(
    store: &JobStore,
    id: &JobId,
    label: &str,
    subject: &str,
    result: Result<T, E>,
) -> Result<T, String> {
    match result {
        Ok(value) => {
            store.append_log(id, &format!("[{label}] {subject} ok"));
            Ok(value)
        }
        Err(e) => {
            store.append_log(id, &format!("[{label}] {subject} failed: {e}"));
            Err(e.to_string())
        }
    }
}

impl<R, C> Orchestrator<R, C>
where
    R: RegistryOps + 'static,
    C: RuntimeOps + 'static,
{
    pub fn new(registry: Arc<R>, runtime: Arc<C>, push_host: &str, retention: usize) -> Self {
        Self {
            registry,
            runtime,
            store: Arc::new(JobStore::new(retention)),
            push_host: push_host.to_string(),
        }
    }

    /// Snapshot of one job.
    pub fn get(&self, id: &JobId) -> Result<Job, JobError> {
        self.store.get(id).ok_or_else(|| JobError::NotFound(id.clone()))
    }

    /// Most-recent-first job snapshots.
    pub fn list(&self, limit: usize) -> Vec<Job> {
        self.store.list(limit)
    }

    /// Local image listing, passed through to the runtime.
    pub async fn local_images(&self, limit: usize) -> Result<Vec<LocalImage>, RuntimeError> {
        self.runtime.list_images(limit).await
    }

    /// Host architecture as a short label (`x86`, `arm`, ...).
    pub async fn detected_arch(&self) -> Result<String, RuntimeError> {
        Ok(arch_label(&self.runtime.host_architecture().await?))
    }

    // =========================================================================
    // Submissions
    // =========================================================================

    /// Mirror an external image into the managed registry.
    pub fn submit_mirror(&self, params: &MirrorParams) -> Result<Job, JobError> {
        let source = ImageRef::parse(&params.source_image)
            .map_err(|e| JobError::Validation(format!("source_image: {e}")))?;
        let (default_repo, default_tag) = derive_target(&source);
        let repository = trimmed_or(params.target_repository.as_deref(), &default_repo);
        let tag = trimmed_or(params.target_tag.as_deref(), &default_tag);
        let target = build_reference(&self.push_host, &repository, &tag)?;

        let job = Job::new(JobKind::MirrorSync, source.to_string(), target.to_string(), 1);
        let id = job.id.clone();
        self.store.insert(job);
        info!(%id, %source, %target, "scheduling mirror-sync job");

        let store = Arc::clone(&self.store);
        let runtime = Arc::clone(&self.runtime);
        let cleanup = params.cleanup_local_tag;
        let snapshot_id = id.clone();
        tokio::spawn(async move {
            Self::run_mirror(store, runtime, id, source, target, cleanup).await;
        });
        self.get(&snapshot_id)
    }

    /// Batch-rename and push local images into the registry.
    pub async fn submit_local_push(&self, params: &LocalPushParams) -> Result<Job, JobError> {
        let refs = non_empty_refs(&params.image_refs, "image_refs")?;

        let arch = match params.arch_mode {
            ArchMode::None => String::new(),
            ArchMode::Custom => {
                let value = params.arch_value.trim().to_lowercase();
                if value.is_empty() {
                    return Err(JobError::Validation(
                        "arch_value is required when arch_mode=custom".to_string(),
                    ));
                }
                value
            }
            ArchMode::Auto => {
                let raw = self
                    .runtime
                    .host_architecture()
                    .await
                    .map_err(|e| JobError::Runtime(e.to_string()))?;
                arch_label(&raw)
            }
        };

        require_prefix_value(params.prefix_mode, &params.prefix_value)?;

        let mut plans = Vec::with_capacity(refs.len());
        for raw in &refs {
            let source = ImageRef::parse(raw)
                .map_err(|e| JobError::Validation(format!("image_refs: {raw:?}: {e}")))?;
            let (source_repo, source_tag) = derive_target(&source);
            let target_repo = apply_prefix(&source_repo, params.prefix_mode, &params.prefix_value);
            if target_repo.is_empty() {
                return Err(JobError::Validation(format!(
                    "prefix removal empties the repository name for {raw:?}"
                )));
            }
            let target_tag = arch_suffixed_tag(&source_tag, &arch);
            let target = build_reference(&self.push_host, &target_repo, &target_tag)?;
            plans.push(PushPlan {
                source,
                source_repo,
                source_tag,
                target,
            });
        }

        let job = Job::new(
            JobKind::LocalPush,
            format!("{} local images", plans.len()),
            self.push_host.clone(),
            plans.len(),
        );
        let id = job.id.clone();
        self.store.insert(job);
        self.store.append_log(
            &id,
            &format!(
                "[plan] arch_mode={:?} arch={} prefix_mode={:?} prefix={}",
                params.arch_mode,
                if arch.is_empty() { "-" } else { &arch },
                params.prefix_mode,
                if params.prefix_value.is_empty() {
                    "-"
                } else {
                    &params.prefix_value
                },
            ),
        );
        info!(%id, items = plans.len(), "scheduling local-push job");

        let store = Arc::clone(&self.store);
        let runtime = Arc::clone(&self.runtime);
        let registry = Arc::clone(&self.registry);
        let cleanup_local = params.cleanup_local_tag;
        let cleanup_registry = params.cleanup_registry_source_tag;
        let snapshot_id = id.clone();
        tokio::spawn(async move {
            Self::run_local_push(
                store,
                runtime,
                registry,
                id,
                plans,
                cleanup_local,
                cleanup_registry,
            )
            .await;
        });
        self.get(&snapshot_id)
    }

    /// Batch-rename remote repositories by prefix.
    pub fn submit_remote_rename(&self, params: &RemoteRenameParams) -> Result<Job, JobError> {
        let repositories = non_empty_refs(&params.repositories, "repositories")?;
        if params.prefix_mode == PrefixMode::None {
            return Err(JobError::Validation(
                "prefix_mode must be add or remove for a rename".to_string(),
            ));
        }
        require_prefix_value(params.prefix_mode, &params.prefix_value)?;

        let job = Job::new(
            JobKind::RemotePrefixRename,
            format!("{} repositories", repositories.len()),
            self.push_host.clone(),
            repositories.len(),
        );
        let id = job.id.clone();
        self.store.insert(job);
        info!(%id, repositories = repositories.len(), "scheduling remote-prefix-rename job");

        let store = Arc::clone(&self.store);
        let runtime = Arc::clone(&self.runtime);
        let registry = Arc::clone(&self.registry);
        let push_host = self.push_host.clone();
        let mode = params.prefix_mode;
        let prefix = params.prefix_value.clone();
        let cleanup = params.cleanup_source_tag;
        let snapshot_id = id.clone();
        tokio::spawn(async move {
            Self::run_remote_rename(
                store, runtime, registry, id, push_host, repositories, mode, prefix, cleanup,
            )
            .await;
        });
        self.get(&snapshot_id)
    }

    /// Delete every tag of the selected repositories.
    pub fn submit_repo_delete(&self, params: &RepoDeleteParams) -> Result<Job, JobError> {
        let repositories = non_empty_refs(&params.repositories, "repositories")?;

        let job = Job::new(
            JobKind::RepoDelete,
            format!("{} repositories", repositories.len()),
            "registry".to_string(),
            repositories.len(),
        );
        let id = job.id.clone();
        self.store.insert(job);
        info!(%id, repositories = repositories.len(), "scheduling repo-delete job");

        let store = Arc::clone(&self.store);
        let registry = Arc::clone(&self.registry);
        let snapshot_id = id.clone();
        tokio::spawn(async move {
            Self::run_repo_delete(store, registry, id, repositories).await;
        });
        self.get(&snapshot_id)
    }

    /// Remove local images by id, deduplicated across references.
    pub fn submit_local_delete(&self, params: &LocalDeleteParams) -> Result<Job, JobError> {
        let refs = non_empty_refs(&params.image_refs, "image_refs")?;
        for raw in &refs {
            ImageRef::parse(raw)
                .map_err(|e| JobError::Validation(format!("image_refs: {raw:?}: {e}")))?;
        }

        let job = Job::new(
            JobKind::LocalDelete,
            format!("{} local images", refs.len()),
            "local runtime".to_string(),
            refs.len(),
        );
        let id = job.id.clone();
        self.store.insert(job);
        info!(%id, items = refs.len(), "scheduling local-delete job");

        let store = Arc::clone(&self.store);
        let runtime = Arc::clone(&self.runtime);
        let snapshot_id = id.clone();
        tokio::spawn(async move {
            Self::run_local_delete(store, runtime, id, refs).await;
        });
        self.get(&snapshot_id)
    }

    // =========================================================================
    // Job bodies
    // =========================================================================

    async fn run_mirror(
        store: Arc<JobStore>,
        runtime: Arc<C>,
        id: JobId,
        source: ImageRef,
        target: ImageRef,
        cleanup_local_tag: bool,
    ) {
        store.set_status(&id, JobStatus::Running);
        let item = source.to_string();

        let outcome: Result<(), String> = async {
            step(&store, &id, "pull", &source.to_string(), runtime.pull(&source).await)?;
            step(
                &store,
                &id,
                "tag",
                &format!("{source} => {target}"),
                runtime.tag(&source, &target).await,
            )?;
            step(&store, &id, "push", &target.to_string(), runtime.push(&target).await)?;
            if cleanup_local_tag {
                step(
                    &store,
                    &id,
                    "cleanup",
                    &target.to_string(),
                    runtime.remove_tag(&target).await,
                )?;
            }
            Ok(())
        }
        .await;

        match outcome {
            Ok(()) => {
                store.record_item(&id, ItemOutcome::ok(item));
                store.set_status(&id, JobStatus::Success);
            }
            Err(error) => {
                store.record_item(&id, ItemOutcome::failed(item, error));
                store.set_status(&id, JobStatus::Failed);
            }
        }
    }

    async fn run_local_push(
        store: Arc<JobStore>,
        runtime: Arc<C>,
        registry: Arc<R>,
        id: JobId,
        plans: Vec<PushPlan>,
        cleanup_local_tag: bool,
        cleanup_registry_source_tag: bool,
    ) {
        store.set_status(&id, JobStatus::Running);

        for plan in &plans {
            store.append_log(&id, &format!("[map] {} => {}", plan.source, plan.target));
            let outcome: Result<(), String> = async {
                step(
                    &store,
                    &id,
                    "tag",
                    &format!("{} => {}", plan.source, plan.target),
                    runtime.tag(&plan.source, &plan.target).await,
                )?;
                step(
                    &store,
                    &id,
                    "push",
                    &plan.target.to_string(),
                    runtime.push(&plan.target).await,
                )?;
                if cleanup_local_tag {
                    step(
                        &store,
                        &id,
                        "cleanup-local",
                        &plan.source.to_string(),
                        runtime.remove_tag(&plan.source).await,
                    )?;
                }
                if cleanup_registry_source_tag {
                    let subject = format!("{}:{}", plan.source_repo, plan.source_tag);
                    let digest = step(
                        &store,
                        &id,
                        "cleanup-resolve",
                        &subject,
                        registry.resolve_digest(&plan.source_repo, &plan.source_tag).await,
                    )?;
                    step(
                        &store,
                        &id,
                        "cleanup-delete",
                        &subject,
                        registry.delete_manifest(&plan.source_repo, &digest).await,
                    )?;
                }
                Ok(())
            }
            .await;

            let item = plan.source.to_string();
            match outcome {
                Ok(()) => store.record_item(&id, ItemOutcome::ok(item)),
                Err(error) => store.record_item(&id, ItemOutcome::failed(item, error)),
            }
        }

        store.finish_from_items(&id);
    }

    #[allow(clippy::too_many_arguments)]
    async fn run_remote_rename(
        store: Arc<JobStore>,
        runtime: Arc<C>,
        registry: Arc<R>,
        id: JobId,
        push_host: String,
        repositories: Vec<String>,
        mode: PrefixMode,
        prefix: String,
        cleanup_source_tag: bool,
    ) {
        store.set_status(&id, JobStatus::Running);

        // Enumerate first so total_items reflects (repository, tag) pairs.
        let mut pairs: Vec<(String, String)> = Vec::new();
        let mut failed_repos = 0usize;
        for repository in &repositories {
            match registry.tag_names(repository).await {
                Ok(tags) => {
                    store.append_log(&id, &format!("[scan] {repository}: {} tags", tags.len()));
                    pairs.extend(tags.into_iter().map(|t| (repository.clone(), t)));
                }
                Err(e) => {
                    store.append_log(&id, &format!("[scan] {repository} failed: {e}"));
                    store.record_item(&id, ItemOutcome::failed(repository.clone(), e.to_string()));
                    failed_repos += 1;
                }
            }
        }
        store.set_total_items(&id, pairs.len() + failed_repos);

        for (repository, tag) in &pairs {
            let item = format!("{repository}:{tag}");
            let new_repo = apply_prefix(repository, mode, &prefix);
            if new_repo.is_empty() {
                store.append_log(&id, &format!("[skip] {item}: prefix removal empties the repository name"));
                store.record_item(
                    &id,
                    ItemOutcome::failed(item, "prefix removal empties the repository name"),
                );
                continue;
            }
            if new_repo == *repository {
                store.append_log(&id, &format!("[skip] {item} unchanged"));
                store.record_item(&id, ItemOutcome::ok(item));
                continue;
            }

            let outcome: Result<(), String> = async {
                let old_ref = build_reference(&push_host, repository, tag)
                    .map_err(|e| e.to_string())?;
                let new_ref =
                    build_reference(&push_host, &new_repo, tag).map_err(|e| e.to_string())?;
                step(&store, &id, "pull", &old_ref.to_string(), runtime.pull(&old_ref).await)?;
                step(
                    &store,
                    &id,
                    "tag",
                    &format!("{old_ref} => {new_ref}"),
                    runtime.tag(&old_ref, &new_ref).await,
                )?;
                step(&store, &id, "push", &new_ref.to_string(), runtime.push(&new_ref).await)?;
                if cleanup_source_tag {
                    let subject = format!("{repository}:{tag}");
                    let digest = step(
                        &store,
                        &id,
                        "cleanup-resolve",
                        &subject,
                        registry.resolve_digest(repository, tag).await,
                    )?;
                    step(
                        &store,
                        &id,
                        "cleanup-delete",
                        &subject,
                        registry.delete_manifest(repository, &digest).await,
                    )?;
                }
                Ok(())
            }
            .await;

            match outcome {
                Ok(()) => store.record_item(&id, ItemOutcome::ok(item)),
                Err(error) => store.record_item(&id, ItemOutcome::failed(item, error)),
            }
        }

        store.finish_from_items(&id);
    }

    async fn run_repo_delete(
        store: Arc<JobStore>,
        registry: Arc<R>,
        id: JobId,
        repositories: Vec<String>,
    ) {
        store.set_status(&id, JobStatus::Running);

        let mut pairs: Vec<(String, String)> = Vec::new();
        let mut failed_repos = 0usize;
        for repository in &repositories {
            match registry.tag_names(repository).await {
                Ok(tags) => {
                    store.append_log(&id, &format!("[scan] {repository}: {} tags", tags.len()));
                    pairs.extend(tags.into_iter().map(|t| (repository.clone(), t)));
                }
                Err(e) => {
                    store.append_log(&id, &format!("[scan] {repository} failed: {e}"));
                    store.record_item(&id, ItemOutcome::failed(repository.clone(), e.to_string()));
                    failed_repos += 1;
                }
            }
        }
        store.set_total_items(&id, pairs.len() + failed_repos);

        for (repository, tag) in &pairs {
            let item = format!("{repository}:{tag}");
            let outcome: Result<(), String> = async {
                // Registries delete by digest only; resolve first, and a
                // resolution failure leaves the registry untouched.
                let digest = step(
                    &store,
                    &id,
                    "resolve",
                    &item,
                    registry.resolve_digest(repository, tag).await,
                )?;
                step(
                    &store,
                    &id,
                    "delete",
                    &item,
                    registry.delete_manifest(repository, &digest).await,
                )?;
                Ok(())
            }
            .await;

            match outcome {
                Ok(()) => store.record_item(&id, ItemOutcome::ok(item)),
                Err(error) => store.record_item(&id, ItemOutcome::failed(item, error)),
            }
        }

        store.finish_from_items(&id);
    }

    async fn run_local_delete(
        store: Arc<JobStore>,
        runtime: Arc<C>,
        id: JobId,
        refs: Vec<String>,
    ) {
        store.set_status(&id, JobStatus::Running);
        store.append_log(
            &id,
            "[warn] removing by image id also removes any other tags referencing the same id",
        );

        let images = match runtime.list_images(1000).await {
            Ok(images) => images,
            Err(e) => {
                store.append_log(&id, &format!("[list] local images failed: {e}"));
                for reference in &refs {
                    store.record_item(&id, ItemOutcome::failed(reference.clone(), e.to_string()));
                }
                store.finish_from_items(&id);
                return;
            }
        };

        let by_reference: HashMap<&str, &str> = images
            .iter()
            .map(|img| (img.reference.as_str(), img.id.as_str()))
            .collect();

        // Several references may share one image id; remove each id once,
        // in first-reference order.
        let mut unique_ids: Vec<String> = Vec::new();
        for reference in &refs {
            if let Some(image_id) = by_reference.get(reference.as_str())
                && !unique_ids.iter().any(|known| known == image_id)
            {
                unique_ids.push((*image_id).to_string());
            }
        }

        let mut removed: HashMap<String, Result<(), String>> = HashMap::new();
        for image_id in &unique_ids {
            let result = step(
                &store,
                &id,
                "remove",
                image_id,
                runtime.remove_image(image_id, true).await,
            );
            removed.insert(image_id.clone(), result);
        }

        for reference in &refs {
            let outcome = match by_reference.get(reference.as_str()) {
                None => ItemOutcome::failed(reference.clone(), "not found locally"),
                Some(image_id) => match removed.get(*image_id) {
                    Some(Ok(())) => ItemOutcome::ok(reference.clone()),
                    Some(Err(error)) => ItemOutcome::failed(reference.clone(), error.clone()),
                    None => ItemOutcome::failed(reference.clone(), "not removed"),
                },
            };
            store.record_item(&id, outcome);
        }

        store.finish_from_items(&id);
    }
}

fn trimmed_or(value: Option<&str>, default: &str) -> String {
    match value.map(str::trim) {
        Some(v) if !v.is_empty() => v.to_string(),
        _ => default.to_string(),
    }
}

fn non_empty_refs(raw: &[String], field: &str) -> Result<Vec<String>, JobError> {
    let cleaned: Vec<String> = raw
        .iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();
    if cleaned.is_empty() {
        return Err(JobError::Validation(format!("{field} cannot be empty")));
    }
    Ok(cleaned)
}

fn require_prefix_value(mode: PrefixMode, value: &str) -> Result<(), JobError> {
    if mode != PrefixMode::None && value.trim().is_empty() {
        return Err(JobError::Validation(
            "prefix_value is required when prefix_mode is add or remove".to_string(),
        ));
    }
    Ok(())
}
