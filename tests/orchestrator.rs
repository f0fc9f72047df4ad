// ABOUTME: Orchestrator behavior tests against fake registry and runtime.
// ABOUTME: Submission validation, step ordering, batch outcomes, status derivation.

use async_trait::async_trait;
use harbormaster::jobs::{
    ArchMode, Job, JobError, JobStatus, LocalDeleteParams, LocalPushParams, MirrorParams,
    Orchestrator, PrefixMode, RemoteRenameParams, RepoDeleteParams,
};
use harbormaster::registry::{RegistryError, RegistryOps};
use harbormaster::runtime::{LocalImage, RuntimeError, RuntimeOps};
use harbormaster::types::{ImageRef, JobId};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Default)]
struct FakeRuntime {
    arch: String,
    images: Vec<LocalImage>,
    calls: Mutex<Vec<String>>,
    /// Call key -> error message to inject.
    fail_on: HashMap<String, String>,
}

impl FakeRuntime {
    fn with_arch(arch: &str) -> Self {
        Self {
            arch: arch.to_string(),
            ..Self::default()
        }
    }

    fn fail(mut self, call: &str, error: &str) -> Self {
        self.fail_on.insert(call.to_string(), error.to_string());
        self
    }

    fn image(mut self, reference: &str, id: &str) -> Self {
        let (repository, tag) = reference.rsplit_once(':').unwrap();
        self.images.push(LocalImage {
            reference: reference.to_string(),
            repository: repository.to_string(),
            tag: tag.to_string(),
            id: id.to_string(),
            size: 1024,
            os: None,
            architecture: None,
        });
        self
    }

    fn record(&self, call: String) -> Result<(), RuntimeError> {
        self.calls.lock().unwrap().push(call.clone());
        match self.fail_on.get(&call) {
            Some(message) => Err(RuntimeError::Runtime(message.clone())),
            None => Ok(()),
        }
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl RuntimeOps for FakeRuntime {
    async fn pull(&self, reference: &ImageRef) -> Result<(), RuntimeError> {
        self.record(format!("pull {reference}"))
    }

    async fn tag(&self, source: &ImageRef, target: &ImageRef) -> Result<(), RuntimeError> {
        self.record(format!("tag {source} => {target}"))
    }

    async fn push(&self, reference: &ImageRef) -> Result<(), RuntimeError> {
        self.record(format!("push {reference}"))
    }

    async fn remove_tag(&self, reference: &ImageRef) -> Result<(), RuntimeError> {
        self.record(format!("remove_tag {reference}"))
    }

    async fn remove_image(&self, id: &str, force: bool) -> Result<(), RuntimeError> {
        self.record(format!("remove_image {id} force={force}"))
    }

    async fn list_images(&self, _limit: usize) -> Result<Vec<LocalImage>, RuntimeError> {
        if let Some(message) = self.fail_on.get("list_images") {
            return Err(RuntimeError::Unavailable(message.clone()));
        }
        Ok(self.images.clone())
    }

    async fn host_architecture(&self) -> Result<String, RuntimeError> {
        Ok(self.arch.clone())
    }

    async fn ping(&self) -> Result<(), RuntimeError> {
        Ok(())
    }
}

#[derive(Default)]
struct FakeRegistry {
    /// Repository -> tag names; absent repositories answer not-found.
    tags: HashMap<String, Vec<String>>,
    /// (repository, reference) -> digest.
    digests: HashMap<(String, String), String>,
    calls: Mutex<Vec<String>>,
}

impl FakeRegistry {
    fn repo(mut self, repository: &str, tags: &[&str]) -> Self {
        self.tags
            .insert(repository.to_string(), tags.iter().map(|t| t.to_string()).collect());
        self
    }

    fn digest(mut self, repository: &str, reference: &str, digest: &str) -> Self {
        self.digests.insert(
            (repository.to_string(), reference.to_string()),
            digest.to_string(),
        );
        self
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl RegistryOps for FakeRegistry {
    async fn tag_names(&self, repository: &str) -> Result<Vec<String>, RegistryError> {
        self.calls.lock().unwrap().push(format!("tags {repository}"));
        self.tags
            .get(repository)
            .cloned()
            .ok_or_else(|| RegistryError::NotFound(format!("repository {repository} unknown")))
    }

    async fn resolve_digest(
        &self,
        repository: &str,
        reference: &str,
    ) -> Result<String, RegistryError> {
        self.calls
            .lock()
            .unwrap()
            .push(format!("resolve {repository}:{reference}"));
        self.digests
            .get(&(repository.to_string(), reference.to_string()))
            .cloned()
            .ok_or_else(|| RegistryError::NotFound(format!("{repository}:{reference}")))
    }

    async fn delete_manifest(
        &self,
        repository: &str,
        digest: &str,
    ) -> Result<(), RegistryError> {
        self.calls
            .lock()
            .unwrap()
            .push(format!("delete {repository}@{digest}"));
        Ok(())
    }
}

type TestOrchestrator = Orchestrator<FakeRegistry, FakeRuntime>;

fn orchestrator(
    registry: FakeRegistry,
    runtime: FakeRuntime,
    push_host: &str,
) -> (TestOrchestrator, Arc<FakeRegistry>, Arc<FakeRuntime>) {
    let registry = Arc::new(registry);
    let runtime = Arc::new(runtime);
    let orch = Orchestrator::new(Arc::clone(&registry), Arc::clone(&runtime), push_host, 50);
    (orch, registry, runtime)
}

async fn wait_terminal(orch: &TestOrchestrator, id: &JobId) -> Job {
    for _ in 0..1000 {
        let job = orch.get(id).unwrap();
        if job.status.is_terminal() {
            return job;
        }
        tokio::time::sleep(Duration::from_millis(2)).await;
    }
    panic!("job {id} never reached a terminal status");
}

mod mirror_tests {
    use super::*;

    #[tokio::test]
    async fn success_runs_pull_tag_push_in_order() {
        let (orch, _, runtime) =
            orchestrator(FakeRegistry::default(), FakeRuntime::default(), "reg.local:5000");
        let job = orch
            .submit_mirror(&MirrorParams {
                source_image: "nginx:1.27".to_string(),
                ..MirrorParams::default()
            })
            .unwrap();
        let job = wait_terminal(&orch, &job.id).await;

        assert_eq!(job.status, JobStatus::Success);
        assert_eq!(job.total_items, 1);
        assert_eq!(job.item_results.len(), 1);
        assert!(job.item_results[0].ok);

        assert_eq!(job.logs.len(), 3, "exactly one line per step: {:?}", job.logs);
        assert!(job.logs[0].contains("[pull] nginx:1.27 ok"));
        assert!(job.logs[1].contains("[tag] nginx:1.27 => reg.local:5000/nginx:1.27 ok"));
        assert!(job.logs[2].contains("[push] reg.local:5000/nginx:1.27 ok"));

        assert_eq!(
            runtime.calls(),
            vec![
                "pull nginx:1.27",
                "tag nginx:1.27 => reg.local:5000/nginx:1.27",
                "push reg.local:5000/nginx:1.27",
            ]
        );
    }

    #[tokio::test]
    async fn log_lines_carry_a_timestamp_prefix() {
        let (orch, _, _) =
            orchestrator(FakeRegistry::default(), FakeRuntime::default(), "reg.local:5000");
        let job = orch
            .submit_mirror(&MirrorParams {
                source_image: "nginx:1.27".to_string(),
                ..MirrorParams::default()
            })
            .unwrap();
        let job = wait_terminal(&orch, &job.id).await;

        for line in &job.logs {
            let (stamp, _) = line.split_once(' ').unwrap();
            assert_eq!(stamp.len(), 8, "HH:MM:SS prefix, got {line:?}");
            assert_eq!(stamp.matches(':').count(), 2);
        }
    }

    #[tokio::test]
    async fn pull_failure_stops_before_tag_and_push() {
        let runtime = FakeRuntime::default().fail("pull nginx:1.27", "no such image");
        let (orch, _, runtime) = orchestrator(FakeRegistry::default(), runtime, "reg.local:5000");
        let job = orch
            .submit_mirror(&MirrorParams {
                source_image: "nginx:1.27".to_string(),
                ..MirrorParams::default()
            })
            .unwrap();
        let job = wait_terminal(&orch, &job.id).await;

        assert_eq!(job.status, JobStatus::Failed);
        assert_eq!(job.item_results.len(), 1);
        assert!(!job.item_results[0].ok);
        assert!(job.item_results[0].error.as_deref().unwrap().contains("no such image"));
        assert_eq!(runtime.calls(), vec!["pull nginx:1.27"]);
    }

    #[tokio::test]
    async fn target_overrides_and_cleanup_are_honoured() {
        let (orch, _, runtime) =
            orchestrator(FakeRegistry::default(), FakeRuntime::default(), "reg.local:5000");
        let job = orch
            .submit_mirror(&MirrorParams {
                source_image: "ghcr.io/acme/tool:v2".to_string(),
                target_repository: Some("mirrored/tool".to_string()),
                target_tag: Some("stable".to_string()),
                cleanup_local_tag: true,
            })
            .unwrap();
        let job = wait_terminal(&orch, &job.id).await;

        assert_eq!(job.status, JobStatus::Success);
        assert_eq!(job.target_summary, "reg.local:5000/mirrored/tool:stable");
        assert_eq!(
            runtime.calls().last().unwrap(),
            "remove_tag reg.local:5000/mirrored/tool:stable"
        );
    }

    #[tokio::test]
    async fn digest_source_gets_a_flattened_default_tag() {
        let (orch, _, _) =
            orchestrator(FakeRegistry::default(), FakeRuntime::default(), "reg.local:5000");
        let job = orch
            .submit_mirror(&MirrorParams {
                source_image: "alpine@sha256:abcd".to_string(),
                ..MirrorParams::default()
            })
            .unwrap();
        assert_eq!(job.target_summary, "reg.local:5000/alpine:sha256-abcd");
    }

    #[tokio::test]
    async fn invalid_source_is_rejected_without_creating_a_job() {
        let (orch, _, _) =
            orchestrator(FakeRegistry::default(), FakeRuntime::default(), "reg.local:5000");
        let err = orch
            .submit_mirror(&MirrorParams {
                source_image: "UPPER CASE??".to_string(),
                ..MirrorParams::default()
            })
            .unwrap_err();
        assert!(matches!(err, JobError::Validation(_)), "got {err:?}");
        assert!(orch.list(10).is_empty());
    }
}

mod local_push_tests {
    use super::*;

    #[tokio::test]
    async fn auto_arch_and_prefix_add_rewrite_the_target() {
        // Empty push host keeps targets bare.
        let (orch, _, runtime) = orchestrator(
            FakeRegistry::default(),
            FakeRuntime::with_arch("x86_64"),
            "",
        );
        let job = orch
            .submit_local_push(&LocalPushParams {
                image_refs: vec!["nginx:1.27".to_string()],
                arch_mode: ArchMode::Auto,
                prefix_mode: PrefixMode::Add,
                prefix_value: "x86".to_string(),
                ..LocalPushParams::default()
            })
            .await
            .unwrap();
        let job = wait_terminal(&orch, &job.id).await;

        assert_eq!(job.status, JobStatus::Success);
        assert_eq!(
            runtime.calls(),
            vec![
                "tag nginx:1.27 => x86/nginx:1.27-x86",
                "push x86/nginx:1.27-x86",
            ]
        );
    }

    #[tokio::test]
    async fn arch_suffix_is_not_doubled() {
        let (orch, _, runtime) =
            orchestrator(FakeRegistry::default(), FakeRuntime::with_arch("aarch64"), "");
        let job = orch
            .submit_local_push(&LocalPushParams {
                image_refs: vec!["app:2.0-arm".to_string()],
                arch_mode: ArchMode::Auto,
                ..LocalPushParams::default()
            })
            .await
            .unwrap();
        wait_terminal(&orch, &job.id).await;
        assert_eq!(
            runtime.calls(),
            vec!["tag app:2.0-arm => app:2.0-arm", "push app:2.0-arm"]
        );
    }

    #[tokio::test]
    async fn batch_continues_past_a_failed_item() {
        let runtime = FakeRuntime::default().fail("push reg.local:5000/a:1", "denied");
        let (orch, _, runtime) = orchestrator(FakeRegistry::default(), runtime, "reg.local:5000");
        let job = orch
            .submit_local_push(&LocalPushParams {
                image_refs: vec!["a:1".to_string(), "b:2".to_string()],
                arch_mode: ArchMode::None,
                ..LocalPushParams::default()
            })
            .await
            .unwrap();
        let job = wait_terminal(&orch, &job.id).await;

        assert_eq!(job.status, JobStatus::Failed);
        assert_eq!(job.total_items, 2);
        assert_eq!(job.item_results.len(), 2);
        assert!(!job.item_results[0].ok);
        assert!(job.item_results[1].ok);
        assert!(runtime.calls().contains(&"push reg.local:5000/b:2".to_string()));
    }

    #[tokio::test]
    async fn registry_source_cleanup_resolves_then_deletes() {
        let registry = FakeRegistry::default().digest("app", "v1", "sha256:old");
        let (orch, registry, _) = orchestrator(registry, FakeRuntime::default(), "reg.local:5000");
        let job = orch
            .submit_local_push(&LocalPushParams {
                image_refs: vec!["app:v1".to_string()],
                arch_mode: ArchMode::None,
                cleanup_registry_source_tag: true,
                ..LocalPushParams::default()
            })
            .await
            .unwrap();
        let job = wait_terminal(&orch, &job.id).await;

        assert_eq!(job.status, JobStatus::Success);
        assert_eq!(
            registry.calls(),
            vec!["resolve app:v1", "delete app@sha256:old"]
        );
    }

    #[tokio::test]
    async fn custom_arch_requires_a_value() {
        let (orch, _, _) = orchestrator(FakeRegistry::default(), FakeRuntime::default(), "");
        let err = orch
            .submit_local_push(&LocalPushParams {
                image_refs: vec!["a:1".to_string()],
                arch_mode: ArchMode::Custom,
                arch_value: "  ".to_string(),
                ..LocalPushParams::default()
            })
            .await
            .unwrap_err();
        assert!(matches!(err, JobError::Validation(_)), "got {err:?}");
    }

    #[tokio::test]
    async fn prefix_removal_may_not_empty_the_name() {
        let (orch, _, _) = orchestrator(FakeRegistry::default(), FakeRuntime::default(), "");
        let err = orch
            .submit_local_push(&LocalPushParams {
                image_refs: vec!["x86:1".to_string()],
                prefix_mode: PrefixMode::Remove,
                prefix_value: "x86".to_string(),
                ..LocalPushParams::default()
            })
            .await
            .unwrap_err();
        assert!(matches!(err, JobError::Validation(_)), "got {err:?}");
    }

    #[tokio::test]
    async fn empty_ref_list_is_rejected() {
        let (orch, _, _) = orchestrator(FakeRegistry::default(), FakeRuntime::default(), "");
        let err = orch
            .submit_local_push(&LocalPushParams {
                image_refs: vec!["  ".to_string()],
                ..LocalPushParams::default()
            })
            .await
            .unwrap_err();
        assert!(matches!(err, JobError::Validation(_)), "got {err:?}");
    }
}

mod remote_rename_tests {
    use super::*;

    #[tokio::test]
    async fn renames_every_tag_and_cleans_up_sources() {
        let registry = FakeRegistry::default()
            .repo("app", &["v1", "v2"])
            .digest("app", "v1", "sha256:d1")
            .digest("app", "v2", "sha256:d2");
        let (orch, registry, runtime) =
            orchestrator(registry, FakeRuntime::default(), "reg.local:5000");
        let job = orch
            .submit_remote_rename(&RemoteRenameParams {
                repositories: vec!["app".to_string()],
                prefix_mode: PrefixMode::Add,
                prefix_value: "team".to_string(),
                cleanup_source_tag: true,
            })
            .unwrap();
        let job = wait_terminal(&orch, &job.id).await;

        assert_eq!(job.status, JobStatus::Success);
        assert_eq!(job.total_items, 2);
        assert_eq!(job.item_results.len(), 2);

        let calls = runtime.calls();
        assert!(calls.contains(&"pull reg.local:5000/app:v1".to_string()));
        assert!(
            calls.contains(&"tag reg.local:5000/app:v1 => reg.local:5000/team/app:v1".to_string())
        );
        assert!(calls.contains(&"push reg.local:5000/team/app:v1".to_string()));
        assert!(registry.calls().contains(&"delete app@sha256:d1".to_string()));
        assert!(registry.calls().contains(&"delete app@sha256:d2".to_string()));
    }

    #[tokio::test]
    async fn already_prefixed_repository_is_skipped_as_ok() {
        let registry = FakeRegistry::default().repo("team/app", &["v1"]);
        let (orch, _, runtime) = orchestrator(registry, FakeRuntime::default(), "reg.local:5000");
        let job = orch
            .submit_remote_rename(&RemoteRenameParams {
                repositories: vec!["team/app".to_string()],
                prefix_mode: PrefixMode::Add,
                prefix_value: "team".to_string(),
                cleanup_source_tag: false,
            })
            .unwrap();
        let job = wait_terminal(&orch, &job.id).await;

        assert_eq!(job.status, JobStatus::Success);
        assert_eq!(job.item_results.len(), 1);
        assert!(job.item_results[0].ok);
        assert!(runtime.calls().is_empty(), "nothing should be moved");
    }

    #[tokio::test]
    async fn unknown_repository_fails_its_item_but_not_the_rest() {
        let registry = FakeRegistry::default().repo("app", &["v1"]);
        let (orch, _, _) = orchestrator(registry, FakeRuntime::default(), "reg.local:5000");
        let job = orch
            .submit_remote_rename(&RemoteRenameParams {
                repositories: vec!["ghost".to_string(), "app".to_string()],
                prefix_mode: PrefixMode::Add,
                prefix_value: "team".to_string(),
                cleanup_source_tag: false,
            })
            .unwrap();
        let job = wait_terminal(&orch, &job.id).await;

        assert_eq!(job.status, JobStatus::Failed);
        // One failed repository plus one renamed tag.
        assert_eq!(job.total_items, 2);
        assert_eq!(job.item_results.len(), 2);
        assert!(job.item_results.iter().any(|r| r.item == "ghost" && !r.ok));
        assert!(job.item_results.iter().any(|r| r.item == "app:v1" && r.ok));
    }

    #[tokio::test]
    async fn rename_requires_an_explicit_prefix_mode() {
        let (orch, _, _) =
            orchestrator(FakeRegistry::default(), FakeRuntime::default(), "reg.local:5000");
        let err = orch
            .submit_remote_rename(&RemoteRenameParams {
                repositories: vec!["app".to_string()],
                prefix_mode: PrefixMode::None,
                prefix_value: String::new(),
                cleanup_source_tag: false,
            })
            .unwrap_err();
        assert!(matches!(err, JobError::Validation(_)), "got {err:?}");
    }
}

mod repo_delete_tests {
    use super::*;

    #[tokio::test]
    async fn partial_failure_reports_both_items() {
        // v1 resolves, v2 does not: one deletion, one failed item.
        let registry = FakeRegistry::default()
            .repo("old-app", &["v1", "v2"])
            .digest("old-app", "v1", "sha256:d1");
        let (orch, registry, _) =
            orchestrator(registry, FakeRuntime::default(), "reg.local:5000");
        let job = orch
            .submit_repo_delete(&RepoDeleteParams {
                repositories: vec!["old-app".to_string()],
            })
            .unwrap();
        let job = wait_terminal(&orch, &job.id).await;

        assert_eq!(job.status, JobStatus::Failed);
        assert_eq!(job.total_items, 2);
        assert_eq!(job.item_results.len(), 2);
        assert!(job.item_results.iter().any(|r| r.item == "old-app:v1" && r.ok));
        assert!(job.item_results.iter().any(|r| r.item == "old-app:v2" && !r.ok));

        let calls = registry.calls();
        let deletes: Vec<&String> = calls.iter().filter(|c| c.starts_with("delete")).collect();
        assert_eq!(deletes, vec!["delete old-app@sha256:d1"]);
    }

    #[tokio::test]
    async fn resolution_always_precedes_deletion() {
        let registry = FakeRegistry::default()
            .repo("app", &["v1"])
            .digest("app", "v1", "sha256:d1");
        let (orch, registry, _) =
            orchestrator(registry, FakeRuntime::default(), "reg.local:5000");
        let job = orch
            .submit_repo_delete(&RepoDeleteParams {
                repositories: vec!["app".to_string()],
            })
            .unwrap();
        wait_terminal(&orch, &job.id).await;

        assert_eq!(
            registry.calls(),
            vec!["tags app", "resolve app:v1", "delete app@sha256:d1"]
        );
    }

    #[tokio::test]
    async fn empty_repository_succeeds_with_no_items() {
        let registry = FakeRegistry::default().repo("bare", &[]);
        let (orch, _, _) = orchestrator(registry, FakeRuntime::default(), "reg.local:5000");
        let job = orch
            .submit_repo_delete(&RepoDeleteParams {
                repositories: vec!["bare".to_string()],
            })
            .unwrap();
        let job = wait_terminal(&orch, &job.id).await;
        assert_eq!(job.status, JobStatus::Success);
        assert!(job.item_results.is_empty());
    }
}

mod local_delete_tests {
    use super::*;

    #[tokio::test]
    async fn shared_image_id_is_removed_once() {
        let runtime = FakeRuntime::default()
            .image("a:1", "sha256:same")
            .image("b:1", "sha256:same");
        let (orch, _, runtime) = orchestrator(FakeRegistry::default(), runtime, "");
        let job = orch
            .submit_local_delete(&LocalDeleteParams {
                image_refs: vec!["a:1".to_string(), "b:1".to_string()],
            })
            .unwrap();
        let job = wait_terminal(&orch, &job.id).await;

        assert_eq!(job.status, JobStatus::Success);
        assert_eq!(job.item_results.len(), 2);
        assert!(job.item_results.iter().all(|r| r.ok));

        let removals: Vec<String> = runtime
            .calls()
            .into_iter()
            .filter(|c| c.starts_with("remove_image"))
            .collect();
        assert_eq!(removals, vec!["remove_image sha256:same force=true"]);
        assert!(job.logs.iter().any(|l| l.contains("[warn]")));
    }

    #[tokio::test]
    async fn unknown_reference_fails_only_its_item() {
        let runtime = FakeRuntime::default().image("a:1", "sha256:a");
        let (orch, _, _) = orchestrator(FakeRegistry::default(), runtime, "");
        let job = orch
            .submit_local_delete(&LocalDeleteParams {
                image_refs: vec!["a:1".to_string(), "ghost:9".to_string()],
            })
            .unwrap();
        let job = wait_terminal(&orch, &job.id).await;

        assert_eq!(job.status, JobStatus::Failed);
        assert!(job.item_results.iter().any(|r| r.item == "a:1" && r.ok));
        let ghost = job
            .item_results
            .iter()
            .find(|r| r.item == "ghost:9")
            .unwrap();
        assert!(!ghost.ok);
        assert!(ghost.error.as_deref().unwrap().contains("not found locally"));
    }

    #[tokio::test]
    async fn listing_failure_fails_every_item() {
        let runtime = FakeRuntime::default().fail("list_images", "socket closed");
        let (orch, _, _) = orchestrator(FakeRegistry::default(), runtime, "");
        let job = orch
            .submit_local_delete(&LocalDeleteParams {
                image_refs: vec!["a:1".to_string(), "b:1".to_string()],
            })
            .unwrap();
        let job = wait_terminal(&orch, &job.id).await;

        assert_eq!(job.status, JobStatus::Failed);
        assert_eq!(job.item_results.len(), 2);
        assert!(job.item_results.iter().all(|r| !r.ok));
    }
}

mod lookup_tests {
    use super::*;

    #[tokio::test]
    async fn unknown_job_id_is_not_found() {
        let (orch, _, _) = orchestrator(FakeRegistry::default(), FakeRuntime::default(), "");
        let err = orch.get(&JobId::from("nope")).unwrap_err();
        assert!(matches!(err, JobError::NotFound(_)), "got {err:?}");
    }

    #[tokio::test]
    async fn list_returns_most_recent_first() {
        let (orch, _, _) =
            orchestrator(FakeRegistry::default(), FakeRuntime::default(), "reg.local:5000");
        let first = orch
            .submit_mirror(&MirrorParams {
                source_image: "a:1".to_string(),
                ..MirrorParams::default()
            })
            .unwrap();
        let second = orch
            .submit_mirror(&MirrorParams {
                source_image: "b:1".to_string(),
                ..MirrorParams::default()
            })
            .unwrap();

        let listed = orch.list(10);
        assert_eq!(listed[0].id, second.id);
        assert_eq!(listed[1].id, first.id);
    }

    #[tokio::test]
    async fn detected_arch_is_a_short_label() {
        let (orch, _, _) = orchestrator(
            FakeRegistry::default(),
            FakeRuntime::with_arch("aarch64"),
            "",
        );
        assert_eq!(orch.detected_arch().await.unwrap(), "arm");
    }
}
