// ABOUTME: Entry point for the harbormaster CLI application.
// ABOUTME: Wires settings, registry client, runtime, and the orchestrator.

mod cli;

use clap::Parser;
use cli::{Cli, Commands};
use harbormaster::config::Settings;
use harbormaster::error::{Error, Result};
use harbormaster::jobs::{
    Job, JobStatus, LocalDeleteParams, LocalPushParams, MirrorParams, Orchestrator,
    RemoteRenameParams, RepoDeleteParams,
};
use harbormaster::registry::RegistryClient;
use harbormaster::runtime::{DockerRuntime, RuntimeOps, detect_local};
use harbormaster::types::JobId;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .init();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let settings = Settings::from_env()?;
    let registry = RegistryClient::new(
        &settings.registry_api_url,
        &settings.registry_push_host,
        settings.request_timeout,
    )?;

    match cli.command {
        Commands::Health => {
            let status = registry.health().await;
            let arch = match connect_runtime() {
                Ok(runtime) => runtime
                    .host_architecture()
                    .await
                    .map(|raw| harbormaster::jobs::arch_label(&raw))
                    .unwrap_or_else(|_| "unavailable".to_string()),
                Err(_) => "unavailable".to_string(),
            };
            println!("registry:  {}", settings.registry_api_url);
            println!("push host: {}", status.push_host);
            println!("healthy:   {}", status.healthy);
            println!("arch:      {arch}");
            Ok(())
        }
        Commands::Repos {
            n,
            last,
            non_empty,
            all,
        } => {
            let n = n.min(settings.max_catalog_results);
            let mut cursor = last;
            loop {
                let page = registry
                    .list_repositories(n, cursor.as_deref(), non_empty)
                    .await?;
                for repository in &page.repositories {
                    println!("{repository}");
                }
                cursor = page.next;
                match &cursor {
                    Some(next) if all => {
                        tracing::debug!(last = %next, "following catalog cursor");
                    }
                    Some(next) => {
                        eprintln!("-- more: --last {next}");
                        break;
                    }
                    None => break,
                }
            }
            Ok(())
        }
        Commands::Tags {
            repository,
            names_only,
        } => {
            if names_only {
                for tag in registry.tag_names(&repository).await? {
                    println!("{tag}");
                }
            } else {
                let descriptors = registry.list_tags(&repository).await?;
                println!("{}", serde_json::to_string_pretty(&descriptors)?);
            }
            Ok(())
        }
        Commands::DeleteTag { repository, tag } => {
            let digest = registry.delete_tag(&repository, &tag).await?;
            println!("deleted {repository}:{tag} ({digest})");
            Ok(())
        }
        Commands::LocalImages { limit } => {
            let runtime = connect_runtime()?;
            let images = runtime.list_images(limit).await?;
            println!("{}", serde_json::to_string_pretty(&images)?);
            Ok(())
        }
        Commands::Mirror {
            source,
            repository,
            tag,
            cleanup,
        } => {
            let orchestrator = build_orchestrator(&settings, registry)?;
            let job = orchestrator.submit_mirror(&MirrorParams {
                source_image: source,
                target_repository: repository,
                target_tag: tag,
                cleanup_local_tag: cleanup,
            })?;
            watch_job(&orchestrator, job).await
        }
        Commands::PushLocal {
            refs,
            arch_mode,
            arch,
            prefix_mode,
            prefix,
            cleanup_local,
            cleanup_registry,
        } => {
            let orchestrator = build_orchestrator(&settings, registry)?;
            let job = orchestrator
                .submit_local_push(&LocalPushParams {
                    image_refs: refs,
                    arch_mode,
                    arch_value: arch,
                    prefix_mode,
                    prefix_value: prefix,
                    cleanup_local_tag: cleanup_local,
                    cleanup_registry_source_tag: cleanup_registry,
                })
                .await?;
            watch_job(&orchestrator, job).await
        }
        Commands::Rename {
            repositories,
            prefix_mode,
            prefix,
            cleanup_source,
        } => {
            let orchestrator = build_orchestrator(&settings, registry)?;
            let job = orchestrator.submit_remote_rename(&RemoteRenameParams {
                repositories,
                prefix_mode,
                prefix_value: prefix,
                cleanup_source_tag: cleanup_source,
            })?;
            watch_job(&orchestrator, job).await
        }
        Commands::DeleteRepos { repositories } => {
            let orchestrator = build_orchestrator(&settings, registry)?;
            let job = orchestrator.submit_repo_delete(&RepoDeleteParams { repositories })?;
            watch_job(&orchestrator, job).await
        }
        Commands::DeleteLocal { refs } => {
            let orchestrator = build_orchestrator(&settings, registry)?;
            let job = orchestrator.submit_local_delete(&LocalDeleteParams { image_refs: refs })?;
            watch_job(&orchestrator, job).await
        }
        Commands::Jobs { limit } => {
            let orchestrator = build_orchestrator(&settings, registry)?;
            println!("{}", serde_json::to_string_pretty(&orchestrator.list(limit))?);
            Ok(())
        }
        Commands::Job { id } => {
            let orchestrator = build_orchestrator(&settings, registry)?;
            let job = orchestrator.get(&JobId::from(id.as_str()))?;
            println!("{}", serde_json::to_string_pretty(&job)?);
            Ok(())
        }
    }
}

fn connect_runtime() -> Result<DockerRuntime> {
    let socket = detect_local()?;
    Ok(DockerRuntime::connect(&socket)?)
}

fn build_orchestrator(
    settings: &Settings,
    registry: RegistryClient,
) -> Result<Orchestrator<RegistryClient, DockerRuntime>> {
    let runtime = connect_runtime()?;
    Ok(Orchestrator::new(
        Arc::new(registry),
        Arc::new(runtime),
        &settings.registry_push_host,
        settings.job_retention,
    ))
}

/// Poll a just-submitted job, echoing log lines as they appear, until it
/// reaches a terminal state. Exits non-zero (via the returned error) on
/// failure.
async fn watch_job(
    orchestrator: &Orchestrator<RegistryClient, DockerRuntime>,
    submitted: Job,
) -> Result<()> {
    let id = submitted.id.clone();
    println!("job {id} submitted");
    let mut printed = 0usize;
    loop {
        let job = orchestrator.get(&id)?;
        for line in &job.logs[printed..] {
            println!("{line}");
        }
        printed = job.logs.len();
        if job.status.is_terminal() {
            let failed_items = job.item_results.iter().filter(|r| !r.ok).count();
            println!(
                "job {id} finished: {:?} ({}/{} items ok)",
                job.status,
                job.item_results.len() - failed_items,
                job.total_items,
            );
            if job.status == JobStatus::Failed {
                return Err(Error::JobFailed(format!(
                    "job {id}: {failed_items} of {} items failed",
                    job.total_items
                )));
            }
            return Ok(());
        }
        tokio::time::sleep(Duration::from_millis(250)).await;
    }
}
