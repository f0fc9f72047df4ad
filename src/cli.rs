// ABOUTME: Command-line interface definition using clap derive macros.
// ABOUTME: Defines all subcommands and their arguments.

use clap::{Parser, Subcommand};
use harbormaster::jobs::{ArchMode, PrefixMode};

#[derive(Parser)]
#[command(name = "harbormaster")]
#[command(about = "Registry and image housekeeping for private Docker/OCI registries")]
#[command(version)]
pub struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Check registry reachability and show the detected architecture
    Health,

    /// List repositories in the registry catalog
    Repos {
        /// Page size
        #[arg(short, long, default_value_t = 100)]
        n: usize,
        /// Continuation cursor from a previous page
        #[arg(long)]
        last: Option<String>,
        /// Only repositories that still have tags (one extra probe each)
        #[arg(long)]
        non_empty: bool,
        /// Follow continuation cursors until the catalog is exhausted
        #[arg(long)]
        all: bool,
    },

    /// List tags of a repository with digests, sizes, and build times
    Tags {
        repository: String,
        /// Skip per-tag manifest inspection
        #[arg(long)]
        names_only: bool,
    },

    /// Delete a single tag (resolved to its digest first)
    DeleteTag { repository: String, tag: String },

    /// List local images known to the container runtime
    LocalImages {
        #[arg(short, long, default_value_t = 300)]
        limit: usize,
    },

    /// Mirror an external image into the managed registry
    Mirror {
        /// Image to pull, e.g. nginx:1.27
        source: String,
        /// Target repository (defaults to the source's own)
        #[arg(long)]
        repository: Option<String>,
        /// Target tag (defaults to the source's own)
        #[arg(long)]
        tag: Option<String>,
        /// Remove the local target tag after a successful push
        #[arg(long)]
        cleanup: bool,
    },

    /// Rename and push local images into the registry
    PushLocal {
        /// Local image references (repository:tag)
        #[arg(required = true)]
        refs: Vec<String>,
        #[arg(long, value_enum, default_value_t = ArchMode::Auto)]
        arch_mode: ArchMode,
        /// Architecture label when --arch-mode=custom
        #[arg(long, default_value = "")]
        arch: String,
        #[arg(long, value_enum, default_value_t = PrefixMode::None)]
        prefix_mode: PrefixMode,
        /// Prefix value when --prefix-mode is add or remove
        #[arg(long, default_value = "")]
        prefix: String,
        /// Remove the local source tag after a successful push
        #[arg(long)]
        cleanup_local: bool,
        /// Delete the registry-side source tag after a successful push
        #[arg(long)]
        cleanup_registry: bool,
    },

    /// Rename remote repositories by adding or removing a prefix
    Rename {
        #[arg(required = true)]
        repositories: Vec<String>,
        #[arg(long, value_enum, default_value_t = PrefixMode::Add)]
        prefix_mode: PrefixMode,
        #[arg(long)]
        prefix: String,
        /// Delete the old tags from the registry after a successful rename
        #[arg(long)]
        cleanup_source: bool,
    },

    /// Delete every tag of the given repositories
    DeleteRepos {
        #[arg(required = true)]
        repositories: Vec<String>,
    },

    /// Remove local images by reference (force-removes by image id)
    DeleteLocal {
        #[arg(required = true)]
        refs: Vec<String>,
    },

    /// List recent jobs
    Jobs {
        #[arg(short, long, default_value_t = 20)]
        limit: usize,
    },

    /// Show one job by id
    Job { id: String },
}
