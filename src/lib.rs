// ABOUTME: Library root for harbormaster - registry and image housekeeping.
// ABOUTME: The CLI binary is in main.rs.

pub mod config;
pub mod error;
pub mod jobs;
pub mod registry;
pub mod runtime;
pub mod types;
