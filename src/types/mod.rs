// ABOUTME: Validated domain types shared across the crate.
// ABOUTME: Image references and job identifiers.

mod image_ref;
mod job_id;

pub use image_ref::{ImageRef, ParseImageRefError};
pub use job_id::JobId;
