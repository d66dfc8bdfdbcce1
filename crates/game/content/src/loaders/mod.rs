//! Content loaders for reading pantheon data from files.
//!
//! Each loader accepts either a path or already-read text, so embedded and
//! on-disk content share the same parsing and validation.

pub mod capabilities;
pub mod config;
pub mod deities;
pub mod factory;

pub use capabilities::CapabilityLoader;
pub use config::ConfigLoader;
pub use deities::DeityLoader;
pub use factory::{Content, ContentFactory};

use std::path::Path;

/// Common result type for loaders.
pub type LoadResult<T> = anyhow::Result<T>;

/// Helper function to read file contents.
pub(crate) fn read_file(path: &Path) -> LoadResult<String> {
    std::fs::read_to_string(path)
        .map_err(|e| anyhow::anyhow!("Failed to read file {}: {}", path.display(), e))
}
