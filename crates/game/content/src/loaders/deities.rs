//! Deity descriptor loader.

use std::path::Path;

use pantheon_core::{DeityDescriptor, DeityRelationshipGraph};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::loaders::{LoadResult, read_file};

/// Deity table structure for RON files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeityTable {
    pub deities: Vec<DeityDescriptor>,
}

/// Loader for deity descriptors from RON files.
pub struct DeityLoader;

impl DeityLoader {
    /// Load a deity table from a RON file and register it into a graph.
    pub fn load(path: &Path) -> LoadResult<DeityRelationshipGraph> {
        let content = read_file(path)?;
        Self::parse(&content)
            .map_err(|e| anyhow::anyhow!("{} ({})", e, path.display()))
    }

    /// Parse RON text into a relationship graph.
    ///
    /// Fails on empty or `"none"` ids and on relationships naming an unknown
    /// deity. Asymmetric relationship pairs are logged but accepted.
    pub fn parse(content: &str) -> LoadResult<DeityRelationshipGraph> {
        let table: DeityTable = ron::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse deity table RON: {}", e))?;

        let mut graph = DeityRelationshipGraph::new();
        for descriptor in table.deities {
            if descriptor.id.is_unset() {
                anyhow::bail!("Deity '{}' has an empty or reserved id", descriptor.name);
            }
            graph.register(descriptor);
        }

        for descriptor in graph.all() {
            if let Some(unknown) = descriptor
                .relationships
                .keys()
                .find(|other| !graph.contains(other))
            {
                anyhow::bail!(
                    "Deity '{}' has a relationship with unknown deity '{}'",
                    descriptor.id,
                    unknown
                );
            }
        }

        for (a, b) in graph.asymmetric_pairs() {
            warn!(
                target: "pantheon::content",
                deity = %a,
                other = %b,
                "Relationship is not authored symmetrically"
            );
        }

        Ok(graph)
    }
}
