//! Capability catalog loader.

use std::path::Path;

use pantheon_core::{Capability, CapabilityCatalog, DeityRelationshipGraph};
use serde::{Deserialize, Serialize};

use crate::loaders::{LoadResult, read_file};

/// Capability catalog structure for RON files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CapabilityTable {
    pub capabilities: Vec<Capability>,
}

/// Loader for the capability catalog from RON files.
pub struct CapabilityLoader;

impl CapabilityLoader {
    /// Load and validate a capability catalog from a RON file.
    pub fn load(path: &Path, deities: &DeityRelationshipGraph) -> LoadResult<CapabilityCatalog> {
        let content = read_file(path)?;
        Self::parse(&content, deities)
            .map_err(|e| anyhow::anyhow!("{} ({})", e, path.display()))
    }

    /// Parse RON text into a catalog.
    ///
    /// Every capability must name a registered deity and the prerequisite
    /// graph must pass [`CapabilityCatalog::validate`].
    pub fn parse(content: &str, deities: &DeityRelationshipGraph) -> LoadResult<CapabilityCatalog> {
        let table: CapabilityTable = ron::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse capability catalog RON: {}", e))?;

        let mut catalog = CapabilityCatalog::new();
        for capability in table.capabilities {
            if !deities.contains(&capability.deity) {
                anyhow::bail!(
                    "Capability '{}' belongs to unknown deity '{}'",
                    capability.id,
                    capability.deity
                );
            }
            let id = capability.id.clone();
            if !catalog.register(capability) {
                anyhow::bail!("Capability with empty id after '{}'", id);
            }
        }

        let issues = catalog.validate();
        if !issues.is_empty() {
            let listed: Vec<String> = issues.iter().map(ToString::to_string).collect();
            anyhow::bail!("Invalid capability catalog: {}", listed.join("; "));
        }

        Ok(catalog)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pantheon_core::{CapabilityId, DeityDescriptor, Domain, Scope};

    fn deities() -> DeityRelationshipGraph {
        let mut graph = DeityRelationshipGraph::new();
        graph.register(DeityDescriptor::new("khoras", "Khoras", Domain::War));
        graph
    }

    #[test]
    fn optional_fields_default() {
        let catalog = CapabilityLoader::parse(
            r#"(
                capabilities: [
                    (
                        id: "khoras_battle_fury",
                        name: "Battle Fury",
                        scope: Player,
                        deity: "khoras",
                        stat_modifiers: { "damage": 0.05 },
                    ),
                ],
            )"#,
            &deities(),
        )
        .unwrap();
        let fury = catalog.get(&CapabilityId::from("khoras_battle_fury")).unwrap();
        assert_eq!(fury.scope, Scope::Player);
        assert!(fury.prerequisites.is_empty());
        assert_eq!(fury.stat_modifiers["damage"], 0.05);
    }

    #[test]
    fn rejects_unknown_deity() {
        let err = CapabilityLoader::parse(
            r#"(capabilities: [(id: "x", name: "X", scope: Player, deity: "zorp")])"#,
            &deities(),
        )
        .unwrap_err();
        assert!(err.to_string().contains("unknown deity 'zorp'"));
    }

    #[test]
    fn rejects_missing_prerequisite() {
        let err = CapabilityLoader::parse(
            r#"(
                capabilities: [
                    (
                        id: "khoras_iron_skin",
                        name: "Iron Skin",
                        scope: Player,
                        deity: "khoras",
                        prerequisites: ["khoras_missing"],
                    ),
                ],
            )"#,
            &deities(),
        )
        .unwrap_err();
        assert!(err.to_string().contains("khoras_missing"));
    }
}
